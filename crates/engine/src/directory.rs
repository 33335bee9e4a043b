//! Boundary to the external directory service. The transport and
//! authentication mechanics live outside this core; implementations of
//! [`DirectoryService`] are injected into the roster cache.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account credentials for the directory call. Always passed explicitly,
/// never read from ambient state.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

/// One contact as reported back by the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Number as echoed by the directory, bare or `+`-prefixed.
    pub number: String,
    /// Whether the number is actively registered with the service.
    pub registered: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncResponse {
    pub contacts: Vec<DirectoryEntry>,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("directory protocol error: {0}")]
    Protocol(String),
}

/// Bulk contact-sync request: hand the directory the full list of dialable
/// (`+`-prefixed) numbers on a roster and get their registration status
/// back. Blocking call; no timeout or retry is layered on here.
pub trait DirectoryService {
    fn sync(
        &self,
        credentials: &Credentials,
        numbers: &[String],
    ) -> Result<SyncResponse, DirectoryError>;
}
