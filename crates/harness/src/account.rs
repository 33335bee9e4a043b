use tempfile::TempDir;

use roster_core::ContactNumber;
use roster_engine::{Credentials, EngineError, RosterCache};
use roster_storage::SqliteStore;

use crate::directory::StaticDirectory;

/// One local account with its roster cache over an owned store, plus an
/// outside handle on the directory fake the cache talks to.
pub struct TestAccount {
    pub roster: RosterCache<SqliteStore, StaticDirectory>,
    pub directory: StaticDirectory,
}

impl TestAccount {
    pub fn new(owner: &str) -> Result<Self, EngineError> {
        let store = SqliteStore::open_in_memory()?;
        Self::with_store(store, owner)
    }

    pub fn with_store(store: SqliteStore, owner: &str) -> Result<Self, EngineError> {
        let directory = StaticDirectory::new();
        let owner = ContactNumber::parse(owner)?;
        let roster = RosterCache::open(store, directory.clone(), owner)?;
        Ok(Self { roster, directory })
    }

    /// Account backed by an on-disk database; keep the returned
    /// [`TempDir`] alive for as long as the database should exist.
    pub fn on_disk(owner: &str) -> Result<(Self, TempDir), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir
            .path()
            .join("roster.db")
            .to_str()
            .ok_or("non-utf8 temp path")?
            .to_string();
        let store = SqliteStore::open(&path)?;
        Ok((Self::with_store(store, owner)?, dir))
    }

    pub fn credentials() -> Credentials {
        Credentials::new("owner", "secret")
    }
}
