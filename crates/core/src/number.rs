use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A remote party's address, stored in bare international form (digits only,
/// no `+` prefix). Parsing accepts either the bare or the dialable form.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContactNumber(String);

impl ContactNumber {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let digits = raw.strip_prefix('+').unwrap_or(raw);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidNumber(raw.to_string()));
        }
        Ok(Self(digits.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `+`-prefixed form the external directory expects.
    pub fn to_dialable(&self) -> String {
        format!("+{}", self.0)
    }
}

impl fmt::Debug for ContactNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContactNumber({})", self.0)
    }
}

impl fmt::Display for ContactNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registration state of a contact number. Small integer in storage;
/// anything at or above `ACTIVE` is visible on loaded rosters.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContactState(i64);

impl ContactState {
    /// Not yet observed by the directory, or explicitly inactive.
    pub const UNKNOWN: ContactState = ContactState(0);
    /// Actively registered with the directory.
    pub const ACTIVE: ContactState = ContactState(1);

    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> i64 {
        self.0
    }

    pub fn is_visible(&self) -> bool {
        self.0 >= Self::ACTIVE.0
    }
}

impl fmt::Debug for ContactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContactState({})", self.0)
    }
}
