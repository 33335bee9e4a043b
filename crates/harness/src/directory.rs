use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use roster_core::ContactNumber;
use roster_engine::{Credentials, DirectoryEntry, DirectoryError, DirectoryService, SyncResponse};

#[derive(Default)]
struct DirState {
    registered: HashSet<String>,
    calls: u32,
}

/// Scriptable in-process directory fake. Clones share state, so a handle
/// kept outside the roster cache can script registrations and observe call
/// counts while the cache owns its own handle.
#[derive(Clone, Default)]
pub struct StaticDirectory {
    state: Arc<Mutex<DirState>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `number` as actively registered with the directory.
    pub fn register(&self, number: &ContactNumber) {
        if let Ok(mut state) = self.state.lock() {
            state.registered.insert(number.as_str().to_string());
        }
    }

    /// How many sync requests this fake has served.
    pub fn calls(&self) -> u32 {
        self.state.lock().map(|state| state.calls).unwrap_or(0)
    }
}

impl DirectoryService for StaticDirectory {
    fn sync(
        &self,
        _credentials: &Credentials,
        numbers: &[String],
    ) -> Result<SyncResponse, DirectoryError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DirectoryError::Unavailable("directory fake poisoned".to_string()))?;
        state.calls += 1;

        // Echo every queried number in the dialable form it arrived in,
        // like the real service does.
        let contacts = numbers
            .iter()
            .map(|n| DirectoryEntry {
                number: n.clone(),
                registered: state.registered.contains(n.trim_start_matches('+')),
            })
            .collect();
        Ok(SyncResponse { contacts })
    }
}

/// Directory that refuses every request; for fault-propagation tests.
pub struct FailingDirectory;

impl DirectoryService for FailingDirectory {
    fn sync(
        &self,
        _credentials: &Credentials,
        _numbers: &[String],
    ) -> Result<SyncResponse, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }
}
