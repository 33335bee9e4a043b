use thiserror::Error;

use crate::directory::DirectoryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] roster_storage::StorageError),

    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("core error: {0}")]
    Core(#[from] roster_core::CoreError),

    #[error("roster lock poisoned")]
    Poisoned,
}
