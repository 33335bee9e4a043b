pub mod buddy;
pub mod directory;
pub mod error;
pub mod roster;

pub use buddy::Buddy;
pub use directory::{Credentials, DirectoryEntry, DirectoryError, DirectoryService, SyncResponse};
pub use error::EngineError;
pub use roster::RosterCache;
