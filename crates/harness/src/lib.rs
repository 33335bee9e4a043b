pub mod account;
pub mod directory;

pub use account::TestAccount;
pub use directory::{FailingDirectory, StaticDirectory};
