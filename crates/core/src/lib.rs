pub mod avatar;
pub mod error;
pub mod ids;
pub mod number;

pub use error::CoreError;
pub use ids::*;
pub use number::{ContactNumber, ContactState};
