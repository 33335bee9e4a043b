use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid contact number: {0:?}")]
    InvalidNumber(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
