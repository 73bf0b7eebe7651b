use studybud_database::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    /// Input rejected before anything was written.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
