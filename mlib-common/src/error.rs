//! Common error types for the music library

use thiserror::Error;

use crate::db::DaoError;

/// Common result type for music library operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the service layer
#[derive(Error, Debug)]
pub enum Error {
    /// Storage failure or DAO misuse (wraps [`DaoError`])
    #[error("Persistence error: {0}")]
    Persistence(#[from] DaoError),

    /// No user matches the lookup
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Another account already uses this email address
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Unknown email, wrong password or disabled account
    #[error("Bad credentials")]
    BadCredentials,

    /// Password digest could not be computed or parsed
    #[error("Password error: {0}")]
    Password(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Transaction begin/commit failures arrive as raw sqlx errors
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Persistence(DaoError::from(err))
    }
}
