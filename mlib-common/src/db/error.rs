//! DAO error type
//!
//! Every failure of the DAO layer is a [`DaoError`]; `sqlx` errors are
//! classified on the way in and never leak out raw.

use thiserror::Error;

use crate::entities::Key;

pub type DaoResult<T> = std::result::Result<T, DaoError>;

#[derive(Error, Debug)]
pub enum DaoError {
    /// Operation needs a persisted entity or key
    #[error("{0} has not been persisted")]
    Unsaved(&'static str),

    /// `create` called on an entity that already has a key
    #[error("{entity} is already persisted with id {key}")]
    AlreadyPersisted { entity: &'static str, key: Key },

    /// No row with the given key
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: Key },

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation: {0}")]
    ForeignKeyViolation(String),

    /// NOT NULL or CHECK constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A stored value could not be turned back into an entity field
    #[error("Invalid stored value in {column}: {reason}")]
    Decode { column: &'static str, reason: String },

    /// Session lifetime puts the expiry beyond the representable range
    #[error("Session lifetime out of range: {0}")]
    SessionLifetime(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for DaoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let message = db_err.message().to_string();
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => return DaoError::UniqueViolation(message),
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return DaoError::ForeignKeyViolation(message)
                }
                sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => {
                    return DaoError::ConstraintViolation(message)
                }
                _ => {}
            }
        }
        DaoError::Database(err)
    }
}
