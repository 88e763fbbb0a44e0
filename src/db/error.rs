use crate::models::types::InstanceId;
use deadpool_postgres::{BuildError, PoolError};
use thiserror::Error;

// DbError is the lowest level error type, wrapping errors from the storage layer. It does not wrap
// any higher level errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Record not found
    #[error("not found")]
    NotFound,

    /// Unique constraint violation
    #[error("unique violation")]
    UniqueViolation,

    /// A guarded write found a different version than the one presented
    #[error("version conflict on instance {id}")]
    VersionConflict { id: InstanceId },

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Pg(#[from] tokio_postgres::Error),

    #[error(transparent)]
    Migrate(#[from] refinery::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("row decode error: {0}")]
    Decode(String),
}

impl DbError {
    /// Maps postgres constraint violations onto the variants above.
    pub fn from_pg(e: tokio_postgres::Error) -> Self {
        match e.code() {
            Some(code) if *code == tokio_postgres::error::SqlState::UNIQUE_VIOLATION => DbError::UniqueViolation,
            _ => DbError::Pg(e),
        }
    }
}
