use std::time::Duration;
use thiserror::Error;

use super::timeouts::TimeoutError;

/// Persistence errors. Callers in the game engine log these and move on.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to encode move log: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),
}

impl From<TimeoutError> for DbError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => DbError::Timeout(duration),
            TimeoutError::Database(e) => DbError::Database(e),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
