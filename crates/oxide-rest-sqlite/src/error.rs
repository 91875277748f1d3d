//! Error types for the SQLite engine.

use oxide_rest_core::{FilterError, RestError};

/// Errors that can occur while introspecting or executing against SQLite.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The database rejected a statement. Displays SQLite's own message.
    #[error("{}", storage_message(.0))]
    Database(#[from] sqlx::Error),

    /// The request failed a guard or the grammar.
    #[error(transparent)]
    Rest(#[from] RestError),
}

impl From<FilterError> for EngineError {
    fn from(err: FilterError) -> Self {
        Self::Rest(err.into())
    }
}

/// Returns the message SQLite reported, without sqlx's wrapping.
fn storage_message(err: &sqlx::Error) -> String {
    err.as_database_error()
        .map_or_else(|| err.to_string(), |db| db.message().to_string())
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
