//! Error types for the HTTP layer.

use thiserror::Error;

use oxide_rest_sqlite::EngineError;

/// Failure to turn a request body into JSON rows.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The body is not valid UTF-8 text.
    #[error("request body is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    /// The body is not valid CSV.
    #[error("invalid CSV body: {0}")]
    Csv(String),
}

/// Startup and serving errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Opening the database failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Introspecting the database failed.
    #[error("introspection failed: {0}")]
    Engine(#[from] EngineError),

    /// Binding or accepting on the socket failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
