//! Error types for filter compilation and request guards.

use thiserror::Error;

/// Malformed filter grammar in a query-string value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// `limit` or `offset` is not an integer.
    #[error("invalid integer for \"{key}\": {value}")]
    InvalidInteger {
        /// The reserved key (`limit` or `offset`).
        key: String,
        /// The offending raw value.
        value: String,
    },

    /// An `order` entry used a direction other than `asc`/`desc`.
    #[error("invalid order direction \"{0}\"; expected asc or desc")]
    InvalidDirection(String),

    /// An `in.` value is not a parenthesized literal list.
    #[error("malformed in. list: {0}")]
    MalformedList(String),

    /// The reserved `or.` operator was used.
    #[error("logical OR filters are not supported")]
    UnsupportedOr,
}

/// Errors raised by the engine before storage is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestError {
    /// Malformed filter grammar.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// A caller-detectable precondition was violated.
    #[error("{0}")]
    Guard(String),

    /// The request body has the wrong shape for the verb.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The table is not in the catalog.
    #[error("no such table: {0}")]
    UnknownTable(String),
}

impl RestError {
    /// Creates a guard violation.
    pub fn guard(message: impl Into<String>) -> Self {
        Self::Guard(message.into())
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, RestError>;
