//! Engine-level requests.

use std::fmt;

use serde_json::Value as JsonValue;

use crate::query::QueryParams;

/// `Prefer` header value that turns a create into an upsert.
pub const MERGE_DUPLICATES: &str = "resolution=merge-duplicates";

/// The four CRUD strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// GET: filtered, paged read.
    Read,
    /// POST: insert one row or a batch, optionally as upsert.
    Create,
    /// PUT: update by primary key, inserting when nothing matched.
    Replace,
    /// DELETE: filtered delete.
    Delete,
}

impl Verb {
    /// All verbs, in route registration order.
    pub const ALL: [Self; 4] = [Self::Read, Self::Create, Self::Replace, Self::Delete];

    /// Maps an HTTP method name to a verb.
    #[must_use]
    pub fn from_method(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Read),
            "POST" => Some(Self::Create),
            "PUT" => Some(Self::Replace),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the HTTP method name.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Read => "GET",
            Self::Create => "POST",
            Self::Replace => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// One decoded request against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    /// Strategy to run.
    pub verb: Verb,
    /// Target table.
    pub table: String,
    /// Query-string pairs in order.
    pub query: QueryParams,
    /// Decoded body (JSON or CSV), if any.
    pub body: Option<JsonValue>,
    /// Whether creates should merge on unique conflicts.
    pub upsert: bool,
}

impl RestRequest {
    /// Creates a request without body.
    pub fn new(verb: Verb, table: impl Into<String>) -> Self {
        Self {
            verb,
            table: table.into(),
            query: QueryParams::new(),
            body: None,
            upsert: false,
        }
    }

    /// Sets the query-string pairs.
    #[must_use]
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Enables upsert for creates.
    #[must_use]
    pub const fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }
}

/// Returns true if a `Prefer` header asks for merge-on-conflict.
///
/// The header may carry several comma-separated preferences.
#[must_use]
pub fn prefers_merge(prefer: &str) -> bool {
    prefer
        .split(',')
        .any(|p| p.trim().eq_ignore_ascii_case(MERGE_DUPLICATES))
}
