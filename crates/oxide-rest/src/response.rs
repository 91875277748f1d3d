//! HTTP response type.

use std::collections::HashMap;

use oxide_rest_core::response::APPLICATION_JSON;
use oxide_rest_core::{ResponseBody, ResponseDescriptor, Verb};
use serde_json::json;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates an empty response with the given status.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a response with a raw body and content type.
    pub fn with_body(status: u16, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(status).header("Content-Type", content_type).body(body)
    }

    /// Creates a JSON response.
    #[must_use]
    pub fn json(status: u16, data: &serde_json::Value) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self::with_body(status, APPLICATION_JSON, body),
            Err(_) => Self::new(500),
        }
    }

    /// Sends an engine descriptor: JSON bodies are serialized, byte
    /// bodies go out raw under their negotiated type.
    #[must_use]
    pub fn from_descriptor(descriptor: ResponseDescriptor) -> Self {
        let status = descriptor.status();
        match descriptor.body {
            ResponseBody::Json(value) => Self::json(status, &value),
            ResponseBody::Bytes(bytes) => Self::with_body(status, descriptor.content_type, bytes),
        }
    }

    /// Creates a 400 response with `{"error": message}`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::json(400, &json!({ "error": message.into() }))
    }

    /// Creates a 413 response for a body over `limit` bytes.
    #[must_use]
    pub fn payload_too_large(limit: usize) -> Self {
        Self::json(
            413,
            &json!({ "error": format!("request body exceeds {limit} bytes") }),
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(path: &str) -> Self {
        Self::json(404, &json!({ "error": format!("no route for {path}") }))
    }

    /// Creates a 405 response listing the methods the route accepts.
    #[must_use]
    pub fn method_not_allowed(allowed: &[Verb]) -> Self {
        let allow = allowed
            .iter()
            .map(|verb| verb.method())
            .collect::<Vec<_>>()
            .join(", ");
        Self::json(405, &json!({ "error": "method not allowed" })).header("Allow", allow)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Gets a header value, case-insensitively.
    #[must_use]
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn json_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
