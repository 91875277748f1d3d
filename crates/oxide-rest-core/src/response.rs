//! Framework-neutral response descriptors.

use serde_json::{json, Value as JsonValue};

/// `application/json`.
pub const APPLICATION_JSON: &str = "application/json";
/// Fallback type for unrecognized binary content.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// A JSON document.
    Json(JsonValue),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

/// What the engine hands back to a responder.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    /// MIME type of the body.
    pub content_type: String,
    /// Status code; `None` means 200.
    pub status_code: Option<u16>,
    /// The body.
    pub body: ResponseBody,
}

impl ResponseDescriptor {
    /// A 200 JSON response.
    #[must_use]
    pub fn json(body: JsonValue) -> Self {
        Self {
            content_type: String::from(APPLICATION_JSON),
            status_code: None,
            body: ResponseBody::Json(body),
        }
    }

    /// A 200 binary response.
    pub fn bytes(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            status_code: None,
            body: ResponseBody::Bytes(bytes),
        }
    }

    /// A 400 response with `{"error": message}`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content_type: String::from(APPLICATION_JSON),
            status_code: Some(400),
            body: ResponseBody::Json(json!({ "error": message.into() })),
        }
    }

    /// Returns the effective status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status_code.unwrap_or(200)
    }

    /// Returns true for a 4xx/5xx status.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status() >= 400
    }

    /// Returns the JSON body, if any.
    #[must_use]
    pub const fn json_body(&self) -> Option<&JsonValue> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Bytes(_) => None,
        }
    }
}
