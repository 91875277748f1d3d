//! Decoded create/replace bodies.

use serde_json::{Map, Value as JsonValue};

use crate::error::{RestError, Result};
use crate::value::SqlValue;

/// One row to write, as column/value pairs in body order.
pub type RowValues = Vec<(String, SqlValue)>;

/// A write body: one row object or an ordered batch of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A single JSON object.
    Single(RowValues),
    /// A JSON array of objects.
    Batch(Vec<RowValues>),
}

impl Payload {
    /// Converts a decoded body into rows.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidBody`] for anything other than an object
    /// or a non-empty array of objects.
    pub fn from_json(body: &JsonValue) -> Result<Self> {
        match body {
            JsonValue::Object(object) => Ok(Self::Single(row_values(object))),
            JsonValue::Array(items) if items.is_empty() => {
                Err(RestError::InvalidBody(String::from("empty list")))
            }
            JsonValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    JsonValue::Object(object) => Ok(row_values(object)),
                    other => Err(RestError::InvalidBody(format!(
                        "element {i} is {}, expected an object",
                        json_type(other)
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Batch),
            other => Err(RestError::InvalidBody(format!(
                "expected an object or a list of objects, got {}",
                json_type(other)
            ))),
        }
    }

    /// Keeps only the named columns in every row. Missing columns are left
    /// out so their defaults apply.
    #[must_use]
    pub fn project(self, columns: &[String]) -> Self {
        let keep = |row: RowValues| -> RowValues {
            row.into_iter()
                .filter(|(name, _)| columns.contains(name))
                .collect()
        };
        match self {
            Self::Single(row) => Self::Single(keep(row)),
            Self::Batch(rows) => Self::Batch(rows.into_iter().map(keep).collect()),
        }
    }

    /// Returns the rows in order.
    #[must_use]
    pub fn into_rows(self) -> Vec<RowValues> {
        match self {
            Self::Single(row) => vec![row],
            Self::Batch(rows) => rows,
        }
    }
}

fn row_values(object: &Map<String, JsonValue>) -> RowValues {
    object
        .iter()
        .map(|(name, value)| (name.clone(), SqlValue::from_json(value)))
        .collect()
}

const fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "an object",
    }
}
