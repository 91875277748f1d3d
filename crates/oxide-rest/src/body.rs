//! Request body decoding.
//!
//! Bodies arrive as JSON by default. A `text/csv` content type switches to
//! CSV, where the first line names the columns and every later non-empty
//! line becomes one row object with string values.

use serde_json::{Map, Value as JsonValue};

use crate::error::BodyError;

/// Media type that selects CSV decoding.
pub const TEXT_CSV: &str = "text/csv";

/// Decodes a request body according to its media type.
///
/// An empty or all-whitespace body decodes to `None`.
///
/// # Errors
///
/// Returns an error if the body is malformed for its media type.
pub fn decode_body(content_type: Option<&str>, body: &[u8]) -> Result<Option<JsonValue>, BodyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value = if content_type == Some(TEXT_CSV) {
        decode_csv(std::str::from_utf8(body)?)?
    } else {
        serde_json::from_slice(body)?
    };
    Ok(Some(value))
}

/// Decodes CSV text into an array of row objects.
///
/// # Errors
///
/// Returns an error on an unterminated quote or a row whose field count
/// differs from the header.
pub fn decode_csv(text: &str) -> Result<JsonValue, BodyError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Ok(JsonValue::Array(Vec::new()));
    };
    let header = split_line(header_line, 1)?;

    let mut rows = Vec::new();
    for (index, line) in lines {
        let line_no = index + 1;
        let fields = split_line(line, line_no)?;
        if fields.len() != header.len() {
            return Err(BodyError::Csv(format!(
                "line {line_no} has {} fields, header has {}",
                fields.len(),
                header.len()
            )));
        }
        let object: Map<String, JsonValue> = header
            .iter()
            .cloned()
            .zip(fields.into_iter().map(JsonValue::String))
            .collect();
        rows.push(JsonValue::Object(object));
    }
    Ok(JsonValue::Array(rows))
}

/// Splits one CSV line on commas, honoring double quotes and `""` escapes.
fn split_line(line: &str, line_no: usize) -> Result<Vec<String>, BodyError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(BodyError::Csv(format!("unterminated quote on line {line_no}")));
    }
    fields.push(field);
    Ok(fields)
}
