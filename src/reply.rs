//! Cleanup of free-form model text before it is parsed as JSON.
//!
//! The model is asked for bare JSON but often wraps it in markdown fences.
//! Cleanup is plain substring removal, so a fence marker inside a string
//! value is removed as well.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

pub fn strip_code_fences(text: &str) -> String {
    text.replace(JSON_FENCE, "").replace(FENCE, "").trim().to_string()
}

/// Cleans a model reply and parses it as a JSON object.
pub fn parse_structured_reply(text: &str) -> Result<Map<String, Value>> {
    let cleaned = strip_code_fences(text);

    let parsed: Value = serde_json::from_str(&cleaned)
        .map_err(|e| Error::Parse(format!("{} (content: {})", e, cleaned)))?;

    match parsed {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::Parse(format!("expected a JSON object, got: {}", other))),
    }
}
