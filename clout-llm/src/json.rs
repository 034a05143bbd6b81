//! Helpers for reading JSON answers out of free-form model replies.
//!
//! Models are asked for strict JSON but often wrap it in prose or code
//! fences. [`extract_json_object`] takes the span from the first `{` to the
//! last `}` (greedy). That is fragile when the surrounding prose itself
//! contains braces: the span then covers both and fails to decode, which
//! callers treat like any other malformed reply.

use clout_common::{CloutError, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

static OBJECT_SPAN: OnceLock<Option<Regex>> = OnceLock::new();

/// Greedy first-`{`-to-last-`}` span of `text`, if any.
///
/// ```
/// use clout_llm::json::extract_json_object;
///
/// let reply = "Sure! ```json\n{\"fraudScore\": 12}\n``` hope that helps";
/// assert_eq!(extract_json_object(reply), Some("{\"fraudScore\": 12}"));
/// assert_eq!(extract_json_object("not json"), None);
/// ```
pub fn extract_json_object(text: &str) -> Option<&str> {
    let re = OBJECT_SPAN
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").ok())
        .as_ref()?;
    re.find(text).map(|m| m.as_str())
}

/// Extract and decode the JSON object embedded in a model reply.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>> {
    let span = extract_json_object(text)
        .ok_or_else(|| CloutError::MalformedResponse("no JSON object in reply".into()))?;
    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CloutError::MalformedResponse(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(CloutError::MalformedResponse(format!(
            "invalid JSON in reply: {e}"
        ))),
    }
}

/// Read a number that may have been sent as a JSON number or a numeric string.
/// Non-finite values are rejected.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Required numeric field of a decoded reply.
pub fn number_field(obj: &Map<String, Value>, key: &str) -> Result<f64> {
    obj.get(key)
        .and_then(coerce_number)
        .ok_or_else(|| CloutError::MalformedResponse(format!("`{key}` missing or not a number")))
}
