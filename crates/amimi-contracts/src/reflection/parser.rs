use serde_json::Value;

use crate::error::MemoryError;

use super::ReflectionCandidate;

/// Pulls the reflection object out of free-form model text.
///
/// Only the span from the first `{` to the last `}` is parsed, so prose or
/// code fences around the JSON are ignored. A top-level array is unwrapped to
/// its first element.
pub fn parse_reflection_response(text: &str) -> Result<ReflectionCandidate, MemoryError> {
    let span = json_object_span(text)
        .ok_or_else(|| MemoryError::Parse("no JSON object found in model response".to_string()))?;
    let parsed: Value = serde_json::from_str(span)
        .map_err(|err| MemoryError::Parse(format!("embedded JSON is invalid: {err}")))?;

    let payload = match parsed {
        Value::Array(rows) => rows.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };
    match payload {
        Value::Object(fields) => Ok(ReflectionCandidate::new(fields)),
        other => Err(MemoryError::Parse(format!(
            "expected a JSON object, found {}",
            value_kind(&other)
        ))),
    }
}

fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
