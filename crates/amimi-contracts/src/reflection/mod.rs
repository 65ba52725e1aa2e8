mod parser;
mod validator;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::MemoryError;

pub use parser::parse_reflection_response;
pub use validator::{
    contains_actionable_suggestion, contains_harsh_language, validate_reflection,
    ACTIONABLE_MARKERS, HARSH_MARKERS, MIN_SUMMARY_CHARS,
};

/// Parsed but untrusted reflection payload, keyed by the model's snake_case field names.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionCandidate {
    fields: Map<String, Value>,
}

impl ReflectionCandidate {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// A reflection that passed validation (or was typed in by hand).
///
/// There is no way to build one from raw JSON other than
/// [`validate_reflection`], so anything holding a `MemoryEntry` holds
/// trimmed, non-empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntry {
    summary: String,
    lovely_message: String,
    amy_feedback: String,
    jay_feedback: String,
}

impl MemoryEntry {
    /// Manual path: only emptiness is checked, content rules are skipped.
    pub fn manual(
        summary: &str,
        lovely_message: &str,
        amy_feedback: &str,
        jay_feedback: &str,
    ) -> Result<Self, MemoryError> {
        let fields = [
            ("summary", summary),
            ("lovely message", lovely_message),
            ("Amy feedback", amy_feedback),
            ("Jay feedback", jay_feedback),
        ];
        let empty: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !empty.is_empty() {
            return Err(MemoryError::Input(format!(
                "all reflection fields must be non-empty (empty: {})",
                empty.join(", ")
            )));
        }
        Ok(Self::from_trimmed(
            summary,
            lovely_message,
            amy_feedback,
            jay_feedback,
        ))
    }

    fn from_trimmed(
        summary: &str,
        lovely_message: &str,
        amy_feedback: &str,
        jay_feedback: &str,
    ) -> Self {
        Self {
            summary: summary.trim().to_string(),
            lovely_message: lovely_message.trim().to_string(),
            amy_feedback: amy_feedback.trim().to_string(),
            jay_feedback: jay_feedback.trim().to_string(),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn lovely_message(&self) -> &str {
        &self.lovely_message
    }

    pub fn amy_feedback(&self) -> &str {
        &self.amy_feedback
    }

    pub fn jay_feedback(&self) -> &str {
        &self.jay_feedback
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::MemoryError;

    use super::MemoryEntry;

    #[test]
    fn manual_entry_trims_and_rejects_blank_fields() {
        let entry = MemoryEntry::manual("  a short one ", "love\n", " x", "y ").unwrap();
        assert_eq!(entry.summary(), "a short one");
        assert_eq!(entry.lovely_message(), "love");
        assert_eq!(entry.amy_feedback(), "x");
        assert_eq!(entry.jay_feedback(), "y");

        let err = MemoryEntry::manual("summary", " ", "x", "").unwrap_err();
        match err {
            MemoryError::Input(message) => {
                assert!(message.contains("lovely message"));
                assert!(message.contains("Jay feedback"));
                assert!(!message.contains("summary,"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn entry_serializes_with_camel_case_keys() {
        let entry = MemoryEntry::manual("s", "l", "a", "j").unwrap();
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "summary": "s",
                "lovelyMessage": "l",
                "amyFeedback": "a",
                "jayFeedback": "j",
            })
        );
    }
}
