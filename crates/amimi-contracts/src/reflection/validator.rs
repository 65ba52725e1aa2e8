use serde_json::Value;

use crate::error::{IssueCollector, ValidationIssues};

use super::{MemoryEntry, ReflectionCandidate};

pub const MIN_SUMMARY_CHARS: usize = 20;

/// Case-insensitive substrings that count as a concrete suggestion.
pub const ACTIONABLE_MARKERS: &[&str] = &[
    "could",
    "try",
    "consider",
    "might",
    "suggest",
    "maybe",
    "continue",
    "share",
    "open",
    "start",
    "initiating",
    "proactive",
    "explore",
    "exploring",
];

/// Case-insensitive substrings a summary must never contain. Matched inside words too.
pub const HARSH_MARKERS: &[&str] = &["terrible", "awful", "wrong", "stupid", "fail"];

const SCOPE: &str = "Reflection";

/// Runs every reflection rule and reports all violations at once.
pub fn validate_reflection(candidate: &ReflectionCandidate) -> Result<MemoryEntry, ValidationIssues> {
    let mut issues = IssueCollector::default();

    let summary = required_text(candidate, "summary", MIN_SUMMARY_CHARS);
    issues.check(
        summary.is_some(),
        format!(
            "summary is missing, not a string, or too short (minimum {MIN_SUMMARY_CHARS} characters)"
        ),
    );
    let lovely_message = required_text(candidate, "lovely_message", 1);
    issues.check(
        lovely_message.is_some(),
        "lovely_message (lovelyMessage) is missing, not a string, or empty",
    );
    let amy_feedback = required_text(candidate, "amy_feedback", 1);
    issues.check(
        amy_feedback.is_some(),
        "amy_feedback (amyFeedback) is missing, not a string, or empty",
    );
    let jay_feedback = required_text(candidate, "jay_feedback", 1);
    issues.check(
        jay_feedback.is_some(),
        "jay_feedback (jayFeedback) is missing, not a string, or empty",
    );

    for key in ["amy_feedback", "jay_feedback"] {
        if let Some(feedback) = present_text(candidate, key) {
            issues.check(
                contains_actionable_suggestion(feedback),
                format!(
                    "{key} lacks actionable suggestions (should include \"could\", \"try\", \"consider\", etc.)"
                ),
            );
        }
    }
    if let Some(raw_summary) = present_text(candidate, "summary") {
        issues.check(
            !contains_harsh_language(raw_summary),
            "summary contains inappropriate harsh language",
        );
    }

    issues.finish(SCOPE)?;
    match (summary, lovely_message, amy_feedback, jay_feedback) {
        (Some(summary), Some(lovely_message), Some(amy_feedback), Some(jay_feedback)) => Ok(
            MemoryEntry::from_trimmed(summary, lovely_message, amy_feedback, jay_feedback),
        ),
        _ => unreachable!("every absent reflection field records an issue"),
    }
}

pub fn contains_actionable_suggestion(text: &str) -> bool {
    contains_any(text, ACTIONABLE_MARKERS)
}

pub fn contains_harsh_language(text: &str) -> bool {
    contains_any(text, HARSH_MARKERS)
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    markers.iter().any(|marker| lowered.contains(marker))
}

/// Trimmed text when the field is a string of at least `min_chars` characters.
/// Length counts Unicode scalar values, not UTF-16 code units.
fn required_text<'a>(
    candidate: &'a ReflectionCandidate,
    key: &str,
    min_chars: usize,
) -> Option<&'a str> {
    let trimmed = candidate.get(key).and_then(Value::as_str)?.trim();
    (trimmed.chars().count() >= min_chars).then_some(trimmed)
}

/// Untrimmed text for content rules, which only look at non-empty string fields.
fn present_text<'a>(candidate: &'a ReflectionCandidate, key: &str) -> Option<&'a str> {
    candidate
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
