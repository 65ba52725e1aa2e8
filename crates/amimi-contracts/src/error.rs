use std::fmt;

use thiserror::Error;

/// Failure kinds surfaced by the memory pipeline.
///
/// `Input` and `Precondition` are raised before any generation happens;
/// `Parse` and `Validation` describe untrusted model output that was rejected;
/// `Provider` wraps whatever the generation capability reported.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("unparseable model response: {0}")]
    Parse(String),

    #[error("{0}")]
    Validation(ValidationIssues),

    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl MemoryError {
    pub fn issues(&self) -> Option<&ValidationIssues> {
        match self {
            Self::Validation(issues) => Some(issues),
            _ => None,
        }
    }
}

impl From<ValidationIssues> for MemoryError {
    fn from(issues: ValidationIssues) -> Self {
        Self::Validation(issues)
    }
}

/// Every rule a single validation pass found violated, in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssues {
    scope: &'static str,
    issues: Vec<String>,
}

impl ValidationIssues {
    pub fn new(scope: &'static str, issues: Vec<String>) -> Self {
        Self { scope, issues }
    }

    pub fn scope(&self) -> &str {
        self.scope
    }

    pub fn as_slice(&self) -> &[String] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.issues.iter().any(|issue| issue.contains(needle))
    }

    pub fn into_vec(self) -> Vec<String> {
        self.issues
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed:", self.scope)?;
        for issue in &self.issues {
            write!(f, "\n- {issue}")?;
        }
        Ok(())
    }
}

/// Collects issues across a validation pass without stopping at the first one.
#[derive(Debug, Default)]
pub(crate) struct IssueCollector {
    issues: Vec<String>,
}

impl IssueCollector {
    pub(crate) fn push(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    pub(crate) fn check(&mut self, ok: bool, issue: impl Into<String>) {
        if !ok {
            self.push(issue);
        }
    }

    pub(crate) fn finish(self, scope: &'static str) -> Result<(), ValidationIssues> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationIssues::new(scope, self.issues))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{IssueCollector, MemoryError, ValidationIssues};

    #[test]
    fn issue_list_renders_every_entry_verbatim() {
        let issues = ValidationIssues::new(
            "Reflection",
            vec!["first problem".to_string(), "second problem".to_string()],
        );
        assert_eq!(
            issues.to_string(),
            "Reflection validation failed:\n- first problem\n- second problem"
        );
        let err = MemoryError::from(issues.clone());
        assert_eq!(err.issues(), Some(&issues));
        assert_eq!(err.to_string(), issues.to_string());
    }

    #[test]
    fn collector_only_fails_when_something_was_recorded() {
        let mut clean = IssueCollector::default();
        clean.check(true, "never recorded");
        assert!(clean.finish("Image").is_ok());

        let mut dirty = IssueCollector::default();
        dirty.check(false, "a");
        dirty.push("b");
        let issues = dirty.finish("Image").unwrap_err();
        assert_eq!(issues.as_slice(), ["a".to_string(), "b".to_string()]);
        assert_eq!(issues.scope(), "Image");
    }

    #[test]
    fn provider_errors_keep_their_context_chain() {
        let err = MemoryError::from(anyhow::anyhow!("connection reset").context("Gemini request"));
        assert!(err.issues().is_none());
        assert_eq!(format!("{err:#}"), "Gemini request: connection reset");
    }
}
