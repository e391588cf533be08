use crate::core::Severity;
use serde::{Deserialize, Serialize};

/// A single security finding. Immutable once built; detectors construct these
/// with the builder methods and never touch them again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,

    pub title: String,

    pub description: String,

    pub file: String,

    /// 1-based line in the scanned document.
    pub line: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Finding {
    pub fn new(
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        file: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            severity,
            title: title.into(),
            description: description.into(),
            file: file.into(),
            line,
            function_name: None,
            code_snippet: None,
            recommendation: None,
            reference: None,
        }
    }

    pub fn with_function(mut self, function: &str) -> Self {
        self.function_name = Some(function.to_string());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.code_snippet = Some(snippet.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let finding = Finding::new(
            Severity::High,
            "Missing Reentrancy Guard",
            "external call without guard",
            "Vault.sol",
            12,
        )
        .with_function("withdraw")
        .with_recommendation("add the nonReentrant modifier");

        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.line, 12);
        assert_eq!(finding.function_name.as_deref(), Some("withdraw"));
        assert!(finding.code_snippet.is_none());
        assert!(finding.reference.is_none());
    }

    #[test]
    fn test_optional_fields_absent_from_json() {
        let finding = Finding::new(Severity::Low, "Hardcoded Address", "desc", "a.sol", 3);
        let json = serde_json::to_string(&finding).unwrap();
        assert!(!json.contains("function_name"));
        assert!(!json.contains("recommendation"));
    }
}
