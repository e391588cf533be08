use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All levels, most severe first. Renderers group findings in this order.
    pub const ORDERED: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    /// Penalty subtracted from the 100-point security score per finding.
    pub fn weight(&self) -> u32 {
        match self {
            Self::Critical => 20,
            Self::High => 15,
            Self::Medium => 10,
            Self::Low => 5,
            Self::Info => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Info => "INFO",
        }
    }

    /// CRITICAL and HIGH findings gate the process exit code.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_score_weights() {
        assert_eq!(Severity::Critical.weight(), 20);
        assert_eq!(Severity::High.weight(), 15);
        assert_eq!(Severity::Medium.weight(), 10);
        assert_eq!(Severity::Low.weight(), 5);
        assert_eq!(Severity::Info.weight(), 2);
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
        let back: Severity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Severity::Critical);
    }
}
