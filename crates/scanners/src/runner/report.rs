use crate::core::{Finding, Severity};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// The outcome of one scan: the ordered finding sequence plus derived
/// conveniences (severity tally, security score, renderers).
///
/// Findings stay in detector-emission order; grouping by severity is a
/// rendering concern and happens only inside the renderers.
#[derive(Debug)]
pub struct ScanReport {
    file: String,
    findings: Vec<Finding>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeverityCount {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCount {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.info
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    scan_date: String,
    total_findings: usize,
    findings: &'a [Finding],
    summary: BTreeMap<&'static str, usize>,
}

impl ScanReport {
    pub fn new(file: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            file: file.into(),
            findings,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count_by_severity(&self) -> SeverityCount {
        let mut count = SeverityCount::default();
        for finding in &self.findings {
            match finding.severity {
                Severity::Critical => count.critical += 1,
                Severity::High => count.high += 1,
                Severity::Medium => count.medium += 1,
                Severity::Low => count.low += 1,
                Severity::Info => count.info += 1,
            }
        }
        count
    }

    /// Security score in `[0, 100]`: 100 minus the per-finding severity
    /// weights, floored at zero.
    pub fn security_score(&self) -> u32 {
        let penalty: u32 = self.findings.iter().map(|f| f.severity.weight()).sum();
        100u32.saturating_sub(penalty)
    }

    /// True when any CRITICAL or HIGH finding is present. Drives the CLI exit
    /// code.
    pub fn has_blocking_findings(&self) -> bool {
        self.findings.iter().any(|f| f.severity.is_blocking())
    }

    pub fn to_json(&self) -> Result<String> {
        let mut summary = BTreeMap::new();
        for severity in Severity::ORDERED {
            summary.insert(
                severity.as_str(),
                self.findings
                    .iter()
                    .filter(|f| f.severity == severity)
                    .count(),
            );
        }

        let report = JsonReport {
            file: &self.file,
            scan_date: chrono::Local::now().to_rfc3339(),
            total_findings: self.findings.len(),
            findings: &self.findings,
            summary,
        };

        Ok(serde_json::to_string_pretty(&report)?)
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from(
            "Severity,Title,File,Line,Function,Description,Recommendation\n",
        );

        for finding in &self.findings {
            let row = [
                finding.severity.as_str().to_string(),
                finding.title.clone(),
                finding.file.clone(),
                finding.line.to_string(),
                finding.function_name.clone().unwrap_or_default(),
                finding.description.replace('\n', " "),
                finding
                    .recommendation
                    .clone()
                    .unwrap_or_default()
                    .replace('\n', " "),
            ];
            let escaped: Vec<String> = row.iter().map(|field| csv_escape(field)).collect();
            out.push_str(&escaped.join(","));
            out.push('\n');
        }

        out
    }

    pub fn to_markdown(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push("# Smart Contract Security Audit Report".to_string());
        lines.push(String::new());
        lines.push(format!("**File:** `{}`", self.file));
        lines.push(format!(
            "**Scan Date:** {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        lines.push(String::new());

        lines.push("## Executive Summary".to_string());
        lines.push(String::new());

        let count = self.count_by_severity();
        lines.push(format!(
            "This audit identified **{}** security findings across the analyzed smart contract.",
            self.findings.len()
        ));
        lines.push(String::new());
        lines.push("### Severity Breakdown".to_string());
        lines.push(String::new());
        lines.push("| Severity | Count |".to_string());
        lines.push("|----------|-------|".to_string());
        for severity in Severity::ORDERED {
            let n = count.get(severity);
            if n > 0 {
                lines.push(format!("| {} | {} |", severity, n));
            }
        }
        lines.push(String::new());

        let blocking = count.critical + count.high;
        if blocking > 0 {
            lines.push(format!(
                "**{} critical/high severity issues** require immediate attention.",
                blocking
            ));
            lines.push(String::new());
        }

        for severity in Severity::ORDERED {
            let severity_findings: Vec<&Finding> = self
                .findings
                .iter()
                .filter(|f| f.severity == severity)
                .collect();
            if severity_findings.is_empty() {
                continue;
            }

            lines.push(format!("## {} Findings", severity));
            lines.push(String::new());

            for (i, finding) in severity_findings.iter().enumerate() {
                lines.push(format!("### {}. {}", i + 1, finding.title));
                lines.push(String::new());
                lines.push(format!("**Location:** `{}:{}`", finding.file, finding.line));
                if let Some(ref function) = finding.function_name {
                    lines.push(format!("**Function:** `{}`", function));
                }
                lines.push(String::new());
                lines.push("**Description:**".to_string());
                lines.push(String::new());
                lines.push(finding.description.clone());
                lines.push(String::new());

                if let Some(ref snippet) = finding.code_snippet {
                    lines.push("**Code Snippet:**".to_string());
                    lines.push(String::new());
                    lines.push("```solidity".to_string());
                    lines.push(snippet.clone());
                    lines.push("```".to_string());
                    lines.push(String::new());
                }

                if let Some(ref recommendation) = finding.recommendation {
                    lines.push("**Recommendation:**".to_string());
                    lines.push(String::new());
                    lines.push(recommendation.clone());
                    lines.push(String::new());
                }

                if let Some(ref reference) = finding.reference {
                    lines.push("**References:**".to_string());
                    lines.push(String::new());
                    lines.push(reference.clone());
                    lines.push(String::new());
                }

                lines.push("---".to_string());
                lines.push(String::new());
            }
        }

        lines.push("## General Recommendations".to_string());
        lines.push(String::new());
        lines.push(
            "1. **Follow CEI Pattern**: Always update state (Effects) before making external calls (Interactions)"
                .to_string(),
        );
        lines.push(
            "2. **Use Reentrancy Guards**: Implement and use `nonReentrant` modifiers from OpenZeppelin"
                .to_string(),
        );
        lines.push("3. **Input Validation**: Validate all inputs with `require()` statements".to_string());
        lines.push("4. **Access Control**: Protect admin functions with proper modifiers".to_string());
        lines.push(
            "5. **Upgrade Solidity**: Use Solidity >= 0.8.0 for built-in overflow protection".to_string(),
        );
        lines.push("6. **Events**: Emit events for important state changes".to_string());
        lines.push(String::new());

        lines.push("---".to_string());
        lines.push(String::new());
        lines.push("*This report was generated by Kansa*".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity) -> Finding {
        Finding::new(severity, "Test Finding", "description", "test.sol", 1)
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let findings = vec![
            finding(Severity::Critical),
            finding(Severity::Critical),
            finding(Severity::Critical),
            finding(Severity::Critical),
            finding(Severity::Critical),
        ];
        let report = ScanReport::new("test.sol", findings);
        assert_eq!(report.security_score(), 0);
    }

    #[test]
    fn test_score_monotonically_decreases() {
        let mut findings = Vec::new();
        let mut previous = 100;
        for severity in [Severity::Info, Severity::Low, Severity::High, Severity::Critical] {
            findings.push(finding(severity));
            let score = ScanReport::new("test.sol", findings.clone()).security_score();
            assert!(score <= previous);
            assert!(score <= 100);
            previous = score;
        }
    }

    #[test]
    fn test_empty_report_scores_100() {
        let report = ScanReport::new("test.sol", Vec::new());
        assert_eq!(report.security_score(), 100);
        assert!(!report.has_blocking_findings());
    }

    #[test]
    fn test_count_by_severity() {
        let report = ScanReport::new(
            "test.sol",
            vec![
                finding(Severity::High),
                finding(Severity::High),
                finding(Severity::Low),
            ],
        );
        let count = report.count_by_severity();
        assert_eq!(count.high, 2);
        assert_eq!(count.low, 1);
        assert_eq!(count.critical, 0);
        assert_eq!(count.total(), 3);
    }

    #[test]
    fn test_csv_escapes_commas() {
        let f = Finding::new(Severity::Low, "Title, with comma", "desc", "a.sol", 2);
        let report = ScanReport::new("a.sol", vec![f]);
        let csv = report.to_csv();
        assert!(csv.contains("\"Title, with comma\""));
    }

    #[test]
    fn test_findings_preserve_insertion_order() {
        let report = ScanReport::new(
            "test.sol",
            vec![finding(Severity::Low), finding(Severity::Critical)],
        );
        assert_eq!(report.findings()[0].severity, Severity::Low);
        assert_eq!(report.findings()[1].severity, Severity::Critical);
    }
}
