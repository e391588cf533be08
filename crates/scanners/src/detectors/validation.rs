//! Input validation and arithmetic safety checks.

use crate::analysis::{line_at_offset, parse_solidity_version, strip_comments};
use crate::core::{Detector, Finding, ScanContext, Severity};
use crate::parser::Function;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

/// How far back from an arithmetic operator a require/assert still counts as
/// guarding it. Tunable constant with no derivation.
const ARITHMETIC_GUARD_WINDOW: usize = 50;

static PARAMS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"function\s+\w+\s*\([^)]+\w+[^)]*\)").expect("valid regex"));

static VALIDATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(require|revert|assert)\s*\(").expect("valid regex"));

static STATE_OR_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"=\s*[^=]|\.(call|send|transfer)\s*\(").expect("valid regex"));

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"0x[a-fA-F0-9]{40}").expect("valid regex"));

pub struct ValidationDetector;

impl ValidationDetector {
    pub fn new() -> Self {
        Self
    }

    fn check_missing_validation(&self, func: &Function, file: &str) -> Option<Finding> {
        if func.is_view || func.is_pure {
            return None;
        }

        // The body starts at the signature line, so parameters are visible in it.
        if !PARAMS_RE.is_match(&func.body) {
            return None;
        }

        let stripped = strip_comments(&func.body);
        if !STATE_OR_CALL_RE.is_match(&stripped) {
            return None;
        }
        if VALIDATION_RE.is_match(&stripped) {
            return None;
        }

        Some(
            Finding::new(
                Severity::Medium,
                "Missing Input Validation",
                format!(
                    "Function '{}' accepts parameters and modifies state but lacks input \
                     validation checks. This could lead to unexpected behavior or exploitation.",
                    func.name
                ),
                file,
                func.line_start,
            )
            .with_function(&func.name)
            .with_recommendation(format!(
                "Add require() statements to validate inputs in '{}':\nrequire(condition, \"Error message\");",
                func.name
            ))
            .with_reference(
                "https://consensys.github.io/smart-contract-best-practices/development-recommendations/gas-optimization/",
            ),
        )
    }

    fn check_unsafe_arithmetic(&self, func: &Function, file: &str) -> Vec<Finding> {
        static ARITHMETIC: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
            vec![
                (
                    Regex::new(r"(\w+)\s*\+\s*(\w+)").expect("valid regex"),
                    "Addition",
                ),
                (
                    Regex::new(r"(\w+)\s*-\s*(\w+)").expect("valid regex"),
                    "Subtraction",
                ),
                (
                    Regex::new(r"(\w+)\s*\*\s*(\w+)").expect("valid regex"),
                    "Multiplication",
                ),
            ]
        });

        let mut findings = Vec::new();

        for (pattern, op_label) in ARITHMETIC.iter() {
            for m in pattern.find_iter(&func.body) {
                let mut window_start = m.start().saturating_sub(ARITHMETIC_GUARD_WINDOW);
                while !func.body.is_char_boundary(window_start) {
                    window_start -= 1;
                }
                let window = &func.body[window_start..m.start()];

                if window.contains("require") || window.contains("assert") {
                    continue;
                }

                let line = func.line_start + line_at_offset(&func.body, m.start()) - 1;

                findings.push(
                    Finding::new(
                        Severity::Medium,
                        format!("Potential Integer Overflow/Underflow: {}", op_label),
                        format!(
                            "Function '{}' performs {} operation without overflow checks. In \
                             Solidity < 0.8.0, arithmetic operations can overflow/underflow \
                             silently.",
                            func.name,
                            op_label.to_lowercase()
                        ),
                        file,
                        line,
                    )
                    .with_function(&func.name)
                    .with_recommendation(
                        "Use SafeMath library or upgrade to Solidity >= 0.8.0:\n\
                         // Solidity >= 0.8.0 has built-in overflow protection\n\
                         pragma solidity ^0.8.0;",
                    )
                    .with_reference(
                        "https://consensys.github.io/smart-contract-best-practices/development-recommendations/solidity-specific/integer-arithmetic/",
                    ),
                );

                // First unguarded occurrence per operator kind is enough.
                break;
            }
        }

        findings
    }

    fn check_hardcoded_addresses(&self, context: &ScanContext) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (idx, line) in context.document.lines().iter().enumerate() {
            for m in ADDRESS_RE.find_iter(line) {
                let before = &line[..m.start()];
                if before.contains("//") || before.contains("/*") {
                    continue;
                }

                findings.push(
                    Finding::new(
                        Severity::Low,
                        "Hardcoded Address",
                        format!(
                            "Hardcoded address found: {}. Hardcoded addresses reduce flexibility \
                             and make contracts harder to maintain. Consider using configuration \
                             variables or constructor parameters.",
                            m.as_str()
                        ),
                        context.file,
                        idx + 1,
                    )
                    .with_snippet(line.trim())
                    .with_recommendation(
                        "Use a state variable or constructor parameter:\n\
                         address public constant ADMIN = 0x...; // or\n\
                         constructor(address _admin) { admin = _admin; }",
                    )
                    .with_reference(
                        "https://consensys.github.io/smart-contract-best-practices/development-recommendations/general/external-calls/",
                    ),
                );
            }
        }

        findings
    }
}

impl Detector for ValidationDetector {
    fn id(&self) -> &'static str {
        "validation"
    }

    fn name(&self) -> &'static str {
        "Validation Detector"
    }

    fn description(&self) -> &'static str {
        "Detects missing input validation, unsafe pre-0.8 arithmetic, and hardcoded addresses"
    }

    fn detect(&self, context: &ScanContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        // 0.8+ has checked arithmetic; an unparsable or absent version is
        // treated as pre-0.8 and the check runs.
        let arithmetic_is_safe = parse_solidity_version(context.document.raw())
            .map(|v| v.has_builtin_overflow_protection())
            .unwrap_or(false);

        for contract in context.contracts {
            for func in &contract.functions {
                findings.extend(self.check_missing_validation(func, context.file));

                if !arithmetic_is_safe {
                    findings.extend(self.check_unsafe_arithmetic(func, context.file));
                }
            }
        }

        findings.extend(self.check_hardcoded_addresses(context));

        Ok(findings)
    }
}

impl Default for ValidationDetector {
    fn default() -> Self {
        Self::new()
    }
}
