//! Reentrancy detection.
//!
//! Four independent checks per non-view/non-pure function: a missing
//! `nonReentrant` guard where the contract declares one, external calls
//! ordered before state writes (CEI violation), deprecated transfer
//! primitives, and state-changing payable entry points reachable through a
//! fallback.

use crate::analysis::line_at_offset;
use crate::core::{Detector, Finding, ScanContext, Severity};
use crate::parser::{Contract, Function};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static EXTERNAL_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(call|send|transfer|delegatecall)(\s*\{[^}]*\})?\s*\(").expect("valid regex")
});

/// External-call forms considered "interactions" by the CEI check, matched in
/// this order when collecting call offsets.
static CEI_CALL_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\.call\s*\{value:",
        r"\.call\s*\(",
        r"\.call\.value\s*\(",
        r"\.send\s*\(",
        r"\.transfer\s*\(",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"=\s*[^=]").expect("valid regex"));

static REQUIRE_MSG_SENDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"require\s*\(.*msg\.sender").expect("valid regex"));

const REENTRANCY_REFERENCE: &str =
    "https://consensys.github.io/smart-contract-best-practices/attacks/reentrancy/";

pub struct ReentrancyDetector;

impl ReentrancyDetector {
    pub fn new() -> Self {
        Self
    }

    fn check_missing_guard(
        &self,
        func: &Function,
        contract: &Contract,
        file: &str,
    ) -> Option<Finding> {
        if !EXTERNAL_CALL_RE.is_match(&func.body) {
            return None;
        }
        if func.modifiers.iter().any(|m| m == "nonReentrant") {
            return None;
        }
        // Only flag when the contract actually has the guard available.
        if !contract.modifiers.iter().any(|m| m == "nonReentrant") {
            return None;
        }

        Some(
            Finding::new(
                Severity::High,
                "Missing Reentrancy Guard",
                format!(
                    "Function '{}' makes external calls but does not use the 'nonReentrant' \
                     modifier. This could allow reentrancy attacks.",
                    func.name
                ),
                file,
                func.line_start,
            )
            .with_function(&func.name)
            .with_recommendation(format!(
                "Add the 'nonReentrant' modifier to function '{}':\nfunction {}(...) nonReentrant {{ ... }}",
                func.name, func.name
            ))
            .with_reference(REENTRANCY_REFERENCE),
        )
    }

    fn check_cei_violation(
        &self,
        func: &Function,
        contract: &Contract,
        context: &ScanContext,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();

        if contract.state_variables.is_empty() {
            return findings;
        }

        let mut call_positions = Vec::new();
        for pattern in CEI_CALL_RES.iter() {
            for m in pattern.find_iter(&func.body) {
                call_positions.push(m.start());
            }
        }

        let mut write_positions = Vec::new();
        for var in &contract.state_variables {
            let pattern = Regex::new(&format!(
                r"\b{}\s*(?:\[[^\]]*\])?\s*[-+]?=",
                regex::escape(&var.name)
            ))
            .expect("valid regex");
            for m in pattern.find_iter(&func.body) {
                write_positions.push((var.name.clone(), m.start()));
            }
        }

        if call_positions.is_empty() || write_positions.is_empty() {
            return findings;
        }

        for call_pos in call_positions {
            // First write past the call wins; one finding per offending call.
            for (var_name, write_pos) in &write_positions {
                if call_pos < *write_pos {
                    let call_line = func.line_start + line_at_offset(&func.body, call_pos) - 1;

                    findings.push(
                        Finding::new(
                            Severity::Critical,
                            "Reentrancy Vulnerability: External Call Before State Update",
                            format!(
                                "Function '{}' violates the Checks-Effects-Interactions (CEI) \
                                 pattern. An external call occurs before state variable '{}' is \
                                 updated. This allows an attacker to re-enter the function and \
                                 drain funds.",
                                func.name, var_name
                            ),
                            context.file,
                            call_line,
                        )
                        .with_function(&func.name)
                        .with_snippet(context.document.snippet(call_line, 3))
                        .with_recommendation(format!(
                            "Follow the CEI pattern:\n\
                             1. Checks: Validate all conditions\n\
                             2. Effects: Update state variables\n\
                             3. Interactions: Make external calls\n\n\
                             Move the state update for '{}' before the external call.",
                            var_name
                        ))
                        .with_reference(format!(
                            "Real-world examples:\n\
                             - The DAO Hack (2016): $60M stolen\n\
                             - Lendf.me (2020): $25M stolen\n\
                             - dForce (2020): $25M stolen\n{}",
                            REENTRANCY_REFERENCE
                        )),
                    );
                    break;
                }
            }
        }

        findings
    }

    fn check_deprecated_calls(&self, func: &Function, file: &str) -> Vec<Finding> {
        static DEPRECATED: Lazy<Vec<(Regex, &'static str, Severity)>> = Lazy::new(|| {
            vec![
                (
                    Regex::new(r"\.call\.value\s*\(").expect("valid regex"),
                    "call.value()",
                    Severity::High,
                ),
                (
                    Regex::new(r"\.send\s*\(").expect("valid regex"),
                    "send()",
                    Severity::Medium,
                ),
                (
                    Regex::new(r"\.transfer\s*\(").expect("valid regex"),
                    "transfer()",
                    Severity::Medium,
                ),
            ]
        });

        let mut findings = Vec::new();

        for (pattern, method_name, severity) in DEPRECATED.iter() {
            for m in pattern.find_iter(&func.body) {
                let line = func.line_start + line_at_offset(&func.body, m.start()) - 1;

                findings.push(
                    Finding::new(
                        *severity,
                        format!("Deprecated Call Pattern: {}", method_name),
                        format!(
                            "Function '{}' uses the deprecated {} pattern. {} has a gas limit of \
                             2300 and can fail silently. Use low-level call() with proper error \
                             handling instead.",
                            func.name, method_name, method_name
                        ),
                        file,
                        line,
                    )
                    .with_function(&func.name)
                    .with_recommendation(format!(
                        "Replace {} with:\n(bool success, ) = recipient.call{{value: amount}}(\"\");\nrequire(success, \"Transfer failed\");",
                        method_name
                    ))
                    .with_reference(REENTRANCY_REFERENCE),
                );
            }
        }

        findings
    }

    fn check_fallback_vector(&self, func: &Function, file: &str) -> Option<Finding> {
        if !func.visibility.is_externally_callable() || !func.is_payable {
            return None;
        }
        if !ASSIGNMENT_RE.is_match(&func.body) {
            return None;
        }
        if REQUIRE_MSG_SENDER_RE.is_match(&func.body) {
            return None;
        }

        Some(
            Finding::new(
                Severity::Medium,
                "Potential Reentrancy via Fallback",
                format!(
                    "Function '{}' is public/external and payable, making it callable via \
                     fallback functions. If it modifies state without proper guards, it could be \
                     exploited in a reentrancy attack.",
                    func.name
                ),
                file,
                func.line_start,
            )
            .with_function(&func.name)
            .with_recommendation(format!(
                "Add access control or reentrancy guard to '{}':\n\
                 - Use 'nonReentrant' modifier\n\
                 - Add require() checks for authorized callers",
                func.name
            ))
            .with_reference(REENTRANCY_REFERENCE),
        )
    }
}

impl Detector for ReentrancyDetector {
    fn id(&self) -> &'static str {
        "reentrancy"
    }

    fn name(&self) -> &'static str {
        "Reentrancy Detector"
    }

    fn description(&self) -> &'static str {
        "Detects CEI violations, missing reentrancy guards, deprecated call patterns, and fallback attack vectors"
    }

    fn detect(&self, context: &ScanContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for contract in context.contracts {
            for func in &contract.functions {
                if func.is_view || func.is_pure {
                    continue;
                }

                findings.extend(self.check_missing_guard(func, contract, context.file));
                findings.extend(self.check_cei_violation(func, contract, context));
                findings.extend(self.check_deprecated_calls(func, context.file));
                findings.extend(self.check_fallback_vector(func, context.file));
            }
        }

        Ok(findings)
    }
}

impl Default for ReentrancyDetector {
    fn default() -> Self {
        Self::new()
    }
}
