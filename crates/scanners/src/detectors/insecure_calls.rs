//! Insecure external call checks: delegatecall usage and unchecked return
//! values.

use crate::analysis::line_at_offset;
use crate::core::{Detector, Finding, ScanContext, Severity};
use crate::parser::Function;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

/// Window after a call site inspected for a `(bool x` destructuring.
const RETURN_CHECK_WINDOW: usize = 200;

/// Window after a call site inspected for a follow-up `require(`.
const REQUIRE_AFTER_WINDOW: usize = 500;

static DELEGATECALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.delegatecall\s*\(").expect("valid regex"));

static USER_INPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"msg\.data|msg\.sender|abi\.decode").expect("valid regex"));

static LOW_LEVEL_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\.(call|send|delegatecall)\s*\(").expect("valid regex"));

static RETURN_CAPTURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(bool\s+\w+").expect("valid regex"));

static REQUIRE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"require\s*\(").expect("valid regex"));

pub struct InsecureCallsDetector;

impl InsecureCallsDetector {
    pub fn new() -> Self {
        Self
    }

    fn check_delegatecall(&self, func: &Function, file: &str) -> Option<Finding> {
        if !DELEGATECALL_RE.is_match(&func.body) {
            return None;
        }

        let has_user_input = USER_INPUT_RE.is_match(&func.body);

        let (severity, description) = if has_user_input {
            (
                Severity::Critical,
                format!(
                    "Function '{}' uses delegatecall with user-controlled input. This is \
                     extremely dangerous as it allows an attacker to execute arbitrary code in \
                     the context of your contract, potentially taking full control.",
                    func.name
                ),
            )
        } else {
            (
                Severity::High,
                format!(
                    "Function '{}' uses delegatecall. Delegatecall executes code in the context \
                     of the calling contract, which can lead to storage collisions and \
                     unexpected behavior if not handled carefully.",
                    func.name
                ),
            )
        };

        Some(
            Finding::new(
                severity,
                "Unsafe delegatecall Usage",
                description,
                file,
                func.line_start,
            )
            .with_function(&func.name)
            .with_recommendation(
                "Avoid delegatecall unless absolutely necessary. If you must use it:\n\
                 1. Validate the target address\n\
                 2. Use a whitelist of allowed contracts\n\
                 3. Consider using a proxy pattern with proper access control",
            )
            .with_reference(
                "Real-world examples:\n\
                 - Parity Wallet Hack (2017): $30M frozen due to delegatecall bug\n\
                 - Multiple exploits involving delegatecall\n\
                 https://consensys.github.io/smart-contract-best-practices/development-recommendations/solidity-specific/delegatecall/",
            ),
        )
    }

    fn check_unchecked_returns(&self, func: &Function, file: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        let body = &func.body;

        for m in LOW_LEVEL_CALL_RE.find_iter(body) {
            let call_start = m.start();

            let capture_window = window_after(body, call_start, RETURN_CHECK_WINDOW);
            if RETURN_CAPTURE_RE.is_match(capture_window) {
                continue;
            }

            let require_window = window_after(body, call_start, REQUIRE_AFTER_WINDOW);
            if REQUIRE_RE.is_match(require_window) {
                continue;
            }

            let line = func.line_start + line_at_offset(body, call_start) - 1;

            findings.push(
                Finding::new(
                    Severity::Medium,
                    "Unchecked Return Value from External Call",
                    format!(
                        "Function '{}' makes an external call but does not check the return \
                         value. If the call fails, execution continues, which could lead to \
                         unexpected behavior.",
                        func.name
                    ),
                    file,
                    line,
                )
                .with_function(&func.name)
                .with_recommendation(
                    "Always check return values:\n\
                     (bool success, bytes memory data) = target.call{value: amount}(\"\");\n\
                     require(success, \"Call failed\");",
                )
                .with_reference(
                    "https://consensys.github.io/smart-contract-best-practices/development-recommendations/general/external-calls/",
                ),
            );
        }

        findings
    }
}

/// Slice of `text` from `start` extending `len` bytes, clamped to the end and
/// backed off to a char boundary.
fn window_after(text: &str, start: usize, len: usize) -> &str {
    let mut end = (start + len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}

impl Detector for InsecureCallsDetector {
    fn id(&self) -> &'static str {
        "insecure-calls"
    }

    fn name(&self) -> &'static str {
        "Insecure Calls Detector"
    }

    fn description(&self) -> &'static str {
        "Detects unsafe delegatecall usage and unchecked return values from external calls"
    }

    fn detect(&self, context: &ScanContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for contract in context.contracts {
            for func in &contract.functions {
                findings.extend(self.check_delegatecall(func, context.file));
                findings.extend(self.check_unchecked_returns(func, context.file));
            }
        }

        Ok(findings)
    }
}

impl Default for InsecureCallsDetector {
    fn default() -> Self {
        Self::new()
    }
}
