//! Anti-pattern checks: insecure randomness sources, unprotected admin
//! functions, missing event emissions, and tx.origin authorization.

use crate::core::{Detector, Finding, ScanContext, Severity};
use crate::parser::Function;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"=\s*[^=]").expect("valid regex"));

static REQUIRE_MSG_SENDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"require\s*\(.*msg\.sender").expect("valid regex"));

static EMIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"emit\s+\w+\s*\(").expect("valid regex"));

static TX_ORIGIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\btx\.origin\b").expect("valid regex"));

const ADMIN_NAME_HINTS: &[&str] = &["admin", "owner", "onlyOwner", "setOwner", "transferOwnership"];

const ACCESS_CONTROL_MODIFIERS: &[&str] = &["onlyOwner", "onlyAdmin", "onlyRole"];

const EVENT_WORTHY_HINTS: &[&str] = &["transfer", "withdraw", "deposit", "mint", "burn", "approve"];

pub struct BadPatternsDetector;

impl BadPatternsDetector {
    pub fn new() -> Self {
        Self
    }

    fn check_insecure_randomness(&self, func: &Function, file: &str) -> Vec<Finding> {
        static RANDOMNESS_SOURCES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
            vec![
                (
                    Regex::new(r"block\.timestamp").expect("valid regex"),
                    "block.timestamp",
                ),
                (
                    Regex::new(r"block\.number").expect("valid regex"),
                    "block.number",
                ),
                (
                    Regex::new(r"blockhash\s*\(").expect("valid regex"),
                    "blockhash()",
                ),
                (
                    Regex::new(r"block\.difficulty").expect("valid regex"),
                    "block.difficulty",
                ),
            ]
        });

        let mut findings = Vec::new();

        // One finding per source kind present, not per occurrence.
        for (pattern, source_name) in RANDOMNESS_SOURCES.iter() {
            if !pattern.is_match(&func.body) {
                continue;
            }

            findings.push(
                Finding::new(
                    Severity::High,
                    format!("Insecure Randomness: {}", source_name),
                    format!(
                        "Function '{}' uses {} for randomness. Block properties are predictable \
                         and can be manipulated by miners. This makes the contract vulnerable to \
                         exploitation.",
                        func.name, source_name
                    ),
                    file,
                    func.line_start,
                )
                .with_function(&func.name)
                .with_recommendation(
                    "Use a commit-reveal scheme or Chainlink VRF for secure randomness:\n\
                     // Commit-reveal scheme\n\
                     // Or use Chainlink VRF\n\
                     import \"@chainlink/contracts/src/v0.8/VRFConsumerBase.sol\";",
                )
                .with_reference(
                    "Real-world examples:\n\
                     - Fomo3D: Predictable randomness exploited\n\
                     https://consensys.github.io/smart-contract-best-practices/development-recommendations/solidity-specific/randomness/",
                ),
            );
        }

        findings
    }

    fn check_unprotected_admin(&self, func: &Function, file: &str) -> Option<Finding> {
        let lower_name = func.name.to_lowercase();
        let is_admin_function = ADMIN_NAME_HINTS
            .iter()
            .any(|hint| lower_name.contains(&hint.to_lowercase()));

        if !is_admin_function {
            return None;
        }

        let has_access_control = func
            .modifiers
            .iter()
            .any(|m| ACCESS_CONTROL_MODIFIERS.contains(&m.as_str()));
        if has_access_control {
            return None;
        }
        if REQUIRE_MSG_SENDER_RE.is_match(&func.body) {
            return None;
        }

        Some(
            Finding::new(
                Severity::Critical,
                "Unprotected Admin Function",
                format!(
                    "Function '{}' appears to be an admin function but lacks access control. \
                     Anyone can call this function, potentially allowing unauthorized changes to \
                     the contract.",
                    func.name
                ),
                file,
                func.line_start,
            )
            .with_function(&func.name)
            .with_recommendation(format!(
                "Add access control to '{}':\n\
                 modifier onlyOwner() {{\n\
                 \x20   require(msg.sender == owner, \"Not owner\");\n\
                 \x20   _;\n\
                 }}\n\n\
                 function {}(...) onlyOwner {{ ... }}",
                func.name, func.name
            ))
            .with_reference(
                "Real-world examples:\n\
                 - Parity Wallet Hack: Unprotected init function\n\
                 https://consensys.github.io/smart-contract-best-practices/development-recommendations/general/external-calls/",
            ),
        )
    }

    fn check_missing_events(&self, func: &Function, file: &str) -> Option<Finding> {
        if !ASSIGNMENT_RE.is_match(&func.body) {
            return None;
        }

        let lower_name = func.name.to_lowercase();
        let is_important = EVENT_WORTHY_HINTS
            .iter()
            .any(|hint| lower_name.contains(hint));
        if !is_important {
            return None;
        }
        if EMIT_RE.is_match(&func.body) {
            return None;
        }

        Some(
            Finding::new(
                Severity::Low,
                "Missing Event Emission",
                format!(
                    "Function '{}' modifies state but does not emit an event. Events are \
                     important for off-chain monitoring and transparency.",
                    func.name
                ),
                file,
                func.line_start,
            )
            .with_function(&func.name)
            .with_recommendation(format!(
                "Add an event declaration and emit it in '{}':\n\
                 event Transfer(address indexed from, address indexed to, uint256 value);\n\
                 emit Transfer(msg.sender, recipient, amount);",
                func.name
            ))
            .with_reference(
                "https://consensys.github.io/smart-contract-best-practices/development-recommendations/general/events/",
            ),
        )
    }

    fn check_tx_origin(&self, context: &ScanContext) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (idx, line) in context.document.lines().iter().enumerate() {
            let Some(m) = TX_ORIGIN_RE.find(line) else {
                continue;
            };

            // A comment marker earlier on the line means this occurrence is
            // commented out.
            let before = &line[..m.start()];
            if before.contains("//") || before.contains("/*") {
                continue;
            }

            findings.push(
                Finding::new(
                    Severity::High,
                    "Use of tx.origin",
                    "tx.origin is used for authorization. This is vulnerable to phishing \
                     attacks. An attacker can trick a user into calling a malicious contract, \
                     which then calls your contract. tx.origin will be the user's address, not \
                     the attacker's.",
                    context.file,
                    idx + 1,
                )
                .with_snippet(line.trim())
                .with_recommendation(
                    "Use msg.sender instead of tx.origin:\n\
                     require(msg.sender == owner, \"Not authorized\");\n\
                     // NOT: require(tx.origin == owner, \"Not authorized\");",
                )
                .with_reference(
                    "Real-world examples:\n\
                     - Multiple phishing attacks exploiting tx.origin\n\
                     https://consensys.github.io/smart-contract-best-practices/development-recommendations/solidity-specific/tx-origin/",
                ),
            );
        }

        findings
    }
}

impl Detector for BadPatternsDetector {
    fn id(&self) -> &'static str {
        "bad-patterns"
    }

    fn name(&self) -> &'static str {
        "Bad Patterns Detector"
    }

    fn description(&self) -> &'static str {
        "Detects insecure randomness, unprotected admin functions, missing events, and tx.origin usage"
    }

    fn detect(&self, context: &ScanContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for contract in context.contracts {
            for func in &contract.functions {
                findings.extend(self.check_insecure_randomness(func, context.file));
                findings.extend(self.check_unprotected_admin(func, context.file));
                findings.extend(self.check_missing_events(func, context.file));
            }
        }

        findings.extend(self.check_tx_origin(context));

        Ok(findings)
    }
}

impl Default for BadPatternsDetector {
    fn default() -> Self {
        Self::new()
    }
}
