//! Structural recovery of Solidity source without a grammar.
//!
//! The parser is deliberately lexical: contracts and functions are located by
//! signature-line regexes and their spans closed by a flat brace-depth
//! counter. That is enough to reason about call-before-write ordering,
//! modifier presence, and parameter/validation correlation, and the detectors
//! are calibrated against exactly this representation (character offsets
//! inside brace-matched regions). A brace inside a string or comment can
//! desynchronize the depth count; that is an accepted limitation of the
//! approach, not something to patch over with a real parser.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

static CONTRACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"contract\s+(\w+)\s*(?:is\s+[\w\s,]+)?\s*\{").expect("valid regex"));

static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"function\s+(\w+)\s*\([^)]*\)\s*(?:public|private|internal|external)?\s*(?:payable|view|pure)?\s*(?:returns\s*\([^)]*\))?\s*[^{]*\{",
    )
    .expect("valid regex")
});

static STATE_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\w+(?:\s*\[\s*\])?)\s+(\w+)\s*(?:public|private|internal)?\s*;")
        .expect("valid regex")
});

static MODIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"modifier\s+(\w+)\s*\([^)]*\)\s*\{").expect("valid regex"));

static SIGNATURE_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(public|private|internal|external|payable|view|pure|returns)\b")
        .expect("valid regex")
});

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-zA-Z_][a-zA-Z0-9_]*)\b").expect("valid regex"));

const MODIFIER_EXCLUDED_TOKENS: &[&str] = &[
    "function", "public", "private", "internal", "external", "payable", "view", "pure", "returns",
];

/// Raw source plus its line-indexed view. Line numbers are 1-based throughout.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    raw: String,
    lines: Vec<String>,
}

impl SourceDocument {
    pub fn new(source: impl Into<String>) -> Self {
        let raw = source.into();
        let lines = raw.split('\n').map(str::to_string).collect();
        Self { raw, lines }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 1-based line lookup.
    pub fn line(&self, number: usize) -> Option<&str> {
        if number == 0 {
            return None;
        }
        self.lines.get(number - 1).map(String::as_str)
    }

    /// Format a few lines of context around `line_number`, marking the target
    /// line with `>>>`.
    pub fn snippet(&self, line_number: usize, context: usize) -> String {
        let start = line_number.saturating_sub(context + 1);
        let end = (line_number + context).min(self.lines.len());

        let mut out = Vec::new();
        for idx in start..end {
            let marker = if idx + 1 == line_number { ">>> " } else { "    " };
            out.push(format!("{}{:4} | {}", marker, idx + 1, self.lines[idx]));
        }
        out.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    External,
    Internal,
    Private,
}

impl Visibility {
    pub fn is_externally_callable(&self) -> bool {
        matches!(self, Visibility::Public | Visibility::External)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::External => "external",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StateVariable {
    pub name: String,
    pub type_name: String,
    pub visibility: Visibility,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub name: String,
    pub visibility: Visibility,
    pub is_payable: bool,
    pub is_view: bool,
    pub is_pure: bool,
    /// Modifier names as written on the signature, left to right.
    pub modifiers: Vec<String>,
    pub line_start: usize,
    pub line_end: usize,
    /// Verbatim text from the signature line through the closing-brace line.
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Contract {
    pub name: String,
    pub line_start: usize,
    pub line_end: usize,
    pub functions: Vec<Function>,
    pub state_variables: Vec<StateVariable>,
    /// Names of modifiers declared by the contract.
    pub modifiers: Vec<String>,
}

/// Recovers the contract model from raw source. `parse` never fails: spans
/// that do not close before end of input are dropped and the scan continues.
pub struct StructuralParser;

impl StructuralParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, document: &SourceDocument) -> Vec<Contract> {
        let mut contracts = self.discover_contracts(document);

        for contract in &mut contracts {
            let functions = self.extract_functions(document, contract);
            let state_variables = self.extract_state_variables(document, contract);
            let modifiers = self.extract_modifiers(document, contract);
            contract.functions = functions;
            contract.state_variables = state_variables;
            contract.modifiers = modifiers;
        }

        contracts
    }

    fn discover_contracts(&self, document: &SourceDocument) -> Vec<Contract> {
        let lines = document.lines();
        let mut contracts = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let Some(caps) = CONTRACT_RE.captures(line) else {
                continue;
            };
            let name = caps[1].to_string();

            match close_brace_span(lines, idx) {
                Some(end_idx) => contracts.push(Contract {
                    name,
                    line_start: idx + 1,
                    line_end: end_idx + 1,
                    functions: Vec::new(),
                    state_variables: Vec::new(),
                    modifiers: Vec::new(),
                }),
                None => {
                    debug!(contract = %name, line = idx + 1, "unclosed contract span, skipping");
                }
            }
        }

        contracts
    }

    fn extract_functions(&self, document: &SourceDocument, contract: &Contract) -> Vec<Function> {
        let contract_lines = contract_slice(document, contract);
        let mut functions = Vec::new();

        for (offset, line) in contract_lines.iter().enumerate() {
            let Some(caps) = FUNCTION_RE.captures(line) else {
                continue;
            };
            let name = caps[1].to_string();

            // Pre-0.8 constructors are functions named after their contract;
            // neither form belongs in the model.
            if name == contract.name || name == "constructor" {
                continue;
            }

            let (visibility, is_payable, is_view, is_pure) = signature_properties(line);
            let modifiers = signature_modifiers(line);

            let Some(end_offset) = close_brace_span(contract_lines, offset) else {
                debug!(function = %name, "unclosed function body, dropping");
                continue;
            };

            let body = contract_lines[offset..=end_offset].join("\n");

            functions.push(Function {
                name,
                visibility,
                is_payable,
                is_view,
                is_pure,
                modifiers,
                line_start: contract.line_start + offset,
                line_end: contract.line_start + end_offset,
                body,
            });
        }

        functions
    }

    fn extract_state_variables(
        &self,
        document: &SourceDocument,
        contract: &Contract,
    ) -> Vec<StateVariable> {
        let contract_lines = contract_slice(document, contract);
        let mut variables = Vec::new();

        for (offset, line) in contract_lines.iter().enumerate() {
            // Lines carrying a signature would misclassify parameters.
            if line.contains("function") {
                continue;
            }

            let Some(caps) = STATE_VAR_RE.captures(line) else {
                continue;
            };

            let visibility = if line.contains("public") {
                Visibility::Public
            } else if line.contains("private") {
                Visibility::Private
            } else {
                Visibility::Internal
            };

            variables.push(StateVariable {
                name: caps[2].trim().to_string(),
                type_name: caps[1].trim().to_string(),
                visibility,
                line: contract.line_start + offset,
            });
        }

        variables
    }

    fn extract_modifiers(&self, document: &SourceDocument, contract: &Contract) -> Vec<String> {
        let contract_text = contract_slice(document, contract).join("\n");

        MODIFIER_RE
            .captures_iter(&contract_text)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

impl Default for StructuralParser {
    fn default() -> Self {
        Self::new()
    }
}

fn contract_slice<'a>(document: &'a SourceDocument, contract: &Contract) -> &'a [String] {
    let lines = document.lines();
    let start = contract.line_start.saturating_sub(1).min(lines.len());
    let end = contract.line_end.min(lines.len());
    &lines[start..end]
}

/// Flat brace-depth scan over whole lines starting at `start` (0-based).
/// Returns the 0-based index of the line on which depth first returns to zero
/// after having opened, or None if the span never closes.
fn close_brace_span(lines: &[String], start: usize) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut opened = false;

    for (offset, line) in lines.get(start..)?.iter().enumerate() {
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => {
                    depth -= 1;
                    if opened && depth == 0 {
                        return Some(start + offset);
                    }
                }
                _ => {}
            }
        }
    }

    None
}

fn signature_properties(line: &str) -> (Visibility, bool, bool, bool) {
    let is_payable = line.contains("payable");
    let is_view = line.contains("view");
    let is_pure = line.contains("pure");

    let mut visibility = Visibility::Public;
    for (keyword, value) in [
        ("public", Visibility::Public),
        ("private", Visibility::Private),
        ("internal", Visibility::Internal),
        ("external", Visibility::External),
    ] {
        if line.contains(keyword) {
            visibility = value;
            break;
        }
    }

    (visibility, is_payable, is_view, is_pure)
}

/// Modifier names are whatever identifier tokens remain between the parameter
/// list's closing paren and the opening brace once the declaration keywords
/// are stripped.
fn signature_modifiers(line: &str) -> Vec<String> {
    let Some(paren_end) = line.find(')') else {
        return Vec::new();
    };
    if paren_end == 0 {
        return Vec::new();
    }

    let after_signature = &line[paren_end + 1..];
    let stripped = SIGNATURE_KEYWORD_RE.replace_all(after_signature, "");
    let before_brace = stripped.split('{').next().unwrap_or("");

    IDENT_RE
        .captures_iter(before_brace)
        .map(|caps| caps[1].to_string())
        .filter(|token| !MODIFIER_EXCLUDED_TOKENS.contains(&token.as_str()))
        .collect()
}
