//! Kansa Scanners - Lexical Vulnerability Detection
//!
//! This crate recovers a structural model of Solidity source text (contracts,
//! functions, state variables, modifiers) using brace-matching heuristics
//! rather than a grammar, then runs a fixed pipeline of independent
//! pattern-based detectors over that model to surface security findings.

pub mod analysis;
pub mod core;
pub mod detectors;
pub mod parser;
pub mod runner;

pub use crate::core::{Detector, Finding, ScanContext, Severity};

pub use crate::parser::{
    Contract, Function, SourceDocument, StateVariable, StructuralParser, Visibility,
};

pub use crate::detectors::{
    BadPatternsDetector, InsecureCallsDetector, ReentrancyDetector, ValidationDetector,
};

pub use crate::runner::{DetectorPipeline, ScanReport, SeverityCount};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
