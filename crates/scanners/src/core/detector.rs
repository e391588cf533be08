//! Detector trait and scan context.
//!
//! Each vulnerability class is an independent detector implementing a common
//! trait. Detectors share no state: every `detect` call reads the same parsed
//! model plus raw source and returns a freshly allocated finding list, so the
//! same detector value can serve any number of concurrent scans.

use crate::core::Finding;
use crate::parser::{Contract, SourceDocument};
use anyhow::Result;

/// Everything a detector may look at for one document: the structural model
/// recovered by the parser, the raw source it came from, and the identity the
/// findings should carry.
pub struct ScanContext<'a> {
    pub contracts: &'a [Contract],
    pub document: &'a SourceDocument,
    pub file: &'a str,
}

impl<'a> ScanContext<'a> {
    pub fn new(contracts: &'a [Contract], document: &'a SourceDocument, file: &'a str) -> Self {
        Self {
            contracts,
            document,
            file,
        }
    }
}

pub trait Detector: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "No description provided"
    }

    fn detect(&self, context: &ScanContext) -> Result<Vec<Finding>>;
}
