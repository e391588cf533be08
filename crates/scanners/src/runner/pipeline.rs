use crate::core::{Detector, ScanContext};
use crate::detectors::{
    BadPatternsDetector, InsecureCallsDetector, ReentrancyDetector, ValidationDetector,
};
use crate::parser::{Contract, SourceDocument, StructuralParser};
use crate::runner::ScanReport;
use tracing::warn;

/// Runs the detectors in a fixed order and concatenates their findings.
///
/// The order (reentrancy, validation, bad-patterns, insecure-calls) is part of
/// the output contract: findings are emitted by detector run order, then by
/// discovery order within a detector, so snapshot-style consumers see a
/// deterministic sequence. No severity sorting happens here.
pub struct DetectorPipeline {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorPipeline {
    /// The standard four-detector pipeline.
    pub fn standard() -> Self {
        Self {
            detectors: vec![
                Box::new(ReentrancyDetector::new()),
                Box::new(ValidationDetector::new()),
                Box::new(BadPatternsDetector::new()),
                Box::new(InsecureCallsDetector::new()),
            ],
        }
    }

    pub fn detector_ids(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.id()).collect()
    }

    /// Run every detector over an already-parsed model.
    pub fn run(&self, contracts: &[Contract], document: &SourceDocument, file: &str) -> ScanReport {
        let context = ScanContext::new(contracts, document, file);
        let mut findings = Vec::new();

        for detector in &self.detectors {
            match detector.detect(&context) {
                Ok(detector_findings) => findings.extend(detector_findings),
                Err(e) => warn!(detector = detector.id(), error = %e, "detector failed, skipping"),
            }
        }

        ScanReport::new(file, findings)
    }

    /// Parse raw source and run the pipeline over it. The core boundary:
    /// `(source_text, file_identity)` in, ordered findings out.
    pub fn scan_source(&self, source: &str, file: &str) -> ScanReport {
        let document = SourceDocument::new(source);
        let contracts = StructuralParser::new().parse(&document);
        self.run(&contracts, &document, file)
    }
}

impl Default for DetectorPipeline {
    fn default() -> Self {
        Self::standard()
    }
}
