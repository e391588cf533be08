//! Shared analysis helpers used by the detectors.

pub mod source_text;
pub mod version;

pub use source_text::{line_at_offset, strip_comments};
pub use version::{parse_solidity_version, SolidityVersion};
