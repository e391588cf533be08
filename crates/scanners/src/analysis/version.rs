//! Solidity version extraction for version-gated checks.
//!
//! Only the major/minor pair matters here: 0.8 is the boundary for built-in
//! overflow protection. Constraint operators (`^`, `~`, `>=`, ...) are
//! stripped rather than interpreted; the declared base version is taken as
//! the version in effect.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidityVersion {
    pub major: u32,
    pub minor: u32,
}

impl SolidityVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn has_builtin_overflow_protection(&self) -> bool {
        self.major > 0 || (self.major == 0 && self.minor >= 8)
    }
}

/// Pulls the version out of the first `pragma solidity ...;` declaration.
/// Returns None when no pragma is present or its version does not parse;
/// callers treat that as "assume pre-0.8".
pub fn parse_solidity_version(source: &str) -> Option<SolidityVersion> {
    let pragma_start = source.find("pragma solidity")?;
    let pragma_section = &source[pragma_start..];

    let pragma_end = pragma_section.find(';')?;
    let constraint = pragma_section[..pragma_end]
        .trim_start_matches("pragma solidity")
        .trim();

    let cleaned = constraint
        .trim_start_matches('^')
        .trim_start_matches('~')
        .trim_start_matches(">=")
        .trim_start_matches("<=")
        .trim_start_matches('>')
        .trim_start_matches('<')
        .trim();

    let version_part = cleaned.split_whitespace().next()?;
    let mut parts = version_part.split('.');

    let major = parts.next()?.parse::<u32>().ok()?;
    let minor = parts.next().and_then(|s| s.parse::<u32>().ok()).unwrap_or(0);

    Some(SolidityVersion::new(major, minor))
}
