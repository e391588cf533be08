use kansa_scanners::{
    Detector, Finding, ScanContext, Severity, SourceDocument, StructuralParser, ValidationDetector,
};

fn run_detector(source: &str) -> Vec<Finding> {
    let document = SourceDocument::new(source);
    let contracts = StructuralParser::new().parse(&document);
    let context = ScanContext::new(&contracts, &document, "test.sol");
    ValidationDetector::new().detect(&context).unwrap()
}

#[test]
fn test_missing_validation_flagged() {
    let source = r#"
pragma solidity ^0.8.0;

contract Test {
    uint256 value;

    function setValue(uint256 newValue) public {
        value = newValue;
    }
}
"#;

    let findings = run_detector(source);
    let missing: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.title == "Missing Input Validation")
        .collect();

    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].severity, Severity::Medium);
    assert_eq!(missing[0].function_name.as_deref(), Some("setValue"));
}

#[test]
fn test_require_satisfies_validation() {
    let source = r#"
pragma solidity ^0.8.0;

contract Test {
    uint256 value;

    function setValue(uint256 newValue) public {
        require(newValue > 0, "must be positive");
        value = newValue;
    }
}
"#;

    let findings = run_detector(source);

    assert!(!findings.iter().any(|f| f.title == "Missing Input Validation"));
}

#[test]
fn test_commented_out_require_does_not_count() {
    let source = r#"
pragma solidity ^0.8.0;

contract Test {
    uint256 value;

    function setValue(uint256 newValue) public {
        // require(newValue > 0);
        value = newValue;
    }
}
"#;

    let findings = run_detector(source);

    assert!(findings.iter().any(|f| f.title == "Missing Input Validation"));
}

#[test]
fn test_parameterless_function_not_flagged() {
    let source = r#"
pragma solidity ^0.8.0;

contract Test {
    uint256 counter;

    function bump() public {
        counter = counter + 1;
    }
}
"#;

    let findings = run_detector(source);

    assert!(!findings.iter().any(|f| f.title == "Missing Input Validation"));
}

#[test]
fn test_unsafe_arithmetic_pre_08() {
    let source = r#"
pragma solidity ^0.7.0;

contract Math {
    uint256 total;

    function accumulate(uint256 a, uint256 b) public {
        total = a + b;
    }
}
"#;

    let findings = run_detector(source);
    let overflow: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.title == "Potential Integer Overflow/Underflow: Addition")
        .collect();

    assert_eq!(overflow.len(), 1, "first unguarded occurrence only");
    assert_eq!(overflow[0].severity, Severity::Medium);
}

#[test]
fn test_arithmetic_skipped_on_08_pragma() {
    let source = r#"
pragma solidity ^0.8.0;

contract Math {
    uint256 total;

    function accumulate(uint256 a, uint256 b) public {
        total = a + b;
        total = total - b;
        total = a * b;
    }
}
"#;

    let findings = run_detector(source);

    assert!(
        !findings
            .iter()
            .any(|f| f.title.contains("Potential Integer Overflow/Underflow")),
        "0.8+ has built-in overflow protection"
    );
}

#[test]
fn test_arithmetic_runs_when_version_unparsable() {
    let source = r#"
pragma solidity something-strange;

contract Math {
    uint256 total;

    function accumulate(uint256 a, uint256 b) public {
        total = a + b;
    }
}
"#;

    let findings = run_detector(source);

    assert!(findings
        .iter()
        .any(|f| f.title.contains("Potential Integer Overflow/Underflow")));
}

#[test]
fn test_guarded_arithmetic_not_flagged() {
    let source = r#"
pragma solidity ^0.7.0;

contract Math {
    function check(uint256 a, uint256 b) public {
        require(a + b >= a, "overflow");
        stored = a;
    }
}
"#;

    let findings = run_detector(source);

    assert!(!findings
        .iter()
        .any(|f| f.title == "Potential Integer Overflow/Underflow: Addition"));
}

#[test]
fn test_hardcoded_address_reported_with_literal() {
    let source = r#"
pragma solidity ^0.8.0;

contract Config {
    address constant ADMIN = 0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0;
}
"#;

    let findings = run_detector(source);
    let hardcoded: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.title == "Hardcoded Address")
        .collect();

    assert_eq!(hardcoded.len(), 1);
    assert_eq!(hardcoded[0].severity, Severity::Low);
    assert!(hardcoded[0]
        .description
        .contains("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0"));
    assert_eq!(hardcoded[0].line, 5);
}

#[test]
fn test_commented_address_skipped() {
    let source = r#"
contract Config {
    // address old = 0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0;
    uint256 value;
}
"#;

    let findings = run_detector(source);

    assert!(!findings.iter().any(|f| f.title == "Hardcoded Address"));
}

#[test]
fn test_short_hex_literal_not_an_address() {
    let source = r#"
contract Config {
    uint256 constant MASK = 0xffff;
}
"#;

    let findings = run_detector(source);

    assert!(!findings.iter().any(|f| f.title == "Hardcoded Address"));
}
