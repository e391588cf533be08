use kansa_scanners::{
    Detector, Finding, InsecureCallsDetector, ScanContext, Severity, SourceDocument,
    StructuralParser,
};

fn run_detector(source: &str) -> Vec<Finding> {
    let document = SourceDocument::new(source);
    let contracts = StructuralParser::new().parse(&document);
    let context = ScanContext::new(&contracts, &document, "test.sol");
    InsecureCallsDetector::new().detect(&context).unwrap()
}

#[test]
fn test_delegatecall_with_user_input_is_critical() {
    let source = r#"
contract Proxy {
    function execute(address target) public {
        target.delegatecall(msg.data);
    }
}
"#;

    let findings = run_detector(source);
    let delegatecall: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.title == "Unsafe delegatecall Usage")
        .collect();

    assert_eq!(delegatecall.len(), 1, "one finding per function");
    assert_eq!(delegatecall[0].severity, Severity::Critical);
    assert_eq!(delegatecall[0].function_name.as_deref(), Some("execute"));
}

#[test]
fn test_delegatecall_without_user_input_is_high() {
    let source = r#"
contract Proxy {
    function upgrade() internal {
        implementation.delegatecall(abi.encodeWithSignature("init()"));
    }
}
"#;

    let findings = run_detector(source);
    let delegatecall: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.title == "Unsafe delegatecall Usage")
        .collect();

    assert_eq!(delegatecall.len(), 1);
    assert_eq!(delegatecall[0].severity, Severity::High);
}

#[test]
fn test_unchecked_return_value_flagged() {
    let source = r#"
contract Test {
    function ping(address target) public {
        target.call("");
    }
}
"#;

    let findings = run_detector(source);
    let unchecked: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.title == "Unchecked Return Value from External Call")
        .collect();

    assert_eq!(unchecked.len(), 1);
    assert_eq!(unchecked[0].severity, Severity::Medium);
    assert_eq!(unchecked[0].line, 4);
}

#[test]
fn test_require_after_call_suppresses_finding() {
    let source = r#"
contract Test {
    function ping(address target) public {
        (bool success, ) = target.call("");
        require(success, "call failed");
    }
}
"#;

    let findings = run_detector(source);

    assert!(!findings
        .iter()
        .any(|f| f.title == "Unchecked Return Value from External Call"));
}

#[test]
fn test_unchecked_send_flagged() {
    let source = r#"
contract Test {
    function pay(address payable target) public {
        target.send(100);
    }
}
"#;

    let findings = run_detector(source);

    assert!(findings
        .iter()
        .any(|f| f.title == "Unchecked Return Value from External Call"));
}

#[test]
fn test_no_findings_on_plain_contract() {
    let source = r#"
contract Test {
    function noop() public {
        counter = counter + 1;
    }
}
"#;

    let findings = run_detector(source);

    assert!(findings.is_empty());
}
