//! Colored terminal rendering of a scan report.

use colored::{ColoredString, Colorize};
use kansa_scanners::{Finding, ScanReport, Severity};

pub fn severity_colored(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRITICAL".red().bold(),
        Severity::High => "HIGH".magenta(),
        Severity::Medium => "MEDIUM".yellow(),
        Severity::Low => "LOW".blue(),
        Severity::Info => "INFO".green(),
    }
}

/// Print findings grouped by severity (most severe first) followed by a
/// summary, mirroring the file reports' grouping.
pub fn print_report(report: &ScanReport, critical_only: bool) {
    let visible: Vec<&Finding> = report
        .findings()
        .iter()
        .filter(|f| !critical_only || f.severity.is_blocking())
        .collect();

    if visible.is_empty() {
        println!("{}", "No vulnerabilities found!".green());
        return;
    }

    println!("\n{}", format!("Scanning: {}", report.file()).bold());
    println!("{}", "=".repeat(80));

    for severity in Severity::ORDERED {
        let group: Vec<&&Finding> = visible.iter().filter(|f| f.severity == severity).collect();
        if group.is_empty() {
            continue;
        }

        println!("\n{}", severity_colored(severity));
        println!("{}", "-".repeat(80));

        for finding in group {
            println!("\n[{}] {}", severity_colored(finding.severity), finding.title.bold());
            println!("  File: {}:{}", finding.file, finding.line);
            if let Some(ref function) = finding.function_name {
                println!("  Function: {}", function);
            }
            println!("  Description: {}", finding.description);
            if let Some(ref snippet) = finding.code_snippet {
                println!("\n  Code:\n{}", snippet);
            }
            if let Some(ref recommendation) = finding.recommendation {
                println!("\n  Recommendation:\n  {}", recommendation);
            }
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("\n{}", "Summary:".bold());
    print_summary(&visible);
}

fn print_summary(findings: &[&Finding]) {
    for severity in Severity::ORDERED {
        let count = findings.iter().filter(|f| f.severity == severity).count();
        if count > 0 {
            println!("  {}: {}", severity_colored(severity), count);
        }
    }
    println!("\n  Total findings: {}", findings.len());
}

pub fn print_score(report: &ScanReport) {
    println!(
        "\nSecurity Score for {}: {}/100",
        report.file(),
        report.security_score()
    );
    println!("Total Findings: {}", report.findings().len());

    if !report.is_empty() {
        println!("\nBreakdown:");
        let count = report.count_by_severity();
        for severity in Severity::ORDERED {
            let n = count.get(severity);
            if n > 0 {
                println!("  {}: {}", severity_colored(severity), n);
            }
        }
    }
}
