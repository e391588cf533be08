use crate::source_io::{find_solidity_files, read_source_file};
use crate::terminal;
use anyhow::Result;
use clap::{Args, ValueEnum};
use kansa_scanners::{DetectorPipeline, ScanReport};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Args)]
pub struct ScanArgs {
    /// Path to a Solidity file or directory
    pub path: PathBuf,

    /// Output format (default: terminal output plus all file formats)
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Only show CRITICAL and HIGH severity findings
    #[arg(long)]
    pub critical_only: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum ReportFormat {
    Json,
    Csv,
    Markdown,
}

impl ScanArgs {
    /// Scan every discovered file; returns the process exit code (1 when any
    /// file is unreadable or carries CRITICAL/HIGH findings).
    pub fn execute(&self) -> Result<i32> {
        let files = find_solidity_files(&self.path);

        if files.is_empty() {
            error!(path = %self.path.display(), "no Solidity files found");
            return Ok(1);
        }

        let pipeline = DetectorPipeline::standard();
        let mut exit_code = 0;

        for file in files {
            info!(file = %file.display(), "scanning");
            match self.scan_file(&pipeline, &file) {
                Ok(code) if code != 0 => exit_code = code,
                Ok(_) => {}
                Err(e) => {
                    error!(file = %file.display(), error = %e, "scan failed");
                    exit_code = 1;
                }
            }
        }

        Ok(exit_code)
    }

    fn scan_file(&self, pipeline: &DetectorPipeline, path: &Path) -> Result<i32> {
        let source = read_source_file(path)?;
        let report = pipeline.scan_source(&source, &path.to_string_lossy());

        if self.format.is_none() {
            terminal::print_report(&report, self.critical_only);
        }

        write_report_files(&report, path, self.format)?;

        Ok(if report.has_blocking_findings() { 1 } else { 0 })
    }
}

fn write_report_files(
    report: &ScanReport,
    source_path: &Path,
    format: Option<ReportFormat>,
) -> Result<()> {
    let stem = source_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());

    let wants = |f: ReportFormat| format.is_none() || format == Some(f);

    if wants(ReportFormat::Json) {
        let out = format!("{}_report.json", stem);
        std::fs::write(&out, report.to_json()?)?;
        info!(path = %out, "JSON report saved");
    }

    if wants(ReportFormat::Csv) {
        let out = format!("{}_findings.csv", stem);
        std::fs::write(&out, report.to_csv())?;
        info!(path = %out, "CSV report saved");
    }

    if wants(ReportFormat::Markdown) {
        let out = format!("{}_security_audit.md", stem);
        std::fs::write(&out, report.to_markdown())?;
        info!(path = %out, "Markdown report saved");
    }

    Ok(())
}
