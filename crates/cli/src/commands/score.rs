use crate::source_io::read_source_file;
use crate::terminal;
use anyhow::Result;
use clap::Args;
use kansa_scanners::DetectorPipeline;
use std::path::PathBuf;
use tracing::{error, warn};

#[derive(Args)]
pub struct ScoreArgs {
    /// Path to a Solidity file
    pub path: PathBuf,
}

impl ScoreArgs {
    pub fn execute(&self) -> Result<i32> {
        let source = match read_source_file(&self.path) {
            Ok(source) => source,
            Err(e) => {
                error!(file = %self.path.display(), error = %e, "failed to read file");
                return Ok(1);
            }
        };

        let report = DetectorPipeline::standard().scan_source(&source, &self.path.to_string_lossy());

        if report.is_empty() {
            warn!(file = %self.path.display(), "no findings; source may contain no contracts");
        }

        terminal::print_score(&report);

        Ok(0)
    }
}
