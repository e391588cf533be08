//! File discovery and size-capped reading for the scan commands.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

/// Upper bound on scannable source size. Oversized files are an I/O-layer
/// error, never the scanner's problem.
pub const MAX_SOURCE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SourceFileError {
    #[error("path is not a file: {0}")]
    NotAFile(PathBuf),

    #[error("file too large: {path} ({size} bytes, limit {limit})")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Collect `.sol` files under `path`. A single `.sol` file is returned as-is;
/// directories are walked recursively.
pub fn find_solidity_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if path.is_file() {
        if path.extension().is_some_and(|ext| ext == "sol") {
            files.push(path.to_path_buf());
        }
        return files;
    }

    if !path.is_dir() {
        warn!(path = %path.display(), "path is not a valid file or directory");
        return files;
    }

    for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        let entry_path = entry.path();
        if entry_path.is_file() && entry_path.extension().is_some_and(|ext| ext == "sol") {
            files.push(entry_path.to_path_buf());
        }
    }

    files
}

pub fn read_source_file(path: &Path) -> Result<String, SourceFileError> {
    let metadata = std::fs::metadata(path).map_err(|source| SourceFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_file() {
        return Err(SourceFileError::NotAFile(path.to_path_buf()));
    }

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(SourceFileError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: MAX_SOURCE_SIZE,
        });
    }

    std::fs::read_to_string(path).map_err(|source| SourceFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}
