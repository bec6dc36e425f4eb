//! Error types for the scanner module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The root is missing or is not a directory.
    #[error("Root directory not found: {path}")]
    RootNotFound { path: PathBuf },
}
