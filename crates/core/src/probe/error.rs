//! Error types for the probe module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while probing a media file.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// The prober rejected the file.
    #[error("Failed to probe {path}: {reason}")]
    ProbeFailed { path: PathBuf, reason: String },

    /// Failed to parse FFprobe output.
    #[error("Failed to parse probe output: {reason}")]
    ParseError { reason: String },

    /// Probe timed out.
    #[error("Probe timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while running the prober.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Creates a new probe failed error.
    pub fn probe_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
