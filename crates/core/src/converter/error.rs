//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Tool binary not found.
    #[error("{tool} not found at path: {path}")]
    ToolNotFound { tool: String, path: PathBuf },

    /// Conversion process failed.
    #[error("Conversion failed: {reason}")]
    ConversionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Conversion timed out.
    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The job asks for something this converter does not produce.
    #[error("{converter} cannot handle {spec} jobs")]
    UnsupportedSpec { converter: String, spec: String },

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a new conversion failed error with stderr output.
    pub fn conversion_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Human readable detail including the tool's stderr, if captured.
    pub fn detail(&self) -> String {
        match self {
            Self::ConversionFailed {
                reason,
                stderr: Some(stderr),
            } => format!("{}: {}", reason, stderr.replace('\n', " | ")),
            other => other.to_string(),
        }
    }

    /// Whether this error means the tool itself is unavailable.
    pub fn is_tool_missing(&self) -> bool {
        matches!(self, Self::ToolNotFound { .. })
    }
}
