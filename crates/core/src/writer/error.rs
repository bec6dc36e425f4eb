//! Error types for the writer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while committing a file.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Target has no parent directory to stage into.
    #[error("No parent directory for target: {path}")]
    NoParentDirectory { path: PathBuf },

    /// Failed to create the staging file.
    #[error("Failed to create staging file for {target}")]
    StagingFailed {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write staged content.
    #[error("Failed to write staged content for {target}")]
    WriteFailed {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move the staged file onto the target.
    #[error("Failed to replace {target}")]
    PersistFailed {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to calculate checksum.
    #[error("Failed to calculate checksum for {path}")]
    ChecksumCalculationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to delete the superseded original.
    #[error("Failed to remove original file: {path}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
