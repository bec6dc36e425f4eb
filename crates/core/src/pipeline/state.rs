//! Per-run accumulated state.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::rewriter::{ReferenceMap, RewriteReport};

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// Written to a new path; the original is gone (or left as a stale copy).
    Converted(PathBuf),
    /// Re-encoded under its own path.
    InPlaceReencoded,
    /// Nothing to do.
    AlreadyCanonical,
    /// The file could not be processed.
    Error(String),
}

/// Category of a per-file problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorKind {
    Unclassifiable,
    ProbeFailure,
    ConversionFailure,
    WriteFailure,
    DeleteFailure,
    ReferenceRewrite,
}

impl fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unclassifiable => "unclassifiable",
            Self::ProbeFailure => "probe failure",
            Self::ConversionFailure => "conversion failure",
            Self::WriteFailure => "write failure",
            Self::DeleteFailure => "delete failure",
            Self::ReferenceRewrite => "reference rewrite",
        };
        f.write_str(s)
    }
}

/// A non-fatal problem with one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub kind: FileErrorKind,
    pub message: String,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path.display(), self.kind, self.message)
    }
}

/// Everything a run accumulates, passed explicitly into each phase.
#[derive(Debug, Default)]
pub struct RunState {
    pub outcomes: Vec<(PathBuf, ConversionOutcome)>,
    /// Errors that make the run exit non-zero.
    pub errors: Vec<FileError>,
    /// Recoverable problems, such as an original that could not be deleted.
    pub warnings: Vec<FileError>,
    /// Realized renames, consumed by the rewriter.
    pub references: ReferenceMap,
    /// Outputs whose bytes changed on disk.
    pub changed_outputs: usize,
    /// HTML documents rewritten.
    pub rewritten_documents: Vec<PathBuf>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&mut self, path: &Path, outcome: ConversionOutcome) {
        self.outcomes.push((path.to_path_buf(), outcome));
    }

    /// Records a per-file error together with its `Error` outcome.
    pub fn record_error(&mut self, path: &Path, kind: FileErrorKind, message: impl Into<String>) {
        let message = message.into();
        self.record_outcome(path, ConversionOutcome::Error(message.clone()));
        self.errors.push(FileError {
            path: path.to_path_buf(),
            kind,
            message,
        });
    }

    pub fn record_warning(&mut self, path: &Path, kind: FileErrorKind, message: impl Into<String>) {
        self.warnings.push(FileError {
            path: path.to_path_buf(),
            kind,
            message: message.into(),
        });
    }

    /// Folds a rewrite pass into the run.
    pub fn absorb_rewrite(&mut self, report: RewriteReport) {
        self.changed_outputs += report.changed.len();
        self.rewritten_documents.extend(report.changed);
        for failure in report.failures {
            self.errors.push(FileError {
                path: failure.path,
                kind: FileErrorKind::ReferenceRewrite,
                message: failure.reason,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewriter::RewriteFailure;

    #[test]
    fn test_record_error_adds_outcome() {
        let mut state = RunState::new();
        state.record_error(
            Path::new("/s/x.mp4"),
            FileErrorKind::Unclassifiable,
            "no audio or video stream",
        );
        assert_eq!(state.errors.len(), 1);
        assert!(matches!(state.outcomes[0].1, ConversionOutcome::Error(_)));
        assert_eq!(
            state.errors[0].to_string(),
            "/s/x.mp4: unclassifiable (no audio or video stream)"
        );
    }

    #[test]
    fn test_absorb_rewrite() {
        let mut state = RunState::new();
        state.absorb_rewrite(RewriteReport {
            changed: vec![PathBuf::from("/s/index.html")],
            failures: vec![RewriteFailure {
                path: PathBuf::from("/s/bad.html"),
                reason: "cannot read: permission denied".to_string(),
            }],
        });
        assert_eq!(state.changed_outputs, 1);
        assert_eq!(state.rewritten_documents.len(), 1);
        assert_eq!(state.errors[0].kind, FileErrorKind::ReferenceRewrite);
        // Rewrite failures are not conversion outcomes.
        assert!(state.outcomes.is_empty());
    }
}
