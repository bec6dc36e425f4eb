//! End-of-run summary and exit status.

use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

use super::runner::Mode;
use super::state::{ConversionOutcome, FileError, RunState};
use crate::planner::{Collision, PlanEntry};

/// Maximum number of errors listed individually in the summary.
pub const SUMMARY_ERROR_LIMIT: usize = 20;

/// Process exit status derived from a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    /// Nothing to do, or everything succeeded.
    Success,
    /// Fatal pre-flight problem or an apply-mode collision.
    Fatal,
    /// Pending work in check mode, or per-file errors.
    WorkOrErrors,
}

impl ExitStatus {
    pub fn code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Fatal => 1,
            Self::WorkOrErrors => 2,
        }
    }
}

/// What a run did, or in check mode would do.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    pub pending: Vec<PlanEntry>,
    pub collisions: Vec<Collision>,
    pub outcomes: Vec<(PathBuf, ConversionOutcome)>,
    pub errors: Vec<FileError>,
    pub warnings: Vec<FileError>,
    pub changed_outputs: usize,
    pub rewritten_documents: Vec<PathBuf>,
}

impl RunReport {
    pub(crate) fn new(mode: Mode, pending: Vec<PlanEntry>, collisions: Vec<Collision>, state: RunState) -> Self {
        Self {
            mode,
            pending,
            collisions,
            outcomes: state.outcomes,
            errors: state.errors,
            warnings: state.warnings,
            changed_outputs: state.changed_outputs,
            rewritten_documents: state.rewritten_documents,
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        match self.mode {
            Mode::Apply if !self.collisions.is_empty() => ExitStatus::Fatal,
            Mode::Apply if !self.errors.is_empty() => ExitStatus::WorkOrErrors,
            Mode::Apply => ExitStatus::Success,
            Mode::Check
                if !self.pending.is_empty()
                    || !self.collisions.is_empty()
                    || !self.errors.is_empty() =>
            {
                ExitStatus::WorkOrErrors
            }
            Mode::Check => ExitStatus::Success,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_status().code()
    }

    /// Number of sources that ended with the given outcome shape.
    pub fn count(&self, predicate: impl Fn(&ConversionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }

    /// Error lines for the summary, capped at [`SUMMARY_ERROR_LIMIT`].
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .errors
            .iter()
            .take(SUMMARY_ERROR_LIMIT)
            .map(|e| e.to_string())
            .collect();
        if self.errors.len() > SUMMARY_ERROR_LIMIT {
            lines.push(format!(
                "... and {} more",
                self.errors.len() - SUMMARY_ERROR_LIMIT
            ));
        }
        lines
    }

    /// Logs the final summary.
    pub fn log_summary(&self) {
        for line in self.summary_lines() {
            error!("{}", line);
        }
        for warning in &self.warnings {
            warn!("{}", warning);
        }

        match self.mode {
            Mode::Check => {
                info!(
                    "{} file(s) need conversion, {} collision(s), {} error(s)",
                    self.pending.len(),
                    self.collisions.len(),
                    self.errors.len()
                );
            }
            Mode::Apply if !self.collisions.is_empty() => {
                error!(
                    "Refused to convert anything: {} target collision(s)",
                    self.collisions.len()
                );
            }
            Mode::Apply => {
                let converted = self.count(|o| {
                    matches!(
                        o,
                        ConversionOutcome::Converted(_) | ConversionOutcome::InPlaceReencoded
                    )
                });
                info!(
                    "{} output(s) changed, {} converted, {} already canonical, {} document(s) rewritten, {} error(s)",
                    self.changed_outputs,
                    converted,
                    self.count(|o| matches!(o, ConversionOutcome::AlreadyCanonical)),
                    self.rewritten_documents.len(),
                    self.errors.len()
                );
            }
        }
    }
}
