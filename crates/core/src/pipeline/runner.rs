//! Phase-by-phase pipeline execution.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::report::RunReport;
use super::state::{ConversionOutcome, FileErrorKind, RunState};
use super::toolchain::Toolchain;
use crate::classifier::{classify, Classified, MediaFile};
use crate::config::Config;
use crate::converter::ConversionJob;
use crate::formats::MediaKind;
use crate::planner::{Plan, PlanEntry, Planner};
use crate::rewriter::{differs_ignoring_case, ReferenceRewriter};
use crate::scanner::{ScanError, ScanResult, Scanner};
use crate::writer::AtomicWriter;

/// Whether a run may touch the filesystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Convert, replace and rewrite.
    #[default]
    Apply,
    /// Report pending work only.
    Check,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply => write!(f, "apply"),
            Self::Check => write!(f, "check"),
        }
    }
}

/// Errors that abort a run before any file is touched.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Root directory not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("{tool} is required for {category} files but is unavailable: {reason}")]
    ToolMissing {
        tool: String,
        category: String,
        reason: String,
    },
}

impl From<ScanError> for PipelineError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::RootNotFound { path } => Self::RootNotFound { path },
        }
    }
}

/// Runs scan, classify, plan, convert and rewrite over one root.
pub struct Pipeline {
    config: Config,
    tools: Toolchain,
    writer: AtomicWriter,
}

impl Pipeline {
    pub fn new(config: Config, tools: Toolchain) -> Self {
        Self {
            config,
            tools,
            writer: AtomicWriter::new(),
        }
    }

    /// Executes one run. Fatal problems return `Err`; everything else,
    /// including collisions, ends up in the report.
    pub async fn run(&self, root: &Path, mode: Mode) -> Result<RunReport, PipelineError> {
        info!("Scanning {:?} ({} mode)", root, mode);
        let scan = Scanner::new()
            .with_extra_skip_dirs(self.config.scan.extra_skip_dirs.iter().cloned())
            .scan(root)?;
        info!(
            "Found {} image(s), {} audio/video file(s), {} HTML document(s)",
            scan.images.len(),
            scan.media.len(),
            scan.html.len()
        );

        if !scan.media.is_empty() {
            self.tools
                .prober
                .validate()
                .await
                .map_err(|e| PipelineError::ToolMissing {
                    tool: self.tools.prober.name().to_string(),
                    category: "audio/video".to_string(),
                    reason: e.to_string(),
                })?;
        }

        let mut state = RunState::new();
        let classified = self.classify_all(&scan, &mut state).await;
        let plan = self.build_plan(&scan, classified, &mut state).await;

        let collisions = plan.collisions();
        for collision in &collisions {
            error!(
                "Target collision: {:?} would be produced by {:?}",
                collision.target, collision.sources
            );
        }

        if mode == Mode::Check {
            for entry in plan.entries() {
                info!("Would convert {:?} -> {:?}", entry.source, entry.target);
            }
            return Ok(RunReport::new(mode, plan.entries().to_vec(), collisions, state));
        }

        if !collisions.is_empty() {
            return Ok(RunReport::new(mode, plan.entries().to_vec(), collisions, state));
        }

        self.preflight_converters(&plan).await?;

        for entry in plan.entries() {
            self.convert_entry(entry, &mut state).await;
        }

        let rewrite = ReferenceRewriter::new(&self.writer)
            .rewrite_all(&scan.html, &state.references)
            .await;
        state.absorb_rewrite(rewrite);

        Ok(RunReport::new(mode, plan.entries().to_vec(), collisions, state))
    }

    async fn classify_all(&self, scan: &ScanResult, state: &mut RunState) -> Vec<Classified> {
        let mut classified = Vec::with_capacity(scan.media.len());
        for path in &scan.media {
            match classify(self.tools.prober.as_ref(), path).await {
                Ok(c) if c.is_unclassifiable() => {
                    error!("Cannot classify {:?}: no audio or video stream", path);
                    state.record_error(
                        path,
                        FileErrorKind::Unclassifiable,
                        "no audio or video stream",
                    );
                }
                Ok(c) => classified.push(c),
                Err(e) => {
                    error!("Probing {:?} failed: {}", path, e);
                    state.record_error(path, FileErrorKind::ProbeFailure, e.to_string());
                }
            }
        }
        classified
    }

    async fn build_plan(
        &self,
        scan: &ScanResult,
        classified: Vec<Classified>,
        state: &mut RunState,
    ) -> Plan {
        let planner = Planner::new(self.tools.prober.as_ref());
        let mut plan = Plan::new();

        for path in &scan.images {
            match planner.plan_image(&MediaFile::image(path.as_path())) {
                Some(entry) => plan.insert(entry),
                None => state.record_outcome(path, ConversionOutcome::AlreadyCanonical),
            }
        }

        for c in classified {
            let path = c.file.path.clone();
            match planner.plan_media(c).await {
                Ok(Some(entry)) => plan.insert(entry),
                Ok(None) => state.record_outcome(&path, ConversionOutcome::AlreadyCanonical),
                Err(e) => {
                    error!("Reading codecs of {:?} failed: {}", path, e);
                    state.record_error(&path, FileErrorKind::ProbeFailure, e.to_string());
                }
            }
        }

        debug!("Plan has {} entr(ies)", plan.len());
        plan
    }

    /// Checks only the converters that have work to do.
    async fn preflight_converters(&self, plan: &Plan) -> Result<(), PipelineError> {
        let kinds: BTreeSet<MediaKind> = plan.entries().iter().map(|e| e.kind).collect();
        let mut checked = BTreeSet::new();

        for kind in kinds {
            let converter = self.tools.converter_for(kind);
            if !checked.insert(converter.name().to_string()) {
                continue;
            }
            converter
                .validate()
                .await
                .map_err(|e| PipelineError::ToolMissing {
                    tool: converter.name().to_string(),
                    category: kind.category().to_string(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    async fn convert_entry(&self, entry: &PlanEntry, state: &mut RunState) {
        info!("Converting {:?} -> {:?}", entry.source, entry.target);

        let staged = match self.writer.stage(&entry.target) {
            Ok(staged) => staged.inherit_permissions_from(&entry.source),
            Err(e) => {
                error!("Cannot stage output for {:?}: {}", entry.source, e);
                state.record_error(&entry.source, FileErrorKind::WriteFailure, e.to_string());
                return;
            }
        };

        let job = ConversionJob {
            source: entry.source.clone(),
            output: staged.path().to_path_buf(),
            spec: entry.conversion_spec(&self.config.encoding),
        };
        let converter = self.tools.converter_for(entry.kind);
        if let Err(e) = converter.convert(&job).await {
            error!("Converting {:?} failed: {}", entry.source, e.detail());
            state.record_error(&entry.source, FileErrorKind::ConversionFailure, e.detail());
            return;
        }

        match self.writer.commit(staged).await {
            Ok(outcome) if outcome.is_changed() => state.changed_outputs += 1,
            Ok(_) => debug!("{:?} already held identical bytes", entry.target),
            Err(e) => {
                error!("Writing {:?} failed: {}", entry.target, e);
                state.record_error(&entry.source, FileErrorKind::WriteFailure, e.to_string());
                return;
            }
        }

        if !differs_ignoring_case(&entry.source, &entry.target) {
            state.record_outcome(&entry.source, ConversionOutcome::InPlaceReencoded);
            return;
        }

        if let Err(e) = self.writer.remove_original(&entry.source).await {
            warn!("Could not delete original {:?}: {}", entry.source, e);
            state.record_warning(&entry.source, FileErrorKind::DeleteFailure, e.to_string());
        }
        state.references.insert(&entry.source, &entry.target);
        state.record_outcome(
            &entry.source,
            ConversionOutcome::Converted(entry.target.clone()),
        );
    }
}
