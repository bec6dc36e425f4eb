//! Pipeline module: the mode controller tying every phase together.
//!
//! `Scan → Classify → Plan → {collision gate} → Convert each → Rewrite
//! references → Summarize`. In check mode the run stops after planning and
//! only reports what would happen.

mod report;
mod runner;
mod state;
mod toolchain;

pub use report::{ExitStatus, RunReport, SUMMARY_ERROR_LIMIT};
pub use runner::{Mode, Pipeline, PipelineError};
pub use state::{ConversionOutcome, FileError, FileErrorKind, RunState};
pub use toolchain::Toolchain;
