pub mod classifier;
pub mod config;
pub mod converter;
pub mod formats;
pub mod pipeline;
pub mod planner;
pub mod probe;
mod process;
pub mod rewriter;
pub mod scanner;
pub mod testing;
pub mod writer;

pub use classifier::{classify, Classified, MediaFile};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, EncodingConfig,
    ScanConfig, ToolsConfig,
};
pub use converter::{ConversionJob, ConversionSpec, Converter, ConverterError};
pub use formats::{MediaKind, StreamInfo};
pub use pipeline::{
    ConversionOutcome, ExitStatus, FileError, FileErrorKind, Mode, Pipeline, PipelineError,
    RunReport, Toolchain,
};
pub use planner::{Collision, Plan, PlanEntry, Planner};
pub use probe::{FfprobeProber, MediaProber, ProbeError};
pub use scanner::{ScanError, ScanResult, Scanner};
pub use writer::{AtomicWriter, WriteOutcome};
