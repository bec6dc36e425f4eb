//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::ConversionJob;

/// A converter that delegates the bit transformation to an external tool.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;

    /// Converts `job.source` into `job.output`.
    async fn convert(&self, job: &ConversionJob) -> Result<(), ConverterError>;
}
