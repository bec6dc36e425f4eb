//! Scanner module for bucketing a website tree into conversion candidates.
//!
//! The scanner walks a root directory, prunes well-known noise directories
//! (version control, dependency and build/cache folders) and sorts every
//! remaining file into image candidates, audio/video candidates or HTML
//! documents. Anything else is ignored.

mod error;
mod walker;

pub use error::ScanError;
pub use walker::{Scanner, ScanResult, DEFAULT_SKIP_DIRS, STAGING_PREFIX};
