//! Probe module for inspecting the streams inside media files.
//!
//! A container extension does not say what a file really holds, so the
//! pipeline asks a [`MediaProber`] instead. The shipped implementation shells
//! out to ffprobe; tests use [`crate::testing::MockProber`].

mod error;
mod ffprobe;
mod traits;

pub use error::ProbeError;
pub use ffprobe::FfprobeProber;
pub use traits::MediaProber;
