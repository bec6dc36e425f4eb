//! Testing utilities and mock implementations of the external tool traits.
//!
//! The mocks let the whole pipeline run in tests without ffmpeg, ffprobe or
//! ImageMagick installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use mediacanon_core::testing::{MockConverter, MockProber};
//!
//! let prober = MockProber::new();
//! let converter = MockConverter::new();
//! let toolchain = Toolchain::new(prober.clone(), converter.clone(), converter.clone());
//! ```

mod mock_converter;
mod mock_prober;

pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_prober::{MockProber, ProbeScript};
