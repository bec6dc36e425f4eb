//! Converter module for producing canonical media files.
//!
//! Each converter wraps one external tool contract:
//!
//! - [`MagickConverter`]: rasterizes any supported image to PNG, keeping only
//!   the first frame of animated or multi-page inputs
//! - [`FfmpegConverter`]: re-encodes audio to Vorbis/Ogg and video to
//!   Theora/Vorbis/Ogg (audio-less when the source has no soundtrack)
//!
//! Converters never touch the final target. They write into the staging path
//! they are given; committing is the writer's job.
//!
//! # Example
//!
//! ```ignore
//! use mediacanon_core::converter::{ConversionJob, ConversionSpec, Converter, FfmpegConverter};
//!
//! let converter = FfmpegConverter::with_defaults();
//! converter.validate().await?;
//!
//! let job = ConversionJob {
//!     source: PathBuf::from("/site/media/song.mp3"),
//!     output: PathBuf::from("/site/media/.mediacanon-x1y2.ogg"),
//!     spec: ConversionSpec::Audio { quality: 5 },
//! };
//! converter.convert(&job).await?;
//! ```

mod error;
mod ffmpeg;
mod magick;
mod traits;
mod types;

pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use magick::MagickConverter;
pub use traits::Converter;
pub use types::{ConversionJob, ConversionSpec};
