//! Writer module for committing files without half-written targets.
//!
//! Output is produced into a sibling staging file in the target's directory,
//! so the final step is always a same-filesystem rename.
//!
//! # Features
//!
//! - Staging files are removed on every exit path (drop guard)
//! - Byte-identical results leave the target untouched
//! - Rename onto an existing target, with one delete-and-retry fallback
//! - Permissions inherited from the replaced file or the conversion source
//!
//! # Example
//!
//! ```ignore
//! use mediacanon_core::writer::{AtomicWriter, WriteOutcome};
//!
//! let writer = AtomicWriter::new();
//! let staged = writer.stage(Path::new("/site/img/logo.png"))?;
//! // ... let a converter fill staged.path() ...
//! match writer.commit(staged).await? {
//!     WriteOutcome::Changed => println!("updated"),
//!     WriteOutcome::Unchanged => println!("already up to date"),
//! }
//! ```

mod atomic;
mod error;

pub use atomic::{AtomicWriter, StagedFile, WriteOutcome};
pub use error::WriteError;
