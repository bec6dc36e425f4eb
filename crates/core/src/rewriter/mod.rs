//! Rewriter module for keeping HTML links valid after conversion.
//!
//! The rewriter does not parse HTML. For each document it replaces literal
//! occurrences of every converted file's path (relative to the document)
//! and then of its bare filename. Documents that end up identical are not
//! written.

mod paths;
mod reference_map;
mod rewrite;

pub use paths::relative_path;
pub use reference_map::{differs_ignoring_case, fold_case, ReferenceMap};
pub use rewrite::{find_bounded, rewrite_content, ReferenceRewriter, RewriteFailure, RewriteReport};
