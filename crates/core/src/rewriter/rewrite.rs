//! Text replacement over HTML documents.
//!
//! Documents are treated as opaque bytes: only the UTF-8 path and filename
//! needles need decoding, so pages in legacy encodings are rewritten too.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::paths::relative_path;
use super::reference_map::ReferenceMap;
use crate::writer::AtomicWriter;

/// Bytes that continue a filename; a match touching one is not a reference.
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.')
}

/// Start offsets of every occurrence of `needle` that sits on a filename boundary.
pub fn find_bounded(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }

    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .map(|(start, _)| start)
        .filter(|&start| {
            let end = start + needle.len();
            let before_ok = start == 0 || !is_name_byte(haystack[start - 1]);
            let after_ok = end == haystack.len() || !is_name_byte(haystack[end]);
            before_ok && after_ok
        })
        .collect()
}

/// One accepted replacement over the original content.
#[derive(Debug)]
struct Substitution<'a> {
    start: usize,
    end: usize,
    replacement: &'a [u8],
}

impl Substitution<'_> {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }
}

/// Applies `map` to a document living in `doc_dir`.
///
/// Every match is located in the original content and applied in one pass,
/// so replaced text is never searched again. Relative-path forms are claimed
/// before bare filenames; an occurrence overlapping an earlier claim is left
/// alone. Returns `None` when nothing changed.
pub fn rewrite_content(content: &[u8], doc_dir: &Path, map: &ReferenceMap) -> Option<Vec<u8>> {
    let relative: Vec<(String, String)> = map
        .iter()
        .map(|(old, new)| (relative_path(doc_dir, old), relative_path(doc_dir, new)))
        .collect();
    let bare: Vec<(&str, &str)> = map
        .iter()
        .filter_map(|(old, new)| Some((file_name(old)?, file_name(new)?)))
        .collect();

    let forms = relative
        .iter()
        .map(|(old, new)| (old.as_str(), new.as_str()))
        .chain(bare.iter().copied());

    let mut claimed: Vec<Substitution> = Vec::new();
    for (old, new) in forms {
        for start in find_bounded(content, old.as_bytes()) {
            let end = start + old.len();
            if claimed.iter().any(|s| s.overlaps(start, end)) {
                continue;
            }
            claimed.push(Substitution {
                start,
                end,
                replacement: new.as_bytes(),
            });
        }
    }
    if claimed.is_empty() {
        return None;
    }
    claimed.sort_by_key(|s| s.start);

    let mut out = Vec::with_capacity(content.len());
    let mut last = 0;
    for sub in &claimed {
        out.extend_from_slice(&content[last..sub.start]);
        out.extend_from_slice(sub.replacement);
        last = sub.end;
    }
    out.extend_from_slice(&content[last..]);

    (out != content).then_some(out)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// A document that could not be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a rewrite pass.
#[derive(Debug, Clone, Default)]
pub struct RewriteReport {
    /// Documents whose bytes changed.
    pub changed: Vec<PathBuf>,
    /// Documents skipped because they could not be read or written.
    pub failures: Vec<RewriteFailure>,
}

/// Rewrites references in HTML documents through the atomic writer.
pub struct ReferenceRewriter<'a> {
    writer: &'a AtomicWriter,
}

impl<'a> ReferenceRewriter<'a> {
    pub fn new(writer: &'a AtomicWriter) -> Self {
        Self { writer }
    }

    /// Rewrites every document; failures are collected, never fatal.
    pub async fn rewrite_all(&self, documents: &[PathBuf], map: &ReferenceMap) -> RewriteReport {
        let mut report = RewriteReport::default();
        if map.is_empty() {
            return report;
        }

        for doc in documents {
            match self.rewrite_document(doc, map).await {
                Ok(true) => report.changed.push(doc.clone()),
                Ok(false) => {}
                Err(reason) => {
                    warn!("Skipping {:?}: {}", doc, reason);
                    report.failures.push(RewriteFailure {
                        path: doc.clone(),
                        reason,
                    });
                }
            }
        }
        report
    }

    async fn rewrite_document(&self, doc: &Path, map: &ReferenceMap) -> Result<bool, String> {
        let content = tokio::fs::read(doc)
            .await
            .map_err(|e| format!("cannot read: {}", e))?;

        let doc_dir = doc.parent().unwrap_or_else(|| Path::new(""));
        let Some(updated) = rewrite_content(&content, doc_dir, map) else {
            debug!("No references to update in {:?}", doc);
            return Ok(false);
        };

        let outcome = self
            .writer
            .write_bytes(doc, &updated)
            .await
            .map_err(|e| format!("cannot write: {}", e))?;
        if outcome.is_changed() {
            info!("Updated references in {:?}", doc);
        }
        Ok(outcome.is_changed())
    }
}
