//! Directory walker implementation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::error::ScanError;
use crate::formats::{
    extension_of, HTML_EXTENSIONS, IMAGE_EXTENSIONS, MEDIA_EXTENSIONS, VECTOR_IMAGE_EXT,
};

/// Directory names pruned together with everything below them.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    "dist",
    "build",
    ".cache",
    ".idea",
    ".vscode",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
];

/// File name prefix of staging files created next to conversion targets.
pub const STAGING_PREFIX: &str = ".mediacanon-";

/// Disjoint candidate sets produced by a scan, each sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub images: Vec<PathBuf>,
    pub media: Vec<PathBuf>,
    pub html: Vec<PathBuf>,
}

impl ScanResult {
    /// Total number of files found across all buckets.
    pub fn total(&self) -> usize {
        self.images.len() + self.media.len() + self.html.len()
    }
}

/// Walks a root directory and buckets candidate files.
#[derive(Debug, Clone)]
pub struct Scanner {
    skip_dirs: HashSet<String>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Creates a scanner with the built-in skip-list.
    pub fn new() -> Self {
        Self {
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Adds directory names to prune.
    pub fn with_extra_skip_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    fn is_pruned(&self, entry: &DirEntry) -> bool {
        // The root itself is never pruned, whatever its name.
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.skip_dirs.contains(name))
    }

    /// Scans `root`, returning absolute paths.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        let root = root.canonicalize().map_err(|_| ScanError::RootNotFound {
            path: root.to_path_buf(),
        })?;

        let mut result = ScanResult::default();
        let walker = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !self.is_pruned(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let is_staging = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(STAGING_PREFIX));
            if is_staging {
                debug!("Ignoring leftover staging file {:?}", entry.path());
                continue;
            }

            let ext = extension_of(entry.path());
            let path = entry.into_path();
            if ext == VECTOR_IMAGE_EXT {
                continue;
            } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                result.images.push(path);
            } else if MEDIA_EXTENSIONS.contains(&ext.as_str()) {
                result.media.push(path);
            } else if HTML_EXTENSIONS.contains(&ext.as_str()) {
                result.html.push(path);
            }
        }

        result.images.sort();
        result.media.sort();
        result.html.sort();

        debug!(
            images = result.images.len(),
            media = result.media.len(),
            html = result.html.len(),
            "Scan of {:?} complete",
            root
        );
        Ok(result)
    }
}
