//! Realized old → new mapping used for rewriting.

use std::path::{Path, PathBuf};

/// Converted files whose path actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceMap {
    pairs: Vec<(PathBuf, PathBuf)>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a realized conversion.
    ///
    /// Returns `false` (and records nothing) when the paths only differ in
    /// letter case or not at all.
    pub fn insert(&mut self, old: impl Into<PathBuf>, new: impl Into<PathBuf>) -> bool {
        let (old, new) = (old.into(), new.into());
        if !differs_ignoring_case(&old, &new) {
            return false;
        }
        self.pairs.push((old, new));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.pairs.iter().map(|(o, n)| (o.as_path(), n.as_path()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Whether two paths name different files even on a case-insensitive filesystem.
pub fn differs_ignoring_case(a: &Path, b: &Path) -> bool {
    fold_case(a) != fold_case(b)
}

/// Lowercased form of a path, for comparisons that ignore letter case.
pub fn fold_case(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}
