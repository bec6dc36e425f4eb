//! Staging-file writer implementation.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use super::error::WriteError;
use crate::formats::extension_of;
use crate::scanner::STAGING_PREFIX;

/// Read buffer used for checksums.
const HASH_BUFFER_SIZE: usize = 1024 * 1024;

/// Result of committing a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The target's bytes changed (or the target did not exist before).
    Changed,
    /// The target already held exactly these bytes; nothing was written.
    Unchanged,
}

impl WriteOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// A staging file waiting to be committed onto its target.
///
/// Dropping it without committing deletes the staging file.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
    permissions_from: Option<PathBuf>,
}

impl StagedFile {
    /// Path producers should write to.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Copies permissions from `path` when the target does not exist yet.
    pub fn inherit_permissions_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.permissions_from = Some(path.into());
        self
    }
}

/// Commits files through same-directory staging files.
#[derive(Debug, Clone, Default)]
pub struct AtomicWriter;

impl AtomicWriter {
    pub fn new() -> Self {
        Self
    }

    /// Creates an empty staging file next to `target`, with the target's extension.
    pub fn stage(&self, target: &Path) -> Result<StagedFile, WriteError> {
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| WriteError::NoParentDirectory {
                path: target.to_path_buf(),
            })?;

        let ext = extension_of(target);
        let suffix = if ext.is_empty() {
            String::new()
        } else {
            format!(".{}", ext)
        };

        let temp = Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(|e| WriteError::StagingFailed {
                target: target.to_path_buf(),
                source: e,
            })?;

        debug!("Staging {:?} for {:?}", temp.path(), target);
        Ok(StagedFile {
            temp,
            target: target.to_path_buf(),
            permissions_from: None,
        })
    }

    /// Moves the staged file onto its target unless the bytes are identical.
    pub async fn commit(&self, staged: StagedFile) -> Result<WriteOutcome, WriteError> {
        let StagedFile {
            temp,
            target,
            permissions_from,
        } = staged;

        let target_exists = fs::try_exists(&target).await.unwrap_or(false);
        if target_exists {
            let existing = calculate_checksum(&target).await?;
            let fresh = calculate_checksum(temp.path()).await?;
            if existing == fresh {
                debug!("{:?} is unchanged, discarding staging file", target);
                return Ok(WriteOutcome::Unchanged);
            }
        }

        // Staging files are created private; give the output the permissions
        // of whatever it replaces.
        let template = if target_exists {
            Some(target.clone())
        } else {
            permissions_from
        };
        if let Some(template) = template {
            match fs::metadata(&template).await {
                Ok(meta) => fs::set_permissions(temp.path(), meta.permissions()).await?,
                Err(e) => debug!("No permissions to inherit from {:?}: {}", template, e),
            }
        }

        match temp.persist(&target) {
            Ok(_) => {}
            Err(err) => {
                if !fs::try_exists(&target).await.unwrap_or(false) {
                    return Err(WriteError::PersistFailed {
                        target,
                        source: err.error,
                    });
                }
                // Platforms without replace-over-existing: delete and retry once.
                warn!(
                    "Replacing {:?} failed ({}), removing it and retrying",
                    target, err.error
                );
                fs::remove_file(&target)
                    .await
                    .map_err(|e| WriteError::PersistFailed {
                        target: target.clone(),
                        source: e,
                    })?;
                err.file
                    .persist(&target)
                    .map_err(|e| WriteError::PersistFailed {
                        target: target.clone(),
                        source: e.error,
                    })?;
            }
        }

        Ok(WriteOutcome::Changed)
    }

    /// Stages `bytes` and commits them onto `target`.
    pub async fn write_bytes(&self, target: &Path, bytes: &[u8]) -> Result<WriteOutcome, WriteError> {
        let staged = self.stage(target)?;

        let mut file = File::create(staged.path())
            .await
            .map_err(|e| WriteError::WriteFailed {
                target: target.to_path_buf(),
                source: e,
            })?;
        file.write_all(bytes)
            .await
            .map_err(|e| WriteError::WriteFailed {
                target: target.to_path_buf(),
                source: e,
            })?;
        file.flush().await.map_err(|e| WriteError::WriteFailed {
            target: target.to_path_buf(),
            source: e,
        })?;
        drop(file);

        self.commit(staged).await
    }

    /// Deletes a superseded original after its replacement was committed.
    pub async fn remove_original(&self, source: &Path) -> Result<(), WriteError> {
        fs::remove_file(source)
            .await
            .map_err(|e| WriteError::CleanupFailed {
                path: source.to_path_buf(),
                source: e,
            })
    }
}

/// SHA-256 of a file's contents.
async fn calculate_checksum(path: &Path) -> Result<String, WriteError> {
    let file = File::open(path)
        .await
        .map_err(|e| WriteError::ChecksumCalculationFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    let mut hasher = Sha256::new();
    loop {
        let bytes_read =
            reader
                .read(&mut buffer)
                .await
                .map_err(|e| WriteError::ChecksumCalculationFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn staging_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with(STAGING_PREFIX)
            })
            .collect()
    }

    #[test]
    fn test_stage_creates_sibling_with_extension() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("logo.png");
        let staged = AtomicWriter::new().stage(&target).unwrap();

        assert_eq!(staged.path().parent(), Some(dir.path()));
        assert_eq!(extension_of(staged.path()), "png");
        assert!(staged.path().exists());
    }

    #[test]
    fn test_dropped_stage_is_cleaned_up() {
        let dir = TempDir::new().unwrap();
        let staged = AtomicWriter::new().stage(&dir.path().join("x.ogg")).unwrap();
        assert_eq!(staging_files(dir.path()).len(), 1);
        drop(staged);
        assert!(staging_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_write_bytes_new_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index.html");

        let outcome = AtomicWriter::new()
            .write_bytes(&target, b"<p>hi</p>")
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Changed);
        assert_eq!(std::fs::read(&target).unwrap(), b"<p>hi</p>");
        assert!(staging_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_write_bytes_identical_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index.html");
        std::fs::write(&target, b"same").unwrap();

        let outcome = AtomicWriter::new()
            .write_bytes(&target, b"same")
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert!(!outcome.is_changed());
        assert!(staging_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_write_bytes_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index.html");
        std::fs::write(&target, b"old").unwrap();

        let outcome = AtomicWriter::new()
            .write_bytes(&target, b"new")
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Changed);
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert!(staging_files(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_commit_inherits_source_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photo.jpg");
        std::fs::write(&source, b"jpeg").unwrap();
        std::fs::set_permissions(&source, std::fs::Permissions::from_mode(0o644)).unwrap();

        let writer = AtomicWriter::new();
        let target = dir.path().join("photo.png");
        let staged = writer.stage(&target).unwrap().inherit_permissions_from(&source);
        std::fs::write(staged.path(), b"png").unwrap();
        writer.commit(staged).await.unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[tokio::test]
    async fn test_remove_original_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = AtomicWriter::new()
            .remove_original(&dir.path().join("gone.jpg"))
            .await;
        assert!(matches!(result, Err(WriteError::CleanupFailed { .. })));
    }

    #[test]
    fn test_stage_without_parent_fails() {
        let result = AtomicWriter::new().stage(Path::new("bare.png"));
        assert!(matches!(result, Err(WriteError::NoParentDirectory { .. })));
    }
}
