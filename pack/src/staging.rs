//! Write-once staging tree sealed into a single archive.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;

use crate::error::{PackError, Result};

/// Scratch directory where every pack file is written exactly once.
///
/// The directory is removed when the tree is dropped.
#[derive(Debug)]
pub struct StagingTree {
    dir: TempDir,
    written: BTreeSet<String>,
}

impl StagingTree {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("handoff-staging-")
            .tempdir()
            .map_err(|e| PackError::io(std::env::temp_dir(), e))?;
        tracing::debug!(root = %dir.path().display(), "created staging tree");
        Ok(Self {
            dir,
            written: BTreeSet::new(),
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `rel`, creating parent directories.
    ///
    /// Fails with [`PackError::StagingConflict`] if `rel` was already written.
    pub fn write(&mut self, rel: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
        let target = self.claim(rel)?;
        std::fs::write(&target, contents).map_err(|e| PackError::io(&target, e))?;
        Ok(target)
    }

    /// Copy `source` byte-for-byte to `rel`.
    pub fn copy_in(&mut self, rel: &str, source: &Path) -> Result<PathBuf> {
        let bytes = std::fs::read(source).map_err(|e| PackError::io(source, e))?;
        self.write(rel, bytes)
    }

    /// Relative paths written so far, sorted.
    pub fn files(&self) -> Vec<String> {
        self.written.iter().cloned().collect()
    }

    fn claim(&mut self, rel: &str) -> Result<PathBuf> {
        let rel_path = Path::new(rel);
        let valid = !rel.is_empty()
            && rel_path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(PackError::InvalidStagingPath {
                path: rel.to_string(),
            });
        }

        if self.written.contains(rel) {
            return Err(PackError::StagingConflict {
                path: rel.to_string(),
            });
        }

        let target = self.dir.path().join(rel_path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PackError::io(parent, e))?;
        }
        self.written.insert(rel.to_string());
        Ok(target)
    }
}
