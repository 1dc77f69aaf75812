//! Deterministic zip serialization of a staging tree.
//!
//! Entries are sorted by relative path, carry the zip epoch
//! (1980-01-01 00:00:00) and mode `0o644`, and no extra fields, so identical
//! trees always produce identical archive bytes.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use handoff_transcript::sha256_file;
use serde::Serialize;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::error::{PackError, Result};

const ENTRY_MODE: u32 = 0o644;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    /// Archive entry names in write order
    pub entries: Vec<String>,
    /// SHA-256 of the finished archive file
    pub sha256: String,
}

/// Write every file under `staging_root` into a new zip at `dest`.
///
/// An existing file at `dest` is removed first; the archive is never appended
/// to or patched.
pub fn write_archive(staging_root: &Path, dest: &Path) -> Result<ArchiveSummary> {
    let files = collect_files(staging_root)?;

    if dest.exists() {
        tracing::debug!(path = %dest.display(), "removing existing archive");
        std::fs::remove_file(dest).map_err(|e| PackError::io(dest, e))?;
    }
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PackError::io(parent, e))?;
    }

    let file = File::create(dest).map_err(|e| PackError::io(dest, e))?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(ENTRY_MODE);

    for (name, full_path) in &files {
        let bytes = std::fs::read(full_path).map_err(|e| PackError::io(full_path, e))?;
        zip.start_file(name.as_str(), options)
            .map_err(|e| PackError::zip(dest, e))?;
        zip.write_all(&bytes).map_err(|e| PackError::io(dest, e))?;
    }

    let mut file = zip.finish().map_err(|e| PackError::zip(dest, e))?;
    file.flush().map_err(|e| PackError::io(dest, e))?;
    drop(file);

    let sha256 = sha256_file(dest).map_err(|e| PackError::io(dest, e))?;
    tracing::info!(
        path = %dest.display(),
        entries = files.len(),
        sha256 = %sha256,
        "wrote archive"
    );

    Ok(ArchiveSummary {
        path: dest.to_path_buf(),
        entries: files.into_iter().map(|(name, _)| name).collect(),
        sha256,
    })
}

/// Regular files under `root` as `(relative name, absolute path)`, sorted by
/// name with `/` separators.
fn collect_files(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            PackError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((name, entry.path().to_path_buf()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}
