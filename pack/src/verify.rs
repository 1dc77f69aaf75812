//! Independent archive verification.
//!
//! The verifier trusts nothing the writer asserted. It unpacks the archive
//! into a scratch directory, re-reads the canonical transcript and index from
//! raw bytes, and recomputes every message digest through the same
//! [`extract_bytes`] the index builder used. The archive itself is only ever
//! opened for reading.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use handoff_transcript::{ChatIndex, MessageId, extract_bytes, sha256_bytes};
use serde::Serialize;

use crate::error::{PackError, Result};
use crate::{CHAT_INDEX_PATH, CHAT_RAW_PATH, README_PATH};

/// Files every pack must contain.
pub const REQUIRED_FILES: &[&str] = &[CHAT_RAW_PATH, CHAT_INDEX_PATH, README_PATH];

/// One failed check. Verification collects all of them rather than stopping
/// at the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerifyFailure {
    MissingFile {
        path: String,
    },
    IndexUnreadable {
        path: String,
        detail: String,
    },
    CountMismatch {
        declared: usize,
        actual: usize,
    },
    RangeInvalid {
        id: MessageId,
        detail: String,
    },
    HashMismatch {
        id: MessageId,
        expected: String,
        actual: String,
    },
}

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyFailure::MissingFile { path } => write!(f, "missing required file: {path}"),
            VerifyFailure::IndexUnreadable { path, detail } => {
                write!(f, "cannot parse {path}: {detail}")
            }
            VerifyFailure::CountMismatch { declared, actual } => write!(
                f,
                "message_count is {declared} but index lists {actual} messages"
            ),
            VerifyFailure::RangeInvalid { id, detail } => {
                write!(f, "message {id}: {detail}")
            }
            VerifyFailure::HashMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "message {id}: hash mismatch (expected {expected}, actual {actual})"
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub archive: PathBuf,
    /// Index entries whose bytes were re-hashed
    pub checked_messages: usize,
    pub failures: Vec<VerifyFailure>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ids named by hash or range failures, in index order.
    pub fn failed_ids(&self) -> Vec<MessageId> {
        self.failures
            .iter()
            .filter_map(|f| match f {
                VerifyFailure::HashMismatch { id, .. } | VerifyFailure::RangeInvalid { id, .. } => {
                    Some(*id)
                }
                _ => None,
            })
            .collect()
    }
}

/// Verify a pack archive.
///
/// Returns `Err` only when the archive cannot be opened or unpacked; every
/// content problem is a [`VerifyFailure`] in the report.
pub fn verify_archive(archive: &Path) -> Result<VerifyReport> {
    let file = File::open(archive).map_err(|e| PackError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| PackError::zip(archive, e))?;

    let scratch = tempfile::Builder::new()
        .prefix("handoff-verify-")
        .tempdir()
        .map_err(|e| PackError::io(std::env::temp_dir(), e))?;
    zip.extract(scratch.path())
        .map_err(|e| PackError::zip(archive, e))?;

    let mut report = verify_directory(scratch.path())?;
    report.archive = archive.to_path_buf();

    if report.passed() {
        tracing::info!(
            archive = %archive.display(),
            checked = report.checked_messages,
            "archive verified"
        );
    } else {
        for failure in &report.failures {
            tracing::warn!(archive = %archive.display(), "{failure}");
        }
    }
    Ok(report)
}

/// Verify an unpacked pack rooted at `root`.
pub fn verify_directory(root: &Path) -> Result<VerifyReport> {
    let mut report = VerifyReport {
        archive: root.to_path_buf(),
        checked_messages: 0,
        failures: Vec::new(),
    };

    for rel in REQUIRED_FILES {
        if !root.join(rel).is_file() {
            report.failures.push(VerifyFailure::MissingFile {
                path: (*rel).to_string(),
            });
        }
    }
    if !report.failures.is_empty() {
        return Ok(report);
    }

    let raw_path = root.join(CHAT_RAW_PATH);
    let canonical = std::fs::read(&raw_path).map_err(|e| PackError::io(&raw_path, e))?;

    let index_path = root.join(CHAT_INDEX_PATH);
    let index_bytes = std::fs::read(&index_path).map_err(|e| PackError::io(&index_path, e))?;
    let index = match std::str::from_utf8(&index_bytes)
        .map_err(|e| e.to_string())
        .and_then(|json| ChatIndex::from_json(json).map_err(|e| e.to_string()))
    {
        Ok(index) => index,
        Err(detail) => {
            report.failures.push(VerifyFailure::IndexUnreadable {
                path: CHAT_INDEX_PATH.to_string(),
                detail,
            });
            return Ok(report);
        }
    };

    if !index.count_is_consistent() {
        report.failures.push(VerifyFailure::CountMismatch {
            declared: index.message_count,
            actual: index.messages.len(),
        });
    }

    for entry in &index.messages {
        report.checked_messages += 1;
        let content = match extract_bytes(&canonical, entry) {
            Ok(content) => content,
            Err(err) => {
                report.failures.push(VerifyFailure::RangeInvalid {
                    id: entry.id,
                    detail: err.to_string(),
                });
                continue;
            }
        };
        let actual = sha256_bytes(content);
        if actual != entry.sha256 {
            report.failures.push(VerifyFailure::HashMismatch {
                id: entry.id,
                expected: entry.sha256.clone(),
                actual,
            });
        }
    }

    Ok(report)
}
