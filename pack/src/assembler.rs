//! Archive assembly.
//!
//! One build runs these stages in order, each writing new files into the
//! staging tree:
//!
//! 1. parse, render and index the chat input (`chat/`)
//! 2. static context and artifact documents (`context/`, `artifacts/`)
//! 3. repository and environment capture (`artifacts/`, `repo/`)
//! 4. optional platform export, copied verbatim (`platform_export/`)
//! 5. README
//!
//! The staging tree is then sealed into one zip by [`write_archive`].
//! Capture failures never abort a build; they appear as `ERROR: ...` text in
//! the affected files and in [`BuildReport::capture_errors`].

use std::path::{Path, PathBuf};

use handoff_git_tooling::{
    Captured, CommandRunner, EnvironmentSnapshot, capture_environment, capture_git_log,
    capture_git_status,
};
use handoff_transcript::{CanonicalMeta, DroppedSegment, canonicalize};
use serde::Serialize;

use crate::clock::{Clock, format_timestamp};
use crate::config::PackConfig;
use crate::error::{PackError, Result};
use crate::staging::StagingTree;
use crate::templates::{self, embedded};
use crate::writer::write_archive;
use crate::{
    ARTIFACT_COMMITS_PATH, ARTIFACT_FILES_CREATED_PATH, CHAT_INDEX_PATH, CHAT_RAW_PATH,
    PLATFORM_EXPORT_DIR, README_PATH, REPO_ENVIRONMENT_PATH, REPO_GIT_LOG_PATH,
    REPO_GIT_STATUS_PATH,
};

/// Inputs for one pack build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Raw chat text, canonical or not.
    pub chat_input: String,
    /// Working directory for git and environment capture.
    pub repo_dir: PathBuf,
    pub platform_export: Option<PathBuf>,
    /// Destination zip; replaced if it exists.
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub archive_path: PathBuf,
    pub archive_sha256: String,
    pub created_at: String,
    pub timezone: String,
    pub message_count: usize,
    /// Input had no well-formed message block and was wrapped whole.
    pub fallback: bool,
    pub dropped: Vec<DroppedSegment>,
    pub capture_errors: Vec<String>,
    /// Archive entries in write order.
    pub files: Vec<String>,
}

pub struct PackBuilder<'a> {
    config: &'a PackConfig,
    runner: &'a dyn CommandRunner,
    clock: &'a dyn Clock,
}

impl<'a> PackBuilder<'a> {
    pub fn new(config: &'a PackConfig, runner: &'a dyn CommandRunner, clock: &'a dyn Clock) -> Self {
        Self {
            config,
            runner,
            clock,
        }
    }

    pub fn build(&self, request: &BuildRequest) -> Result<BuildReport> {
        let created_at = format_timestamp(self.clock.now());
        let meta = CanonicalMeta::new(created_at.clone(), self.config.timezone.clone());
        let mut staging = StagingTree::new()?;

        // Stage 1: chat
        let canon = canonicalize(&request.chat_input, &meta)?;
        staging.write(CHAT_RAW_PATH, &canon.text)?;
        staging.write(CHAT_INDEX_PATH, canon.index.to_json_pretty()?)?;
        tracing::info!(
            message_count = canon.index.message_count,
            fallback = canon.parsed.transcript.is_fallback(),
            "staged chat transcript"
        );

        // Stage 2: static documents
        for (rel, template) in templates::STATIC_DOCUMENTS {
            staging.write(rel, templates::render_static(template, &created_at))?;
        }

        // Stage 3: repository capture
        let capture = self.capture(&request.repo_dir);
        staging.write(
            ARTIFACT_COMMITS_PATH,
            templates::render_capture(embedded::COMMITS, &created_at, &capture.git_log.render()),
        )?;
        staging.write(
            ARTIFACT_FILES_CREATED_PATH,
            templates::render_capture(
                embedded::FILES_CREATED,
                &created_at,
                &capture.git_status.render(),
            ),
        )?;
        staging.write(REPO_GIT_LOG_PATH, capture.git_log.render())?;
        staging.write(REPO_GIT_STATUS_PATH, capture.git_status.render())?;
        staging.write(REPO_ENVIRONMENT_PATH, capture.environment.render())?;

        // Stage 4: platform export
        let platform_export = match &request.platform_export {
            Some(source) => Some(stage_platform_export(&mut staging, source)?),
            None => None,
        };

        // Stage 5: README
        staging.write(
            README_PATH,
            templates::render_readme(
                &created_at,
                &meta.timezone,
                canon.index.message_count,
                platform_export.as_deref(),
            ),
        )?;

        let summary = write_archive(staging.root(), &request.output)?;

        Ok(BuildReport {
            archive_path: summary.path,
            archive_sha256: summary.sha256,
            created_at,
            timezone: meta.timezone,
            message_count: canon.index.message_count,
            fallback: canon.parsed.transcript.is_fallback(),
            dropped: canon.parsed.dropped,
            capture_errors: capture.errors(),
            files: summary.entries,
        })
    }

    fn capture(&self, repo: &Path) -> RepoCapture {
        let capture = RepoCapture {
            git_log: capture_git_log(self.runner, repo, self.config.git_log_limit),
            git_status: capture_git_status(self.runner, repo),
            environment: capture_environment(self.runner, repo, &self.config.shell),
        };
        for err in capture.errors() {
            tracing::warn!(repo = %repo.display(), "capture degraded: {err}");
        }
        tracing::debug!(
            probes = capture.environment.probes.len(),
            unavailable = capture.environment.unavailable_count(),
            "captured environment"
        );
        capture
    }
}

struct RepoCapture {
    git_log: Captured,
    git_status: Captured,
    environment: EnvironmentSnapshot,
}

impl RepoCapture {
    fn errors(&self) -> Vec<String> {
        let mut errors: Vec<String> = [&self.git_log, &self.git_status]
            .into_iter()
            .filter_map(Captured::error_message)
            .collect();
        errors.extend(
            self.environment
                .probes
                .iter()
                .filter(|p| p.value.is_none())
                .map(|p| format!("{}: {}", p.label, handoff_git_tooling::UNAVAILABLE)),
        );
        errors
    }
}

/// Copy the export under `platform_export/`, keeping its file name.
fn stage_platform_export(staging: &mut StagingTree, source: &Path) -> Result<String> {
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PackError::InvalidStagingPath {
            path: source.display().to_string(),
        })?;
    let rel = format!("{PLATFORM_EXPORT_DIR}/{name}");
    staging.copy_in(&rel, source)?;
    tracing::info!(source = %source.display(), "staged platform export");
    Ok(rel)
}
