//! Handoff pack assembly and verification.
//!
//! A pack is a zip holding a canonical chat transcript, its byte-offset hash
//! index, context and artifact documents, and raw repository captures.
//! [`PackBuilder`] produces one; [`verify_archive`] re-derives every message
//! digest from the archive bytes and reports what does not match.

mod assembler;
mod clock;
mod config;
mod error;
mod staging;
pub mod templates;
mod verify;
mod writer;

pub use assembler::{BuildReport, BuildRequest, PackBuilder};
pub use clock::{Clock, MockClock, SystemClock, format_timestamp};
pub use config::PackConfig;
pub use error::{PackError, Result};
pub use staging::StagingTree;
pub use verify::{REQUIRED_FILES, VerifyFailure, VerifyReport, verify_archive, verify_directory};
pub use writer::{ArchiveSummary, write_archive};

pub const README_PATH: &str = "README.md";
pub const CHAT_RAW_PATH: &str = "chat/0001_chat_raw.md";
pub const CHAT_INDEX_PATH: &str = "chat/0002_chat_index.json";

pub const CONTEXT_OVERVIEW_PATH: &str = "context/0001_project_overview.md";
pub const CONTEXT_DECISIONS_PATH: &str = "context/0002_decisions.md";
pub const CONTEXT_NEXT_STEPS_PATH: &str = "context/0003_next_steps.md";

pub const ARTIFACT_COMMITS_PATH: &str = "artifacts/commits.md";
pub const ARTIFACT_FILES_CREATED_PATH: &str = "artifacts/files_created.md";
pub const ARTIFACT_OPEN_QUESTIONS_PATH: &str = "artifacts/open_questions.md";

pub const REPO_GIT_LOG_PATH: &str = "repo/git_log.txt";
pub const REPO_GIT_STATUS_PATH: &str = "repo/git_status.txt";
pub const REPO_ENVIRONMENT_PATH: &str = "repo/environment.txt";

pub const PLATFORM_EXPORT_DIR: &str = "platform_export";
