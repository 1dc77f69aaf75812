//! End-to-end pack build and verification tests.
//!
//! Tests:
//! - build with git log succeeding and git status failing
//! - re-verification of an unmodified archive
//! - a single flipped byte is attributed to exactly one message
//! - identical inputs give byte-identical archives
//! - missing required files are named
//! - fallback wrapping survives the full pipeline
//! - a missing git binary degrades every git capture but not the build
//! - a later clock reading changes the archive

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use chrono::Duration;
use handoff_git_tooling::{CommandOutput, ScriptedRunner};
use handoff_pack::{
    BuildReport, BuildRequest, CHAT_INDEX_PATH, CHAT_RAW_PATH, MockClock, PackBuilder,
    PackConfig, README_PATH, VerifyFailure, verify_archive, write_archive,
};
use handoff_transcript::{ChatIndex, MessageId, extract_content, sha256_str};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

const TWO_BLOCKS: &str = "\
<<<BEGIN_MESSAGE>>>
id: 000001
ts: 2026-01-15T11:58:00Z
role: user
tags: []
source: chat_input
<<<CONTENT>>>
hello
<<<END_MESSAGE>>>

<<<BEGIN_MESSAGE>>>
id: 000002
ts: null
role: assistant
tags: [\"reply\"]
source: chat_input
<<<CONTENT>>>
world
<<<END_MESSAGE>>>
";

const GIT_LOG: &str = "a1b2c3d (HEAD -> main) Add parser\n9f8e7d6 Initial commit\n";

/// Git log works, git status fails as it would outside a repository.
fn runner_without_status() -> ScriptedRunner {
    ScriptedRunner::new()
        .respond("git log", CommandOutput::ok(GIT_LOG))
        .respond(
            "git status",
            CommandOutput::failed(
                128,
                "fatal: not a git repository (or any of the parent directories): .git",
            ),
        )
        .respond("git --version", CommandOutput::ok("git version 2.43.0\n"))
        .respond("uname", CommandOutput::ok("Linux handoff 6.1.0 x86_64\n"))
        .respond("zsh --version", CommandOutput::ok("zsh 5.9 (x86_64-pc-linux-gnu)\n"))
}

fn build(chat: &str, dir: &TempDir, name: &str) -> BuildReport {
    build_with(chat, dir, name, &runner_without_status(), &MockClock::fixed())
}

fn build_with(
    chat: &str,
    dir: &TempDir,
    name: &str,
    runner: &ScriptedRunner,
    clock: &MockClock,
) -> BuildReport {
    let config = PackConfig::default();
    let request = BuildRequest {
        chat_input: chat.to_string(),
        repo_dir: dir.path().to_path_buf(),
        platform_export: None,
        output: dir.path().join(name),
    };
    PackBuilder::new(&config, runner, clock)
        .build(&request)
        .unwrap()
}

fn read_entry(archive: &Path, name: &str) -> String {
    let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut body = String::new();
    zip.by_name(name)
        .unwrap()
        .read_to_string(&mut body)
        .unwrap();
    body
}

fn unpack(archive: &Path) -> TempDir {
    let dir = TempDir::new().unwrap();
    zip::ZipArchive::new(File::open(archive).unwrap())
        .unwrap()
        .extract(dir.path())
        .unwrap();
    dir
}

// ============================================================================
// Build
// ============================================================================

#[test]
fn test_failed_git_status_is_inline_error() {
    let dir = TempDir::new().unwrap();
    let report = build(TWO_BLOCKS, &dir, "pack.zip");

    let commits = read_entry(&report.archive_path, "artifacts/commits.md");
    assert!(commits.contains("a1b2c3d (HEAD -> main) Add parser"));
    assert!(!commits.contains("ERROR: "));

    let files_created = read_entry(&report.archive_path, "artifacts/files_created.md");
    assert!(files_created.contains("ERROR: git status --porcelain=v1 --branch failed (exit 128)"));
    assert!(files_created.contains("not a git repository"));

    assert_eq!(read_entry(&report.archive_path, "repo/git_log.txt"), GIT_LOG);
    assert!(read_entry(&report.archive_path, "repo/git_status.txt").starts_with("ERROR: "));
    assert_eq!(report.capture_errors.len(), 1);
}

#[test]
fn test_missing_git_binary_degrades_captures() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new()
        .fail_spawn("git", io::ErrorKind::NotFound, "No such file or directory (os error 2)")
        .respond("uname", CommandOutput::ok("Linux handoff 6.1.0 x86_64\n"))
        .respond("zsh --version", CommandOutput::ok("zsh 5.9 (x86_64-pc-linux-gnu)\n"));
    let report = build_with(TWO_BLOCKS, &dir, "pack.zip", &runner, &MockClock::fixed());

    let log = read_entry(&report.archive_path, "repo/git_log.txt");
    assert!(log.starts_with("ERROR: git log --oneline --decorate -n 20 could not be started"));
    assert!(read_entry(&report.archive_path, "repo/git_status.txt").starts_with("ERROR: "));
    let environment = read_entry(&report.archive_path, "repo/environment.txt");
    assert!(environment.contains("git: (unavailable)\n"));
    assert!(environment.contains("uname: Linux handoff 6.1.0 x86_64\n"));

    assert_eq!(report.capture_errors.len(), 3);
    assert!(report.capture_errors.contains(&"git: (unavailable)".to_string()));
    assert!(runner.calls().iter().any(|call| call == "git --version"));
    assert!(verify_archive(&report.archive_path).unwrap().passed());
}

#[test]
fn test_archive_layout_and_metadata() {
    let dir = TempDir::new().unwrap();
    let report = build(TWO_BLOCKS, &dir, "pack.zip");

    assert_eq!(report.created_at, "2026-01-15T12:00:00Z");
    assert_eq!(report.timezone, "UTC");
    assert_eq!(report.message_count, 2);
    assert!(!report.fallback);
    assert!(report.dropped.is_empty());
    assert_eq!(
        report.files,
        vec![
            "README.md",
            "artifacts/commits.md",
            "artifacts/files_created.md",
            "artifacts/open_questions.md",
            "chat/0001_chat_raw.md",
            "chat/0002_chat_index.json",
            "context/0001_project_overview.md",
            "context/0002_decisions.md",
            "context/0003_next_steps.md",
            "repo/environment.txt",
            "repo/git_log.txt",
            "repo/git_status.txt",
        ]
    );

    let overview = read_entry(&report.archive_path, "context/0001_project_overview.md");
    assert!(overview.contains("2026-01-15T12:00:00Z"));
    assert!(!overview.contains("{{"));

    let readme = read_entry(&report.archive_path, README_PATH);
    assert!(readme.contains("Messages: 2"));

    let environment = read_entry(&report.archive_path, "repo/environment.txt");
    assert!(environment.contains("shell (zsh): zsh 5.9 (x86_64-pc-linux-gnu)\n"));
}

#[test]
fn test_index_entries_extract_original_content() {
    let dir = TempDir::new().unwrap();
    let report = build(TWO_BLOCKS, &dir, "pack.zip");

    let text = read_entry(&report.archive_path, CHAT_RAW_PATH);
    let index = ChatIndex::from_json(&read_entry(&report.archive_path, CHAT_INDEX_PATH)).unwrap();
    assert_eq!(index.message_count, 2);
    assert_eq!(index.created_at, report.created_at);

    let first = extract_content(text.as_bytes(), &index.messages[0]).unwrap();
    let second = extract_content(text.as_bytes(), &index.messages[1]).unwrap();
    assert_eq!(first, "hello");
    assert_eq!(second, "world");
    assert_eq!(index.messages[0].ts.as_deref(), Some("2026-01-15T11:58:00Z"));
    assert_eq!(index.messages[1].role, "assistant");
    assert_eq!(index.messages[1].tags, vec!["reply".to_string()]);
}

#[test]
fn test_platform_export_copied_verbatim() {
    let dir = TempDir::new().unwrap();
    let export = dir.path().join("conversation.json");
    fs::write(&export, "{\"title\": \"naïve\"}\r\n").unwrap();

    let config = PackConfig::default();
    let runner = runner_without_status();
    let clock = MockClock::fixed();
    let request = BuildRequest {
        chat_input: "hello".to_string(),
        repo_dir: dir.path().to_path_buf(),
        platform_export: Some(export),
        output: dir.path().join("pack.zip"),
    };
    let report = PackBuilder::new(&config, &runner, &clock)
        .build(&request)
        .unwrap();

    assert_eq!(
        read_entry(&report.archive_path, "platform_export/conversation.json"),
        "{\"title\": \"naïve\"}\r\n"
    );
    assert!(read_entry(&report.archive_path, README_PATH).contains("platform_export/conversation.json"));
    assert!(verify_archive(&report.archive_path).unwrap().passed());
}

#[test]
fn test_fallback_input_hash_matches_raw() {
    let dir = TempDir::new().unwrap();
    let raw = "just some notes\nwith no markers";
    let report = build(raw, &dir, "pack.zip");
    assert!(report.fallback);

    let index = ChatIndex::from_json(&read_entry(&report.archive_path, CHAT_INDEX_PATH)).unwrap();
    assert_eq!(index.messages.len(), 1);
    assert_eq!(index.messages[0].id, MessageId::FIRST);
    assert_eq!(index.messages[0].tags, vec!["unparsed".to_string()]);
    assert_eq!(index.messages[0].sha256, sha256_str(raw));
}

// ============================================================================
// Verify
// ============================================================================

#[test]
fn test_reverification_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let report = build(TWO_BLOCKS, &dir, "pack.zip");
    let before = fs::read(&report.archive_path).unwrap();

    let first = verify_archive(&report.archive_path).unwrap();
    let second = verify_archive(&report.archive_path).unwrap();
    assert!(first.passed(), "{:?}", first.failures);
    assert!(second.passed(), "{:?}", second.failures);
    assert_eq!(first.checked_messages, 2);
    assert_eq!(second.checked_messages, 2);

    assert_eq!(fs::read(&report.archive_path).unwrap(), before);
}

#[test]
fn test_flipped_byte_names_exactly_one_message() {
    let dir = TempDir::new().unwrap();
    let report = build(TWO_BLOCKS, &dir, "pack.zip");

    let unpacked = unpack(&report.archive_path);
    let raw_path = unpacked.path().join(CHAT_RAW_PATH);
    let mut bytes = fs::read(&raw_path).unwrap();
    let pos = bytes.windows(5).position(|w| w == b"world").unwrap();
    bytes[pos + 1] = b'p';
    fs::write(&raw_path, &bytes).unwrap();

    let tampered = dir.path().join("tampered.zip");
    write_archive(unpacked.path(), &tampered).unwrap();

    let result = verify_archive(&tampered).unwrap();
    assert!(!result.passed());
    assert_eq!(
        result.failures,
        vec![VerifyFailure::HashMismatch {
            id: MessageId::new(2),
            expected: sha256_str("world"),
            actual: sha256_str("wprld"),
        }]
    );
}

#[test]
fn test_missing_readme_is_reported() {
    let dir = TempDir::new().unwrap();
    let report = build(TWO_BLOCKS, &dir, "pack.zip");

    let unpacked = unpack(&report.archive_path);
    fs::remove_file(unpacked.path().join(README_PATH)).unwrap();
    let stripped = dir.path().join("stripped.zip");
    write_archive(unpacked.path(), &stripped).unwrap();

    let result = verify_archive(&stripped).unwrap();
    assert_eq!(
        result.failures,
        vec![VerifyFailure::MissingFile {
            path: README_PATH.to_string()
        }]
    );
    assert_eq!(result.failures[0].to_string(), "missing required file: README.md");
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_identical_inputs_identical_archives() {
    let dir = TempDir::new().unwrap();
    let first = build(TWO_BLOCKS, &dir, "a.zip");
    let second = build(TWO_BLOCKS, &dir, "b.zip");

    assert_eq!(first.archive_sha256, second.archive_sha256);
    assert_eq!(
        fs::read(&first.archive_path).unwrap(),
        fs::read(&second.archive_path).unwrap()
    );
}

#[test]
fn test_later_build_time_changes_archive() {
    let dir = TempDir::new().unwrap();
    let runner = runner_without_status();
    let mut clock = MockClock::fixed();
    let first = build_with(TWO_BLOCKS, &dir, "a.zip", &runner, &clock);
    clock.advance(Duration::hours(1));
    let second = build_with(TWO_BLOCKS, &dir, "b.zip", &runner, &clock);

    assert_eq!(first.created_at, "2026-01-15T12:00:00Z");
    assert_eq!(second.created_at, "2026-01-15T13:00:00Z");
    assert_ne!(first.archive_sha256, second.archive_sha256);
    assert!(read_entry(&second.archive_path, README_PATH).contains("2026-01-15T13:00:00Z"));
}

#[test]
fn test_existing_output_is_overwritten() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pack.zip"), "stale bytes").unwrap();

    let report = build(TWO_BLOCKS, &dir, "pack.zip");
    assert!(verify_archive(&report.archive_path).unwrap().passed());
}
