//! `handoff build`

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use handoff_git_tooling::SystemCommandRunner;
use handoff_pack::{BuildReport, BuildRequest, PackBuilder, PackConfig, SystemClock};
use handoff_transcript::DroppedSummary;

use crate::EXIT_OK;

/// Arguments for `handoff build`
#[derive(Debug, Parser)]
pub struct BuildArgs {
    /// Chat transcript to pack (`-` reads stdin)
    #[arg(long = "chat", value_name = "FILE")]
    pub chat: PathBuf,

    /// Repository to capture git log/status from (defaults to current directory)
    #[arg(long = "repo", value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Platform export file copied verbatim into the pack
    #[arg(long = "platform-export", value_name = "FILE")]
    pub platform_export: Option<PathBuf>,

    /// Destination zip (replaced if it exists)
    #[arg(long = "out", short = 'o', value_name = "ZIP")]
    pub out: PathBuf,

    /// Timezone label for the transcript header and index
    #[arg(long = "timezone", value_name = "TZ")]
    pub timezone: Option<String>,

    /// Output as JSON instead of text
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

pub(crate) fn run_build(config_path: Option<&Path>, args: BuildArgs) -> anyhow::Result<i32> {
    let mut config = match config_path {
        Some(path) => PackConfig::load_from_path(path)?,
        None => PackConfig::load()?,
    };
    if let Some(timezone) = args.timezone {
        config.timezone = timezone;
    }
    config.validate()?;

    let chat_input = read_chat(&args.chat)?;
    let repo_dir = match args.repo {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let request = BuildRequest {
        chat_input,
        repo_dir,
        platform_export: args.platform_export,
        output: args.out,
    };
    let report = PackBuilder::new(&config, &SystemCommandRunner, &SystemClock)
        .build(&request)
        .with_context(|| format!("failed to build {}", request.output.display()))?;
    tracing::info!(
        archive = %report.archive_path.display(),
        sha256 = %report.archive_sha256,
        messages = report.message_count,
        fallback = report.fallback,
        capture_errors = report.capture_errors.len(),
        "handoff pack built"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in render_build_summary(&report) {
            println!("{line}");
        }
    }
    Ok(EXIT_OK)
}

fn read_chat(path: &Path) -> anyhow::Result<String> {
    let bytes = if path == Path::new("-") {
        let mut input = Vec::new();
        std::io::stdin()
            .read_to_end(&mut input)
            .context("failed to read chat from stdin")?;
        input
    } else {
        std::fs::read(path).with_context(|| format!("failed to read chat {}", path.display()))?
    };
    Ok(decode_chat(bytes, path))
}

/// Chat exports are not always UTF-8; undecodable bytes become U+FFFD.
fn decode_chat(bytes: Vec<u8>, path: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let text = String::from_utf8_lossy(err.as_bytes()).into_owned();
            tracing::warn!(
                chat = %path.display(),
                valid_up_to = err.utf8_error().valid_up_to(),
                "chat input is not valid UTF-8, replacing undecodable bytes"
            );
            text
        }
    }
}

fn render_build_summary(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![
        format!("Wrote {}", report.archive_path.display()),
        format!("  sha256:   {}", report.archive_sha256),
        format!("  created:  {} ({})", report.created_at, report.timezone),
        format!(
            "  messages: {}{}",
            report.message_count,
            if report.fallback { " (unstructured input wrapped)" } else { "" }
        ),
        format!("  files:    {}", report.files.len()),
    ];
    let dropped = DroppedSummary::of(&report.dropped);
    if dropped.segments > 0 {
        lines.push(format!(
            "  dropped:  {} segment(s), {} byte(s) outside indexed blocks",
            dropped.segments, dropped.bytes
        ));
    }
    for err in &report.capture_errors {
        lines.push(format!("  capture:  {err}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use handoff_transcript::{DropKind, DroppedSegment};
    use pretty_assertions::assert_eq;

    #[test]
    fn latin1_bytes_decode_with_replacement() {
        let text = decode_chat(b"caf\xe9 latin-1 paste".to_vec(), Path::new("chat.md"));
        assert_eq!(text, "caf\u{fffd} latin-1 paste");
    }

    #[test]
    fn utf8_bytes_decode_unchanged() {
        let text = decode_chat("café ✓".as_bytes().to_vec(), Path::new("-"));
        assert_eq!(text, "café ✓");
    }

    #[test]
    fn summary_reports_dropped_segments() {
        let report = BuildReport {
            archive_path: PathBuf::from("pack.zip"),
            archive_sha256: "ab".repeat(32),
            created_at: "2026-01-15T12:00:00Z".to_string(),
            timezone: "UTC".to_string(),
            message_count: 1,
            fallback: false,
            dropped: vec![
                DroppedSegment {
                    kind: DropKind::TrailingText,
                    byte_start: 10,
                    byte_end: 14,
                },
                DroppedSegment {
                    kind: DropKind::UnindexedBlock,
                    byte_start: 20,
                    byte_end: 26,
                },
            ],
            capture_errors: vec!["git status: not a git repository".to_string()],
            files: Vec::new(),
        };
        let lines = render_build_summary(&report);
        assert!(lines.contains(&"  dropped:  2 segment(s), 10 byte(s) outside indexed blocks".to_string()));
        assert_eq!(lines.last().unwrap(), "  capture:  git status: not a git repository");
    }
}
