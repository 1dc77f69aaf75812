//! `handoff verify`

use std::path::PathBuf;

use clap::Parser;
use handoff_pack::{VerifyReport, verify_archive};

use crate::{EXIT_OK, EXIT_VERIFY_FAILED};

/// Arguments for `handoff verify`
#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// Pack archive to check
    #[arg(value_name = "ZIP")]
    pub archive: PathBuf,

    /// Output as JSON instead of text
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

pub(crate) fn run_verify(args: VerifyArgs) -> anyhow::Result<i32> {
    let report = verify_archive(&args.archive)?;
    let exit_code = if report.passed() {
        tracing::info!(
            archive = %report.archive.display(),
            messages = report.checked_messages,
            "handoff pack verified"
        );
        EXIT_OK
    } else {
        tracing::warn!(
            archive = %report.archive.display(),
            failures = report.failures.len(),
            failed_ids = ?report.failed_ids(),
            "handoff pack failed verification"
        );
        EXIT_VERIFY_FAILED
    };

    if args.json {
        let json = serde_json::json!({
            "archive": report.archive,
            "passed": report.passed(),
            "checked_messages": report.checked_messages,
            "failures": report.failures,
            "exit_code": exit_code,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        for line in render_verify_report(&report) {
            println!("{line}");
        }
    }
    Ok(exit_code)
}

fn render_verify_report(report: &VerifyReport) -> Vec<String> {
    if report.passed() {
        return vec![format!(
            "PASS {} ({} messages verified)",
            report.archive.display(),
            report.checked_messages
        )];
    }
    let mut lines = vec![format!(
        "FAIL {} ({} check(s) failed)",
        report.archive.display(),
        report.failures.len()
    )];
    lines.extend(report.failures.iter().map(|f| format!("  - {f}")));
    lines
}
