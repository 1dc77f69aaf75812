//! Git log and status capture.

use std::path::Path;

use crate::capture::{Captured, run_capture};
use crate::runner::CommandRunner;

/// Recent history, one commit per line with decorations.
pub fn capture_git_log(runner: &dyn CommandRunner, repo: &Path, limit: usize) -> Captured {
    let limit = limit.to_string();
    run_capture(
        runner,
        "git",
        &["log", "--oneline", "--decorate", "-n", &limit],
        repo,
    )
}

/// Working tree status in porcelain form, with the branch line.
pub fn capture_git_status(runner: &dyn CommandRunner, repo: &Path) -> Captured {
    run_capture(runner, "git", &["status", "--porcelain=v1", "--branch"], repo)
}
