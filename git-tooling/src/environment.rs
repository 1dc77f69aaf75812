//! Environment snapshot.
//!
//! Each probe is independent; one missing tool never hides the others.

use std::path::Path;

use crate::capture::run_capture;
use crate::runner::CommandRunner;

/// Placeholder for a probe that produced nothing.
pub const UNAVAILABLE: &str = "(unavailable)";

/// One labelled probe result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub label: String,
    /// First line of output, `None` when the probe failed.
    pub value: Option<String>,
}

/// Host facts recorded alongside a repository capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    pub os: String,
    pub arch: String,
    pub probes: Vec<Probe>,
}

impl EnvironmentSnapshot {
    /// `label: value` lines, with `(unavailable)` for failed probes.
    pub fn render(&self) -> String {
        let mut out = format!("os: {}\narch: {}\n", self.os, self.arch);
        for probe in &self.probes {
            let value = probe.value.as_deref().unwrap_or(UNAVAILABLE);
            out.push_str(&format!("{}: {value}\n", probe.label));
        }
        out
    }

    pub fn unavailable_count(&self) -> usize {
        self.probes.iter().filter(|p| p.value.is_none()).count()
    }
}

fn probe(runner: &dyn CommandRunner, label: &str, program: &str, args: &[&str], cwd: &Path) -> Probe {
    let captured = run_capture(runner, program, args, cwd);
    let value = captured
        .result
        .ok()
        .and_then(|stdout| stdout.lines().map(str::trim).find(|l| !l.is_empty()).map(str::to_string));
    Probe {
        label: label.to_string(),
        value,
    }
}

/// Record OS/arch, `uname -a`, the git version and a shell compatibility probe.
pub fn capture_environment(runner: &dyn CommandRunner, cwd: &Path, shell: &str) -> EnvironmentSnapshot {
    let probes = vec![
        probe(runner, "uname", "uname", &["-a"], cwd),
        probe(runner, "git", "git", &["--version"], cwd),
        probe(runner, &format!("shell ({shell})"), shell, &["--version"], cwd),
    ];
    EnvironmentSnapshot {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        probes,
    }
}
