//! Command execution seam.
//!
//! Capture code never touches `std::process` directly; it goes through a
//! [`CommandRunner`] so tests can script every external tool.

use std::io;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;

/// Exit status and decoded output of one finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs an external program to completion.
pub trait CommandRunner {
    /// Spawn errors are `Err`; a non-zero exit is an `Ok` with that status.
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput>;
}

/// Runs real processes via `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput> {
        tracing::debug!(program, ?args, cwd = %cwd.display(), "running command");
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Output(CommandOutput),
    SpawnError(io::ErrorKind, String),
}

/// A runner that answers from a script instead of spawning processes.
///
/// Responses are matched by command-line prefix (`"git log"` matches
/// `git log --oneline -n 20`); the first match wins. Unscripted commands fail
/// to spawn with `NotFound`, like a missing binary.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    script: Vec<(String, Scripted)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `output`.
    pub fn respond(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.script
            .push((prefix.to_string(), Scripted::Output(output)));
        self
    }

    /// Make commands starting with `prefix` fail to spawn.
    pub fn fail_spawn(mut self, prefix: &str, kind: io::ErrorKind, message: &str) -> Self {
        self.script.push((
            prefix.to_string(),
            Scripted::SpawnError(kind, message.to_string()),
        ));
        self
    }

    /// Command lines run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> io::Result<CommandOutput> {
        let line = command_line(program, args);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(line.clone());
        }
        match self
            .script
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
        {
            Some((_, Scripted::Output(output))) => Ok(output.clone()),
            Some((_, Scripted::SpawnError(kind, message))) => {
                Err(io::Error::new(*kind, message.clone()))
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{program}: command not found"),
            )),
        }
    }
}

/// `program arg1 arg2`, for logs and diagnostics.
pub fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
