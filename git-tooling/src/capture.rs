//! Captured command output that renders failures inline.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::runner::{CommandRunner, command_line};

/// Why a capture produced no usable output.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("{command} could not be started: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} failed ({status}): {detail}")]
    Failed {
        command: String,
        status: String,
        detail: String,
    },
}

/// Result of running one capture command.
#[derive(Debug)]
pub struct Captured {
    pub command: String,
    pub result: Result<String, CaptureError>,
}

impl Captured {
    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }

    /// Raw stdout on success, an `ERROR: ...` line otherwise.
    pub fn render(&self) -> String {
        match &self.result {
            Ok(stdout) => stdout.clone(),
            Err(err) => format!("ERROR: {err}\n"),
        }
    }

    /// The failure message, if any.
    pub fn error_message(&self) -> Option<String> {
        self.result.as_ref().err().map(ToString::to_string)
    }
}

/// Run a command and keep its stdout, converting any failure into a value.
pub fn run_capture(runner: &dyn CommandRunner, program: &str, args: &[&str], cwd: &Path) -> Captured {
    let command = command_line(program, args);
    let result = match runner.run(program, args, cwd) {
        Ok(output) if output.success() => Ok(output.stdout),
        Ok(output) => {
            let status = output
                .status
                .map(|code| format!("exit {code}"))
                .unwrap_or_else(|| "terminated by signal".to_string());
            let detail = match output.stderr.trim() {
                "" => "no error output".to_string(),
                stderr => stderr.to_string(),
            };
            Err(CaptureError::Failed {
                command: command.clone(),
                status,
                detail,
            })
        }
        Err(source) => Err(CaptureError::Spawn {
            command: command.clone(),
            source,
        }),
    };

    if let Err(err) = &result {
        tracing::warn!(error = %err, "capture command failed, recording inline");
    }

    Captured { command, result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, ScriptedRunner};
    use pretty_assertions::assert_eq;

    #[test]
    fn success_renders_stdout_verbatim() {
        let runner = ScriptedRunner::new().respond("git log", CommandOutput::ok("a1 one\nb2 two\n"));
        let captured = run_capture(&runner, "git", &["log"], Path::new("."));
        assert!(!captured.is_error());
        assert_eq!(captured.render(), "a1 one\nb2 two\n");
    }

    #[test]
    fn non_zero_exit_renders_error_line() {
        let runner = ScriptedRunner::new().respond(
            "git status",
            CommandOutput::failed(128, "fatal: not a git repository\n"),
        );
        let captured = run_capture(&runner, "git", &["status"], Path::new("."));
        assert_eq!(
            captured.render(),
            "ERROR: git status failed (exit 128): fatal: not a git repository\n"
        );
    }

    #[test]
    fn spawn_failure_renders_error_line() {
        let runner = ScriptedRunner::new();
        let captured = run_capture(&runner, "git", &["log"], Path::new("."));
        assert!(captured.is_error());
        assert!(captured.render().starts_with("ERROR: git log could not be started"));
    }
}
