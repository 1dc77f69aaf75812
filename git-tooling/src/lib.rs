//! Repository and environment capture for handoff packs.
//!
//! Every function here takes a [`CommandRunner`] and never fails: command
//! errors come back as values that render to inline `ERROR: ...` text or
//! `(unavailable)`, so a pack can still be built without git or a shell.

mod capture;
mod environment;
mod git;
mod runner;

pub use capture::{CaptureError, Captured, run_capture};
pub use environment::{EnvironmentSnapshot, Probe, UNAVAILABLE, capture_environment};
pub use git::{capture_git_log, capture_git_status};
pub use runner::{CommandOutput, CommandRunner, ScriptedRunner, SystemCommandRunner, command_line};
