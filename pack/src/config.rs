//! Pack configuration loading
//!
//! Loads configuration from `~/.config/handoff/handoff.toml` (or the path in
//! `HANDOFF_CONFIG`). Every field is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PackError, Result};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PackConfig {
    /// Timezone label written to the transcript header and index
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Number of commits captured by `git log`
    #[serde(default = "default_git_log_limit")]
    pub git_log_limit: usize,

    /// Shell probed for the environment snapshot
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_git_log_limit() -> usize {
    20
}

fn default_shell() -> String {
    "zsh".to_string()
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            git_log_limit: default_git_log_limit(),
            shell: default_shell(),
        }
    }
}

impl PackConfig {
    /// Environment variable for config path override
    pub const ENV_CONFIG_PATH: &'static str = "HANDOFF_CONFIG";

    pub const DEFAULT_CONFIG_FILENAME: &'static str = "handoff.toml";

    /// Load configuration from `HANDOFF_CONFIG`, then
    /// `~/.config/handoff/handoff.toml`; defaults when neither exists.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::resolve_config_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "handoff config not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PackError::config_with_source(format!("failed to read config at {}", path.display()), e)
        })?;

        tracing::debug!(path = %path.display(), "loaded handoff config");
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: PackConfig = toml::from_str(contents)
            .map_err(|e| PackError::config_with_source("failed to parse config", e))?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timezone.trim().is_empty() {
            return Err(PackError::config("timezone must not be empty"));
        }
        if self.git_log_limit == 0 {
            return Err(PackError::config("git_log_limit must be at least 1"));
        }
        if self.shell.trim().is_empty() {
            return Err(PackError::config("shell must not be empty"));
        }
        Ok(())
    }

    fn resolve_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return Some(PathBuf::from(path));
        }

        dirs::home_dir().map(|h| {
            h.join(".config")
                .join("handoff")
                .join(Self::DEFAULT_CONFIG_FILENAME)
        })
    }
}
