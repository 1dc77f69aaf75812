//! Error types for pack assembly and verification

use std::path::PathBuf;

use handoff_transcript::TranscriptError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PackError>;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("staging file {path} was already written by an earlier step")]
    StagingConflict { path: String },

    #[error("invalid staging path {path:?}: must be relative without `..`")]
    InvalidStagingPath { path: String },

    #[error("zip error on {path}: {source}")]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

impl PackError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PackError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        PackError::Zip {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        PackError::Config {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PackError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
