//! Error types for transcript operations

use thiserror::Error;

use crate::message::MessageId;

pub type Result<T> = std::result::Result<T, TranscriptError>;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("message {id}: byte range {start}..{end} is inverted")]
    InvertedByteRange {
        id: MessageId,
        start: usize,
        end: usize,
    },

    #[error("message {id}: byte range {start}..{end} exceeds canonical text length {len}")]
    ByteRangeOutOfBounds {
        id: MessageId,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("chat index JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
