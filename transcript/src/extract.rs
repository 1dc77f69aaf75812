//! Content extraction by byte range.
//!
//! This is the only place that turns an index entry back into content bytes.
//! The index builder hashes what it returns, and so does the verifier.

use std::borrow::Cow;

use crate::error::{Result, TranscriptError};
use crate::message::MessageIndexEntry;

/// Return exactly the bytes `[byte_start, byte_end)` of the canonical text.
pub fn extract_bytes<'a>(canonical: &'a [u8], entry: &MessageIndexEntry) -> Result<&'a [u8]> {
    if entry.byte_start > entry.byte_end {
        return Err(TranscriptError::InvertedByteRange {
            id: entry.id,
            start: entry.byte_start,
            end: entry.byte_end,
        });
    }
    canonical
        .get(entry.byte_start..entry.byte_end)
        .ok_or_else(|| TranscriptError::ByteRangeOutOfBounds {
            id: entry.id,
            start: entry.byte_start,
            end: entry.byte_end,
            len: canonical.len(),
        })
}

/// Extract an entry's content decoded as UTF-8.
///
/// Invalid sequences (a tampered file, or a range that splits a character)
/// are replaced with U+FFFD; hash [`extract_bytes`] instead when integrity
/// matters.
pub fn extract_content<'a>(canonical: &'a [u8], entry: &MessageIndexEntry) -> Result<Cow<'a, str>> {
    extract_bytes(canonical, entry).map(String::from_utf8_lossy)
}
