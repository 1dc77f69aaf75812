//! Canonical chat transcripts with byte-exact content addressing.
//!
//! Pipeline: raw input → [`parse_transcript`] → [`render_canonical`] →
//! [`build_index`]. Every index entry points at a byte range of the canonical
//! text and stores the SHA-256 of exactly those bytes; [`extract_bytes`] is
//! the one function that resolves a range back to bytes, for both the index
//! builder and any later verifier.

mod error;
mod extract;
mod flags;
mod format;
mod hash;
mod index;
mod message;
mod parser;
mod render;
mod scan;

pub use error::{Result, TranscriptError};
pub use extract::{extract_bytes, extract_content};
pub use flags::{has_code_block, has_terminal_output};
pub use format::{
    BEGIN_MARKER, CONTENT_LINE, CONTENT_MARKER, CanonicalMeta, END_LINE, END_MARKER,
    SOURCE_CHAT_INPUT, TRANSCRIPT_SCHEMA, render_header,
};
pub use hash::{sha256_bytes, sha256_file, sha256_str};
pub use index::{ChatIndex, INDEX_SCHEMA_VERSION, build_index};
pub use message::{DEFAULT_ROLE, Mentions, Message, MessageId, MessageIndexEntry, UNPARSED_TAG};
pub use parser::{
    DroppedSummary, ParseOutcome, ParsedTranscript, RawBlock, has_canonical_markers,
    parse_transcript,
};
pub use render::{render_block, render_canonical};
pub use scan::{
    BlockSpan, DropKind, DroppedSegment, Frame, FrameScanner, ScanState, scan_blocks, scan_frames,
};

/// Canonical text, its index, and what parsing had to drop.
#[derive(Debug, Clone)]
pub struct Canonicalized {
    pub text: String,
    pub index: ChatIndex,
    pub parsed: ParseOutcome,
}

/// Parse, render and index raw chat input in one step.
pub fn canonicalize(raw: &str, meta: &CanonicalMeta) -> Result<Canonicalized> {
    let parsed = parse_transcript(raw);
    let text = render_canonical(&parsed.transcript, meta);
    let index = build_index(&text, meta)?;

    if index.message_count != parsed.transcript.message_count() {
        tracing::warn!(
            parsed = parsed.transcript.message_count(),
            indexed = index.message_count,
            "indexed message count differs from parsed block count"
        );
    }

    Ok(Canonicalized {
        text,
        index,
        parsed,
    })
}
