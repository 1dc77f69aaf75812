//! Transcript parser.
//!
//! Raw input is either a sequence of canonical message blocks, kept byte for
//! byte, or anything else, which is wrapped whole as one unparsed message.
//! Input with markers but no well-formed message block counts as anything
//! else. Parsing never fails.

use serde::Serialize;

use crate::format::{BEGIN_MARKER, END_LINE, END_MARKER};
use crate::message::Message;
use crate::scan::{DroppedSegment, scan_blocks};

/// One verbatim `BEGIN ... END` span of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub text: String,
    /// False for a span with no `CONTENT` line, which is rendered but not
    /// indexed.
    pub is_message: bool,
}

impl RawBlock {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_message: true,
        }
    }
}

/// Parser output, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTranscript {
    /// Verbatim `BEGIN ... END` blocks, in input order.
    Canonical { blocks: Vec<RawBlock> },
    /// The whole input as a single synthesized message.
    Fallback { message: Message },
}

impl ParsedTranscript {
    /// Number of messages the rendered transcript will contain.
    pub fn message_count(&self) -> usize {
        match self {
            ParsedTranscript::Canonical { blocks } => {
                blocks.iter().filter(|block| block.is_message).count()
            }
            ParsedTranscript::Fallback { .. } => 1,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedTranscript::Fallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub transcript: ParsedTranscript,
    /// Input the canonical path skipped or left unindexed. Always empty for
    /// the fallback path.
    pub dropped: Vec<DroppedSegment>,
}

/// Summary of skipped input, suitable for reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DroppedSummary {
    pub segments: usize,
    pub bytes: usize,
}

impl DroppedSummary {
    pub fn of(dropped: &[DroppedSegment]) -> Self {
        Self {
            segments: dropped.len(),
            bytes: dropped.iter().map(DroppedSegment::len).sum(),
        }
    }
}

impl ParseOutcome {
    pub fn dropped_summary(&self) -> DroppedSummary {
        DroppedSummary::of(&self.dropped)
    }
}

/// True when the input carries both framing markers somewhere.
pub fn has_canonical_markers(raw: &str) -> bool {
    raw.contains(BEGIN_MARKER) && raw.contains(END_MARKER)
}

/// Parse raw chat input.
pub fn parse_transcript(raw: &str) -> ParseOutcome {
    if has_canonical_markers(raw) {
        let (spans, dropped) = scan_blocks(raw);
        if spans.iter().any(|span| span.is_message) {
            for segment in &dropped {
                tracing::warn!(
                    kind = ?segment.kind,
                    byte_start = segment.byte_start,
                    byte_end = segment.byte_end,
                    "chat input outside indexed message blocks"
                );
            }
            let blocks: Vec<RawBlock> = spans
                .into_iter()
                .map(|span| RawBlock {
                    text: raw[span.range].to_string(),
                    is_message: span.is_message,
                })
                .collect();
            tracing::debug!(blocks = blocks.len(), "parsed canonical message blocks");
            return ParseOutcome {
                transcript: ParsedTranscript::Canonical { blocks },
                dropped,
            };
        }
        tracing::warn!(
            skipped = dropped.len(),
            "chat input has message markers but no well-formed block, wrapping it whole"
        );
    }

    if raw.contains(END_LINE) {
        tracing::warn!(
            "unstructured chat input contains an end-of-message line; its indexed content will be truncated"
        );
    }
    tracing::debug!(bytes = raw.len(), "wrapping chat input as one message");
    ParseOutcome {
        transcript: ParsedTranscript::Fallback {
            message: Message::unparsed(raw),
        },
        dropped: Vec::new(),
    }
}
