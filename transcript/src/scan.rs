//! Marker scanning for canonical message blocks.
//!
//! Two readers share the marker grammar but end a block differently:
//!
//! - [`scan_blocks`] splits raw input. A block runs from `BEGIN` to the first
//!   `END` marker after it, wherever on the line that marker sits.
//! - [`FrameScanner`] walks canonical text and locates content regions. A
//!   region starts after the `CONTENT` line and stops before the next `END`
//!   marker that begins a line, so content may quote the marker mid-line.
//!
//! [`scan_blocks`] only calls a block a message when both readings agree on
//! where it ends. Rescanning the rendered blocks therefore yields exactly one
//! frame per message block and never joins two blocks into one.
//!
//! The frame scanner is an explicit state machine:
//!
//! ```text
//! SeekingBegin --BEGIN--> SeekingContent --CONTENT--> SeekingEnd --END line--> SeekingBegin
//!      |                        |                          |
//!   no BEGIN               END first: skip        no END line: halt
//!      v                   no END: halt                    v
//!   Finished                    v                       Finished
//!                            Finished
//! ```
//!
//! Anything stepped over without emitting a frame is recorded as a
//! [`DroppedSegment`] so callers can decide how loudly to report it.

use std::ops::Range;

use serde::Serialize;

use crate::format::{BEGIN_MARKER, CONTENT_LINE, END_LINE, END_MARKER};

/// Current position in the block grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    SeekingBegin,
    SeekingContent { begin: usize },
    SeekingEnd { begin: usize, content_start: usize },
    Finished,
}

/// Byte ranges of one well-formed block inside the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// From the first byte of `BEGIN` through the last byte of `END`.
    pub block: Range<usize>,
    /// Metadata lines between the `BEGIN` marker and the `CONTENT` line.
    pub header: Range<usize>,
    /// Verbatim content region.
    pub content: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropKind {
    /// Non-comment text before the first block.
    LeadingText,
    /// Text between two blocks.
    InterBlockText,
    /// Text after the last block.
    TrailingText,
    /// A `BEGIN ... END` span with no `CONTENT` line inside it. The parser
    /// keeps it verbatim; the index skips it.
    UnindexedBlock,
    /// A span whose `END` marker does not start its own line after the
    /// `CONTENT` line. Rescanning it would run on into the next block.
    MalformedBlock,
    /// A block that never reaches its `END` marker.
    Unterminated,
}

/// A span of input the scanner skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedSegment {
    pub kind: DropKind,
    pub byte_start: usize,
    pub byte_end: usize,
}

impl DroppedSegment {
    pub fn len(&self) -> usize {
        self.byte_end - self.byte_start
    }

    pub fn is_empty(&self) -> bool {
        self.byte_start == self.byte_end
    }
}

/// Collects skipped spans of one text.
struct DropLog<'a> {
    text: &'a str,
    dropped: Vec<DroppedSegment>,
}

impl<'a> DropLog<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            dropped: Vec::new(),
        }
    }

    fn record(&mut self, kind: DropKind, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        self.dropped.push(DroppedSegment {
            kind,
            byte_start: range.start,
            byte_end: range.end,
        });
    }

    /// Record text stepped over while looking for the next `BEGIN`.
    fn gap(&mut self, range: Range<usize>) {
        let gap = &self.text[range.clone()];
        if gap.trim().is_empty() {
            return;
        }
        let kind = if range.start == 0 {
            // A leading `#` header (such as our own) is not content.
            let commented = gap
                .lines()
                .filter(|line| !line.trim().is_empty())
                .all(|line| line.starts_with('#'));
            if commented {
                return;
            }
            DropKind::LeadingText
        } else if range.end == self.text.len() {
            DropKind::TrailingText
        } else {
            DropKind::InterBlockText
        };
        self.record(kind, range);
    }
}

/// Iterator over the [`Frame`]s of a text.
pub struct FrameScanner<'a> {
    text: &'a str,
    cursor: usize,
    state: ScanState,
    log: DropLog<'a>,
}

impl<'a> FrameScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            cursor: 0,
            state: ScanState::SeekingBegin,
            log: DropLog::new(text),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Segments skipped so far.
    pub fn dropped(&self) -> &[DroppedSegment] {
        &self.log.dropped
    }

    pub fn into_dropped(self) -> Vec<DroppedSegment> {
        self.log.dropped
    }

    fn step(&mut self) -> Option<Frame> {
        match self.state {
            ScanState::Finished => None,
            ScanState::SeekingBegin => {
                match find_from(self.text, self.cursor, BEGIN_MARKER) {
                    Some(begin) => {
                        self.log.gap(self.cursor..begin);
                        self.state = ScanState::SeekingContent { begin };
                    }
                    None => {
                        self.log.gap(self.cursor..self.text.len());
                        self.cursor = self.text.len();
                        self.state = ScanState::Finished;
                    }
                }
                None
            }
            ScanState::SeekingContent { begin } => {
                let after_begin = begin + BEGIN_MARKER.len();
                let content = find_from(self.text, after_begin, CONTENT_LINE);
                let end = find_from(self.text, after_begin, END_MARKER);
                match (content, end) {
                    (Some(c), Some(e)) if c < e => {
                        self.state = ScanState::SeekingEnd {
                            begin,
                            content_start: c + CONTENT_LINE.len(),
                        };
                    }
                    (Some(c), None) => {
                        self.state = ScanState::SeekingEnd {
                            begin,
                            content_start: c + CONTENT_LINE.len(),
                        };
                    }
                    (_, Some(e)) => {
                        let block_end = e + END_MARKER.len();
                        self.log.record(DropKind::UnindexedBlock, begin..block_end);
                        self.cursor = block_end;
                        self.state = ScanState::SeekingBegin;
                    }
                    (None, None) => {
                        self.log.record(DropKind::Unterminated, begin..self.text.len());
                        self.cursor = self.text.len();
                        self.state = ScanState::Finished;
                    }
                }
                None
            }
            ScanState::SeekingEnd {
                begin,
                content_start,
            } => {
                let Some(content_end) = find_from(self.text, content_start, END_LINE) else {
                    self.log.record(DropKind::Unterminated, begin..self.text.len());
                    self.cursor = self.text.len();
                    self.state = ScanState::Finished;
                    return None;
                };
                let block_end = content_end + END_LINE.len();
                self.cursor = block_end;
                self.state = ScanState::SeekingBegin;
                Some(Frame {
                    block: begin..block_end,
                    header: begin + BEGIN_MARKER.len()..content_start - CONTENT_LINE.len(),
                    content: content_start..content_end,
                })
            }
        }
    }
}

impl Iterator for FrameScanner<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        while self.state != ScanState::Finished {
            if let Some(frame) = self.step() {
                return Some(frame);
            }
        }
        None
    }
}

/// Scan a whole text, returning its frames and everything skipped.
pub fn scan_frames(text: &str) -> (Vec<Frame>, Vec<DroppedSegment>) {
    let mut scanner = FrameScanner::new(text);
    let frames: Vec<Frame> = scanner.by_ref().collect();
    (frames, scanner.into_dropped())
}

fn find_from(text: &str, from: usize, needle: &str) -> Option<usize> {
    text.get(from..)
        .and_then(|rest| rest.find(needle))
        .map(|offset| from + offset)
}

/// One `BEGIN ... END` span of raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    pub range: Range<usize>,
    /// False for a span with no `CONTENT` line: kept, but never indexed.
    pub is_message: bool,
}

/// Split raw input into its `BEGIN ... END` spans.
///
/// Message spans and spans without a `CONTENT` line are returned; malformed
/// spans, stray text, and an unterminated tail are reported as dropped.
pub fn scan_blocks(text: &str) -> (Vec<BlockSpan>, Vec<DroppedSegment>) {
    let mut log = DropLog::new(text);
    let mut spans = Vec::new();
    let mut cursor = 0;
    while let Some(begin) = find_from(text, cursor, BEGIN_MARKER) {
        log.gap(cursor..begin);
        let Some(end) = find_from(text, begin + BEGIN_MARKER.len(), END_MARKER) else {
            log.record(DropKind::Unterminated, begin..text.len());
            return (spans, log.dropped);
        };
        let range = begin..end + END_MARKER.len();
        cursor = range.end;
        match span_kind(&text[range.clone()]) {
            None => spans.push(BlockSpan {
                range,
                is_message: true,
            }),
            Some(DropKind::UnindexedBlock) => {
                log.record(DropKind::UnindexedBlock, range.clone());
                spans.push(BlockSpan {
                    range,
                    is_message: false,
                });
            }
            Some(kind) => log.record(kind, range),
        }
    }
    log.gap(cursor..text.len());
    (spans, log.dropped)
}

/// `None` for a well-formed message span, otherwise how to report it.
fn span_kind(span: &str) -> Option<DropKind> {
    let Some(content) = span.find(CONTENT_LINE) else {
        return Some(DropKind::UnindexedBlock);
    };
    let content_start = content + CONTENT_LINE.len();
    let end_line = span.len().saturating_sub(END_LINE.len());
    if span.ends_with(END_LINE) && end_line >= content_start {
        None
    } else {
        Some(DropKind::MalformedBlock)
    }
}
