//! Canonical transcript wire format.
//!
//! ```text
//! # handoff_chat_v1
//! # encoding: utf-8
//! # newline: \n
//! # created_at: 2026-01-15T12:00:00Z
//! # timezone: UTC
//! # Message content between <<<CONTENT>>> and <<<END_MESSAGE>>> is verbatim. Do not edit.
//!
//! <<<BEGIN_MESSAGE>>>
//! id: 000001
//! ts: null
//! role: user
//! tags: ["unparsed"]
//! source: chat_input
//! <<<CONTENT>>>
//! hello
//! <<<END_MESSAGE>>>
//! ```

pub const BEGIN_MARKER: &str = "<<<BEGIN_MESSAGE>>>";
pub const CONTENT_MARKER: &str = "<<<CONTENT>>>";
pub const END_MARKER: &str = "<<<END_MESSAGE>>>";

/// Content marker including its trailing newline; the content region starts
/// right after it.
pub const CONTENT_LINE: &str = "<<<CONTENT>>>\n";

/// End marker including the newline that precedes it; the content region
/// stops right before it.
pub const END_LINE: &str = "\n<<<END_MESSAGE>>>";

/// Schema tag written as the first header line.
pub const TRANSCRIPT_SCHEMA: &str = "handoff_chat_v1";

/// Fixed `source:` value for every rendered block.
pub const SOURCE_CHAT_INPUT: &str = "chat_input";

/// Creation metadata shared by the renderer and the index builder.
///
/// The same value must be passed to both so the header and the index agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMeta {
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Free-form timezone label (e.g. `UTC`, `America/Chicago`).
    pub timezone: String,
}

impl CanonicalMeta {
    pub fn new(created_at: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            created_at: created_at.into(),
            timezone: timezone.into(),
        }
    }
}

/// Render the `#`-comment header, including the blank separator line.
pub fn render_header(meta: &CanonicalMeta) -> String {
    format!(
        "# {TRANSCRIPT_SCHEMA}\n\
         # encoding: utf-8\n\
         # newline: \\n\n\
         # created_at: {}\n\
         # timezone: {}\n\
         # Message content between {CONTENT_MARKER} and {END_MARKER} is verbatim. Do not edit.\n\
         \n",
        meta.created_at, meta.timezone
    )
}
