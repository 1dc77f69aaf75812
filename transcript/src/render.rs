//! Canonical renderer.

use crate::format::{
    BEGIN_MARKER, CONTENT_LINE, CanonicalMeta, END_LINE, SOURCE_CHAT_INPUT, render_header,
};
use crate::message::Message;
use crate::parser::ParsedTranscript;

/// Render parser output as canonical transcript text.
///
/// Canonical blocks, including unindexed ones, are copied verbatim; a
/// fallback message gets a freshly
/// formatted block. Blocks are separated by a blank line and the text ends
/// with a newline.
pub fn render_canonical(parsed: &ParsedTranscript, meta: &CanonicalMeta) -> String {
    let mut out = render_header(meta);
    match parsed {
        ParsedTranscript::Canonical { blocks } => {
            if !blocks.is_empty() {
                let texts: Vec<&str> = blocks.iter().map(|block| block.text.as_str()).collect();
                out.push_str(&texts.join("\n\n"));
                out.push('\n');
            }
        }
        ParsedTranscript::Fallback { message } => {
            out.push_str(&render_block(message));
            out.push('\n');
        }
    }
    out
}

/// Format one message as a canonical block, without a trailing newline.
pub fn render_block(message: &Message) -> String {
    let ts = message.ts.as_deref().unwrap_or("null");
    let tags = render_tags(&message.tags);
    format!(
        "{BEGIN_MARKER}\n\
         id: {id}\n\
         ts: {ts}\n\
         role: {role}\n\
         tags: {tags}\n\
         source: {SOURCE_CHAT_INPUT}\n\
         {CONTENT_LINE}{content}{END_LINE}",
        id = message.id,
        role = message.role,
        content = message.content,
    )
}

/// `["a","b"]`, each tag JSON-quoted.
fn render_tags(tags: &[String]) -> String {
    let quoted: Vec<String> = tags
        .iter()
        .map(|tag| serde_json::Value::String(tag.clone()).to_string())
        .collect();
    format!("[{}]", quoted.join(","))
}
