//! Chat index builder.
//!
//! The index is derived from canonical text alone: every byte range and
//! digest is recomputed from the text, never carried over from the parser.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::extract_bytes;
use crate::flags;
use crate::format::CanonicalMeta;
use crate::hash::sha256_bytes;
use crate::message::{DEFAULT_ROLE, Mentions, MessageId, MessageIndexEntry};
use crate::scan::FrameScanner;

pub const INDEX_SCHEMA_VERSION: &str = "chat_index_v1";

/// JSON side-file listing each message's byte range and digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatIndex {
    pub schema_version: String,
    pub created_at: String,
    pub timezone: String,
    pub message_count: usize,
    pub messages: Vec<MessageIndexEntry>,
}

impl ChatIndex {
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `message_count` agrees with the number of entries.
    pub fn count_is_consistent(&self) -> bool {
        self.message_count == self.messages.len()
    }
}

/// Metadata lines read back from a block header.
#[derive(Debug, Default, PartialEq, Eq)]
struct BlockMeta {
    ts: Option<String>,
    role: Option<String>,
    tags: Vec<String>,
}

fn parse_block_meta(header: &str) -> BlockMeta {
    let mut meta = BlockMeta::default();
    for line in header.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "ts" => {
                meta.ts = match value {
                    "" | "null" => None,
                    ts => Some(ts.to_string()),
                };
            }
            "role" if !value.is_empty() => meta.role = Some(value.to_string()),
            "tags" => meta.tags = serde_json::from_str(value).unwrap_or_default(),
            // `id` is renumbered and `source` is fixed; neither is carried over.
            _ => {}
        }
    }
    meta
}

/// Build the index for canonical text rendered with `meta`.
///
/// Ids are assigned densely from 1 regardless of ids written in the text.
pub fn build_index(canonical: &str, meta: &CanonicalMeta) -> Result<ChatIndex> {
    let bytes = canonical.as_bytes();
    let mut scanner = FrameScanner::new(canonical);
    let mut messages = Vec::new();
    let mut next_id = MessageId::FIRST;

    for frame in scanner.by_ref() {
        let block_meta = parse_block_meta(&canonical[frame.header.clone()]);
        let content = &canonical[frame.content.clone()];
        let mut entry = MessageIndexEntry {
            id: next_id,
            ts: block_meta.ts,
            role: block_meta.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            byte_start: frame.content.start,
            byte_end: frame.content.end,
            sha256: String::new(),
            tags: block_meta.tags,
            has_code_block: flags::has_code_block(content),
            has_terminal_output: flags::has_terminal_output(content),
            mentions: Mentions::default(),
        };
        entry.sha256 = sha256_bytes(extract_bytes(bytes, &entry)?);
        messages.push(entry);
        next_id = next_id.next();
    }

    for segment in scanner.dropped() {
        tracing::warn!(
            kind = ?segment.kind,
            byte_start = segment.byte_start,
            byte_end = segment.byte_end,
            "canonical text contains content outside indexed blocks"
        );
    }
    tracing::debug!(message_count = messages.len(), "built chat index");

    Ok(ChatIndex {
        schema_version: INDEX_SCHEMA_VERSION.to_string(),
        created_at: meta.created_at.clone(),
        timezone: meta.timezone.clone(),
        message_count: messages.len(),
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_content;
    use crate::format::{BEGIN_MARKER, CONTENT_LINE, END_LINE, render_header};
    use pretty_assertions::assert_eq;

    fn meta() -> CanonicalMeta {
        CanonicalMeta::new("2026-01-15T12:00:00Z", "UTC")
    }

    fn block(id: &str, extra: &str, content: &str) -> String {
        format!("{BEGIN_MARKER}\nid: {id}\n{extra}source: chat_input\n{CONTENT_LINE}{content}{END_LINE}")
    }

    #[test]
    fn metadata_is_read_back_from_block_header() {
        let text = format!(
            "{}{}\n",
            render_header(&meta()),
            block(
                "000001",
                "ts: 2026-01-15T11:59:00Z\nrole: assistant\ntags: [\"plan\",\"plan\"]\n",
                "hi"
            )
        );
        let index = build_index(&text, &meta()).unwrap();
        let entry = &index.messages[0];
        assert_eq!(entry.ts.as_deref(), Some("2026-01-15T11:59:00Z"));
        assert_eq!(entry.role, "assistant");
        assert_eq!(entry.tags, vec!["plan".to_string(), "plan".to_string()]);
    }

    #[test]
    fn missing_or_malformed_metadata_uses_defaults() {
        let text = block("000001", "ts: null\ntags: not json\n", "hi");
        let index = build_index(&text, &meta()).unwrap();
        let entry = &index.messages[0];
        assert_eq!(entry.ts, None);
        assert_eq!(entry.role, "user");
        assert!(entry.tags.is_empty());
    }

    #[test]
    fn ids_are_renumbered_densely() {
        let text = format!(
            "{}\n\n{}\n\n{}\n",
            block("000007", "", "a"),
            block("000007", "", "b"),
            block("000042", "", "c")
        );
        let index = build_index(&text, &meta()).unwrap();
        let ids: Vec<String> = index.messages.iter().map(|m| m.id.to_string()).collect();
        assert_eq!(ids, vec!["000001", "000002", "000003"]);
    }

    #[test]
    fn header_fields_come_from_meta() {
        let index = build_index("", &meta()).unwrap();
        assert_eq!(index.schema_version, "chat_index_v1");
        assert_eq!(index.created_at, "2026-01-15T12:00:00Z");
        assert_eq!(index.timezone, "UTC");
        assert_eq!(index.message_count, 0);
        assert!(index.count_is_consistent());
    }

    #[test]
    fn flags_are_derived_from_content() {
        let text = format!(
            "{}\n\n{}",
            block("1", "", "```sh\nls\n```"),
            block("2", "", "me@box % \nzsh: no matches found")
        );
        let index = build_index(&text, &meta()).unwrap();
        assert!(index.messages[0].has_code_block);
        assert!(!index.messages[0].has_terminal_output);
        assert!(!index.messages[1].has_code_block);
        assert!(index.messages[1].has_terminal_output);
    }

    #[test]
    fn byte_offsets_count_encoded_bytes() {
        let text = format!("# ünïcödé header\n\n{}", block("1", "", "日本語 ok"));
        let index = build_index(&text, &meta()).unwrap();
        let entry = &index.messages[0];
        let char_start = text[..entry.byte_start].chars().count();
        assert!(char_start < entry.byte_start);
        assert_eq!(
            extract_content(text.as_bytes(), entry).unwrap(),
            "日本語 ok"
        );
        assert_eq!(entry.byte_len(), "日本語 ok".len());
    }

    #[test]
    fn index_json_round_trips() {
        let text = block("1", "role: user\n", "hello");
        let index = build_index(&text, &meta()).unwrap();
        let json = index.to_json_pretty().unwrap();
        assert!(json.ends_with("}\n"));
        assert_eq!(ChatIndex::from_json(&json).unwrap(), index);
    }
}
