//! Message and index entry types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::flags;
use crate::hash::sha256_str;

/// Tag attached to a message synthesized from unstructured input.
pub const UNPARSED_TAG: &str = "unparsed";

/// Role given to a synthesized message and to blocks that omit `role:`.
pub const DEFAULT_ROLE: &str = "user";

/// 1-based message sequence number, rendered as six zero-padded digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u32);

impl MessageId {
    pub const FIRST: MessageId = MessageId(1);

    pub fn new(seq: u32) -> Self {
        Self(seq)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl Serialize for MessageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u32>()
            .map(MessageId)
            .map_err(|e| serde::de::Error::custom(format!("invalid message id {raw:?}: {e}")))
    }
}

/// Reserved mention lists. Always empty today.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mentions {
    #[serde(rename = "files_mentioned", default)]
    pub files: Vec<String>,
    #[serde(rename = "commits_mentioned", default)]
    pub commits: Vec<String>,
    #[serde(rename = "commands_mentioned", default)]
    pub commands: Vec<String>,
}

/// A message as produced by the parser. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub ts: Option<String>,
    pub role: String,
    pub tags: Vec<String>,
    pub has_code_block: bool,
    pub has_terminal_output: bool,
    pub mentions: Mentions,
    pub content: String,
    /// Digest of `content`, computed when the message is built.
    pub sha256: String,
}

impl Message {
    pub fn new(
        id: MessageId,
        ts: Option<String>,
        role: impl Into<String>,
        tags: Vec<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            id,
            ts,
            role: role.into(),
            tags,
            has_code_block: flags::has_code_block(&content),
            has_terminal_output: flags::has_terminal_output(&content),
            mentions: Mentions::default(),
            sha256: sha256_str(&content),
            content,
        }
    }

    /// The single message that wraps input with no recognizable structure.
    pub fn unparsed(raw: &str) -> Self {
        Self::new(
            MessageId::FIRST,
            None,
            DEFAULT_ROLE,
            vec![UNPARSED_TAG.to_string()],
            raw,
        )
    }
}

/// Persisted view of one message: where its content lives and what it hashes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageIndexEntry {
    pub id: MessageId,
    pub ts: Option<String>,
    pub role: String,
    /// Inclusive start, in bytes of the canonical text's UTF-8 encoding.
    pub byte_start: usize,
    /// Exclusive end.
    pub byte_end: usize,
    pub sha256: String,
    pub tags: Vec<String>,
    pub has_code_block: bool,
    pub has_terminal_output: bool,
    #[serde(flatten)]
    pub mentions: Mentions,
}

impl MessageIndexEntry {
    pub fn byte_len(&self) -> usize {
        self.byte_end.saturating_sub(self.byte_start)
    }
}
