//! Crude content flags derived by pattern matching.
//!
//! These are hints for a reader skimming the index, not an understanding of
//! the message.

use std::sync::LazyLock;

use regex_lite::Regex;

/// A line ending in a shell-prompt-like `% `, `$ ` or `# `.
static PROMPT_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)[%$#] $").ok());

/// True iff the content contains a triple-backtick fence.
pub fn has_code_block(content: &str) -> bool {
    content.contains("```")
}

/// True iff the content looks like pasted terminal output.
pub fn has_terminal_output(content: &str) -> bool {
    if content.contains("zsh:") {
        return true;
    }
    PROMPT_LINE
        .as_ref()
        .is_some_and(|prompt| prompt.is_match(content))
}
