//! Completion providers for the Dolphin editor.
//!
//! Every provider implements [`CompletionProvider`] and decides for itself,
//! from the classified [`CompletionContext`], whether it has anything to
//! offer. Hosts register providers through the
//! [`LanguageRegistry`](crate::host::LanguageRegistry) and ask all of them on
//! every completion request.

mod catalog;
mod providers;

pub use catalog::{CatalogTool, ToolCatalog, ToolOption, Toolbox, BUILT_IN_AGENT_ID, BUILT_IN_AGENT_NAME};
pub use providers::{BlockVariableProvider, CallToolProvider, ImportToolProvider, KeywordProvider};

use crate::context::{classify, CompletionContext};
use crate::text::{self, Position, Range, WordAtPosition};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ITEMS
// ============================================================================

/// Icon class of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionItemKind {
    Keyword,
    Variable,
    Function,
    Folder,
}

/// One suggestion returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
    pub label: String,
    /// Secondary label text shown next to `label`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub insert_text: String,
    pub kind: CompletionItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Text replaced when the item is accepted.
    pub range: Range,
    /// Ordering key; hosts sort by it instead of by label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_text: Option<String>,
}

// ============================================================================
// PROVIDERS
// ============================================================================

/// The provider slots an editor manages. At most one live registration per
/// kind exists for an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    BlockVariable,
    CallTool,
    Keyword,
    ImportTool,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::BlockVariable,
        ProviderKind::CallTool,
        ProviderKind::Keyword,
        ProviderKind::ImportTool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::BlockVariable => "block-variable",
            ProviderKind::CallTool => "call-tool",
            ProviderKind::Keyword => "keyword",
            ProviderKind::ImportTool => "import-tool",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a provider needs to know about the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub position: Position,
    pub line_content: String,
    pub before_cursor: String,
    pub word: WordAtPosition,
    pub context: CompletionContext,
}

impl CompletionRequest {
    /// Build a request for the cursor at `position` on `line_content`.
    pub fn new(line_content: impl Into<String>, position: Position) -> Self {
        let line_content = line_content.into();
        let before_cursor = text::before_column(&line_content, position.column).to_string();
        let word = text::word_until_position(&line_content, position.column);
        let context = classify(&before_cursor, &line_content);
        Self {
            position,
            line_content,
            before_cursor,
            word,
            context,
        }
    }

    /// Word start to cursor on the cursor line.
    pub fn word_range(&self) -> Range {
        Range::on_line(self.position.line, self.word.start_column, self.position.column)
    }
}

/// A registered suggestion source.
pub trait CompletionProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Suggestions for the request; empty when the provider does not apply.
    fn provide(&self, request: &CompletionRequest) -> Vec<CompletionItem>;
}

/// Sort key for the `index`-th of `count` items: `a`, `b`, ... and fixed-width
/// base-26 keys once there are more than 26 items, so lexical order always
/// equals caller order.
pub fn sort_key(index: usize, count: usize) -> String {
    let mut width = 1;
    let mut capacity = 26usize;
    while capacity < count {
        width += 1;
        capacity = capacity.saturating_mul(26);
    }

    let mut digits = vec![b'a'; width];
    let mut rest = index;
    for slot in digits.iter_mut().rev() {
        *slot = b'a' + (rest % 26) as u8;
        rest /= 26;
    }
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ToolTrigger;

    #[test]
    fn test_sort_keys_short_lists() {
        let keys: Vec<String> = (0..3).map(|i| sort_key(i, 3)).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(sort_key(25, 26), "z");
    }

    #[test]
    fn test_sort_keys_stay_ordered_past_26() {
        let keys: Vec<String> = (0..60).map(|i| sort_key(i, 60)).collect();
        assert_eq!(keys[0], "aa");
        assert_eq!(keys[26], "ba");
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(sorted, keys);
    }

    #[test]
    fn test_request_from_line() {
        let request = CompletionRequest::new("call @", Position::new(3, 7));
        assert_eq!(request.before_cursor, "call @");
        assert_eq!(request.context, CompletionContext::ToolCallAt(ToolTrigger::At));
        assert_eq!(request.word_range(), Range::on_line(3, 7, 7));
    }

    #[test]
    fn test_request_cursor_mid_line() {
        let request = CompletionRequest::new("say $na rest", Position::new(1, 8));
        assert_eq!(request.before_cursor, "say $na");
        assert_eq!(request.word.word, "na");
        assert_eq!(request.word_range(), Range::on_line(1, 6, 8));
        assert_eq!(request.context, CompletionContext::KeywordDefault);
    }
}
