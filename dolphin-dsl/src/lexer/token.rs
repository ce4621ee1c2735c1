//! Lexer token types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highlighting categories produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenCategory {
    Comment,
    Variable,
    Keyword,
    String,
    Number,
    Delimiter,
    CallFunction,
    ToolsFunction,
    PlainText,
}

impl TokenCategory {
    pub const ALL: [TokenCategory; 9] = [
        TokenCategory::Comment,
        TokenCategory::Variable,
        TokenCategory::Keyword,
        TokenCategory::String,
        TokenCategory::Number,
        TokenCategory::Delimiter,
        TokenCategory::CallFunction,
        TokenCategory::ToolsFunction,
        TokenCategory::PlainText,
    ];

    /// The token name hosts use for theme lookups.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenCategory::Comment => "comment",
            TokenCategory::Variable => "variable",
            TokenCategory::Keyword => "keyword",
            TokenCategory::String => "string",
            TokenCategory::Number => "number",
            TokenCategory::Delimiter => "delimiter",
            TokenCategory::CallFunction => "call-function",
            TokenCategory::ToolsFunction => "tools-function",
            TokenCategory::PlainText => "plain-text",
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source location span. `start`/`end` are byte offsets within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A classified slice of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub category: TokenCategory,
    pub text: String,
    pub span: Span,
}
