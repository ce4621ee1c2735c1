//! Grammar configuration for the Dolphin language.
//!
//! One [`DslGrammarConfig`] holds the keyword table, the ordered highlighting
//! rules and the patterns the extractor and validator use. Build it once
//! (usually [`DslGrammarConfig::shared`]) and hand the `Arc` to every component.

mod rules;

pub use rules::TokenRule;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Language id the Dolphin services register under.
pub const LANGUAGE_ID: &str = "dolphin";

/// Reserved words of the Dolphin language, in completion order.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "if/",
    "elif",
    "else:",
    "end/",
    "for/",
    "in",
    "tools",
    "system_prompt",
];

/// Line comment prefix.
pub const LINE_COMMENT: &str = "#";

/// Bracket pairs the editor matches.
pub const BRACKETS: &[(char, char)] = &[('{', '}'), ('[', ']'), ('(', ')')];

/// Pairs the editor auto-closes, quotes included.
pub const AUTO_CLOSING_PAIRS: &[(char, char)] = &[
    ('{', '}'),
    ('[', ']'),
    ('(', ')'),
    ('"', '"'),
    ('\'', '\''),
];

static SHARED: Lazy<Arc<DslGrammarConfig>> = Lazy::new(|| {
    Arc::new(DslGrammarConfig::new(default_keywords()).expect("default Dolphin grammar compiles"))
});

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised while building a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("keyword list must not be empty")]
    EmptyKeywords,

    #[error("invalid keyword '{label}': keywords must be non-empty and contain no whitespace")]
    InvalidKeyword { label: String },

    #[error("duplicate keyword '{label}'")]
    DuplicateKeyword { label: String },

    #[error("failed to compile {name} pattern: {source}")]
    Pattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}

pub type GrammarResult<T> = Result<T, GrammarError>;

// ============================================================================
// KEYWORDS
// ============================================================================

/// A reserved word, as offered by keyword completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyword {
    pub label: String,
    pub insert_text: String,
}

impl Keyword {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
        }
    }
}

pub fn default_keywords() -> Vec<Keyword> {
    DEFAULT_KEYWORDS.iter().map(|label| Keyword::new(*label)).collect()
}

// ============================================================================
// PATTERNS
// ============================================================================

/// Patterns shared by the extractor and the validator.
#[derive(Debug, Clone)]
pub struct GrammarPatterns {
    /// `->` or `>>` followed by a bound name (group 1).
    pub binding: Regex,
    /// Valid variable identifier.
    pub identifier: Regex,
    /// A line commented out with `#` (leading whitespace allowed).
    pub comment_line: Regex,
    /// `$name` reference (group 1).
    pub variable_ref: Regex,
    /// `@name(args)` call (group 1 = name).
    pub call_function: Regex,
    /// `tools=[...]` literal (group 1 = contents).
    pub tools_literal: Regex,
}

impl GrammarPatterns {
    fn compile() -> GrammarResult<Self> {
        Ok(Self {
            binding: compile("binding", r"(?:->|>>)\s*([^\s]+)")?,
            identifier: compile("identifier", r"^[A-Za-z_][A-Za-z0-9_]*$")?,
            comment_line: compile("comment line", r"^\s*#")?,
            variable_ref: compile("variable reference", r"\$([A-Za-z_][A-Za-z0-9_]*)")?,
            call_function: compile("call function", r"@([^\s(]+)\([^)]*\)")?,
            tools_literal: compile("tools literal", r"tools=\[([^\]]*)\]")?,
        })
    }
}

pub(crate) fn compile(name: &'static str, pattern: &str) -> GrammarResult<Regex> {
    Regex::new(pattern).map_err(|source| GrammarError::Pattern { name, source })
}

// ============================================================================
// GRAMMAR CONFIG
// ============================================================================

/// Keyword table, highlighting rules and shared patterns.
#[derive(Debug, Clone)]
pub struct DslGrammarConfig {
    keywords: Vec<Keyword>,
    rules: Vec<TokenRule>,
    patterns: GrammarPatterns,
}

impl DslGrammarConfig {
    /// Build a grammar around a keyword table.
    pub fn new(keywords: Vec<Keyword>) -> GrammarResult<Self> {
        if keywords.is_empty() {
            return Err(GrammarError::EmptyKeywords);
        }
        for (idx, keyword) in keywords.iter().enumerate() {
            if keyword.label.is_empty() || keyword.label.chars().any(char::is_whitespace) {
                return Err(GrammarError::InvalidKeyword {
                    label: keyword.label.clone(),
                });
            }
            if keywords[..idx].iter().any(|k| k.label == keyword.label) {
                return Err(GrammarError::DuplicateKeyword {
                    label: keyword.label.clone(),
                });
            }
        }

        let rules = rules::default_rules(&keywords)?;
        let patterns = GrammarPatterns::compile()?;
        Ok(Self {
            keywords,
            rules,
            patterns,
        })
    }

    /// Grammar with only the given keyword labels. Handy for tests.
    pub fn with_keywords<I, S>(labels: I) -> GrammarResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(labels.into_iter().map(Keyword::new).collect())
    }

    /// The process-wide default grammar.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.iter().any(|k| k.label == word)
    }

    pub fn rules(&self) -> &[TokenRule] {
        &self.rules
    }

    pub fn patterns(&self) -> &GrammarPatterns {
        &self.patterns
    }

    pub fn is_comment_line(&self, line: &str) -> bool {
        self.patterns.comment_line.is_match(line)
    }

    pub fn is_valid_identifier(&self, name: &str) -> bool {
        self.patterns.identifier.is_match(name)
    }

    pub fn auto_closing_pairs(&self) -> &'static [(char, char)] {
        AUTO_CLOSING_PAIRS
    }
}

impl Default for DslGrammarConfig {
    fn default() -> Self {
        (*Self::shared()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grammar_keywords() {
        let grammar = DslGrammarConfig::shared();
        let labels: Vec<&str> = grammar.keywords().iter().map(|k| k.label.as_str()).collect();
        assert_eq!(labels, DEFAULT_KEYWORDS);
        assert!(grammar.is_keyword("tools"));
        assert!(grammar.is_keyword("else:"));
        assert!(!grammar.is_keyword("else"));
    }

    #[test]
    fn test_rejects_bad_keyword_tables() {
        assert!(matches!(
            DslGrammarConfig::new(Vec::new()),
            Err(GrammarError::EmptyKeywords)
        ));
        assert!(matches!(
            DslGrammarConfig::with_keywords(["two words"]),
            Err(GrammarError::InvalidKeyword { .. })
        ));
        assert!(matches!(
            DslGrammarConfig::with_keywords(["in", "in"]),
            Err(GrammarError::DuplicateKeyword { .. })
        ));
    }

    #[test]
    fn test_identifier_pattern() {
        let grammar = DslGrammarConfig::shared();
        assert!(grammar.is_valid_identifier("_abc1"));
        assert!(grammar.is_valid_identifier("answer"));
        assert!(!grammar.is_valid_identifier("1abc"));
        assert!(!grammar.is_valid_identifier("a-b"));
        assert!(!grammar.is_valid_identifier("变量"));
    }

    #[test]
    fn test_comment_line_allows_indent() {
        let grammar = DslGrammarConfig::shared();
        assert!(grammar.is_comment_line("# note"));
        assert!(grammar.is_comment_line("   # note"));
        assert!(!grammar.is_comment_line("a # note"));
    }
}
