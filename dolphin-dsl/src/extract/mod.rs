//! Variable extraction.
//!
//! Finds the names bound with `->` or `>>` so completion can offer them and the
//! embedding layer can reference them elsewhere. Import statements are handled
//! in [`imports`].

pub mod imports;

pub use imports::{
    extract_imported_toolboxes, extract_imported_tools, extract_imports, scan_imports, ImportEntry,
};

use crate::grammar::DslGrammarConfig;
use crate::text::{self, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// A bound variable. Identity is by `value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundVariable {
    pub label: String,
    pub value: String,
}

impl BoundVariable {
    /// Label and value both set to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let value = name.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// How much of the text to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractScope {
    All,
    /// Lines before the cursor, plus the cursor line up to the cursor column.
    BeforeCursor(Position),
}

/// One `->`/`>>` binding found on a line. Offsets are bytes within the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingMatch<'a> {
    /// The arrow plus the bound name.
    pub token: &'a str,
    pub name: &'a str,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct VariableExtractor {
    grammar: Arc<DslGrammarConfig>,
}

impl VariableExtractor {
    pub fn new(grammar: Arc<DslGrammarConfig>) -> Self {
        Self { grammar }
    }

    /// Bindings in `text`, in source order. Duplicates are kept.
    pub fn extract(&self, text: &str, scope: ExtractScope) -> Vec<BoundVariable> {
        let mut found = Vec::new();
        for (idx, line) in text::lines(text).enumerate() {
            let number = idx + 1;
            let scanned = match scope {
                ExtractScope::All => line,
                ExtractScope::BeforeCursor(cursor) if number < cursor.line => line,
                ExtractScope::BeforeCursor(cursor) if number == cursor.line => {
                    text::before_column(line, cursor.column)
                }
                ExtractScope::BeforeCursor(_) => break,
            };
            if self.grammar.is_comment_line(line) {
                continue;
            }
            found.extend(
                self.bindings_in_line(scanned)
                    .map(|binding| BoundVariable::new(binding.name)),
            );
        }
        found
    }

    /// Every binding on one line, comment or not.
    pub fn bindings_in_line<'a>(&'a self, line: &'a str) -> impl Iterator<Item = BindingMatch<'a>> + 'a {
        self.grammar
            .patterns()
            .binding
            .captures_iter(line)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?;
                Some(BindingMatch {
                    token: whole.as_str(),
                    name: name.as_str(),
                    start: whole.start(),
                    end: whole.end(),
                })
            })
    }
}

impl Default for VariableExtractor {
    fn default() -> Self {
        Self::new(DslGrammarConfig::shared())
    }
}

/// Stable uniqueness pass by `value`; the first occurrence wins.
pub fn dedupe_by_value<I>(variables: I) -> Vec<BoundVariable>
where
    I: IntoIterator<Item = BoundVariable>,
{
    let mut seen = HashSet::new();
    variables
        .into_iter()
        .filter(|v| seen.insert(v.value.clone()))
        .collect()
}
