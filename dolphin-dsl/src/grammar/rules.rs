//! Highlighting rule table.

use super::{compile, GrammarResult, Keyword};
use crate::lexer::TokenCategory;
use regex::Regex;

/// One highlighting rule. Earlier rules win when several match at a position.
#[derive(Debug, Clone)]
pub struct TokenRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub category: TokenCategory,
}

impl TokenRule {
    /// End offset of a non-empty match starting exactly at `pos`.
    pub fn match_at(&self, line: &str, pos: usize) -> Option<usize> {
        self.next_match(line, pos)
            .filter(|&(start, _)| start == pos)
            .map(|(_, end)| end)
    }

    /// Leftmost non-empty match starting at or after `from`, as byte offsets.
    pub fn next_match(&self, line: &str, from: usize) -> Option<(usize, usize)> {
        // find_at keeps the surrounding text as context, so `^` and `\b` behave
        // as they would on the whole line.
        let mut at = from;
        while at <= line.len() {
            let m = self.pattern.find_at(line, at)?;
            if m.end() > m.start() {
                return Some((m.start(), m.end()));
            }
            at = m.start() + line[m.start()..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }
}

pub(super) fn default_rules(keywords: &[Keyword]) -> GrammarResult<Vec<TokenRule>> {
    let table: [(&'static str, String, TokenCategory); 9] = [
        ("comment", r"^#.*$".to_string(), TokenCategory::Comment),
        (
            "variable",
            r"\$[A-Za-z_][A-Za-z0-9_]*".to_string(),
            TokenCategory::Variable,
        ),
        (
            "tools function",
            r"tools=\[[^\]]*\]".to_string(),
            TokenCategory::ToolsFunction,
        ),
        ("keyword", keyword_pattern(keywords), TokenCategory::Keyword),
        (
            "string",
            r#""[^"]*"|'[^']*'"#.to_string(),
            TokenCategory::String,
        ),
        ("number", r"\d+(?:\.\d+)?".to_string(), TokenCategory::Number),
        (
            "delimiter",
            "[，。；：？！“”‘’]".to_string(),
            TokenCategory::Delimiter,
        ),
        (
            "call function",
            r"@[^\s(]+\([^)]*\)".to_string(),
            TokenCategory::CallFunction,
        ),
        (
            "plain text",
            r"[A-Za-z_][A-Za-z0-9_]*".to_string(),
            TokenCategory::PlainText,
        ),
    ];

    table
        .into_iter()
        .map(|(name, pattern, category)| {
            Ok(TokenRule {
                name,
                pattern: compile(name, &pattern)?,
                category,
            })
        })
        .collect()
}

/// Alternation over the keyword labels, word-bounded on word-character edges
/// so `if/` and `else:` still match. Longest labels come first.
fn keyword_pattern(keywords: &[Keyword]) -> String {
    let mut labels: Vec<&str> = keywords.iter().map(|k| k.label.as_str()).collect();
    labels.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternatives: Vec<String> = labels
        .into_iter()
        .map(|label| {
            let mut alt = String::new();
            if label.starts_with(is_ident_char) {
                alt.push_str(r"\b");
            }
            alt.push_str(&regex::escape(label));
            if label.ends_with(is_ident_char) {
                alt.push_str(r"\b");
            }
            alt
        })
        .collect();
    format!("(?:{})", alternatives.join("|"))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
