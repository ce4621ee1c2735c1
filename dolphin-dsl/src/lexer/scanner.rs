//! Tokenizer implementation

use super::token::*;
use crate::grammar::{DslGrammarConfig, TokenRule};
use crate::text;
use std::sync::Arc;

// ============================================================================
// TOKENIZER
// ============================================================================

/// Line tokenizer for syntax highlighting.
///
/// Rules are tried in declaration order at every position; the first one that
/// matches at that exact position wins and the scan continues after it.
/// Characters no rule claims are gathered into [`TokenCategory::PlainText`]
/// runs, so the tokens of a line always concatenate back to the line.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    grammar: Arc<DslGrammarConfig>,
}

impl Tokenizer {
    pub fn new(grammar: Arc<DslGrammarConfig>) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &Arc<DslGrammarConfig> {
        &self.grammar
    }

    /// Tokenize a single line (1-based line number 1).
    pub fn tokenize_line(&self, line: &str) -> Vec<Token> {
        self.tokenize_numbered_line(line, 1)
    }

    /// Tokenize every line of `source`.
    pub fn tokenize(&self, source: &str) -> Vec<Vec<Token>> {
        text::lines(source)
            .enumerate()
            .map(|(idx, line)| self.tokenize_numbered_line(line, idx + 1))
            .collect()
    }

    fn tokenize_numbered_line(&self, line: &str, line_number: usize) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut pos = 0;
        let mut column = 1;
        let mut in_fallback = false;
        let mut matches = MatchCache::new(self.grammar.rules());

        while pos < line.len() {
            if let Some((category, end)) = matches.match_at(line, pos) {
                let lexeme = &line[pos..end];
                tokens.push(Token {
                    category,
                    text: lexeme.to_string(),
                    span: Span {
                        start: pos,
                        end,
                        line: line_number,
                        column,
                    },
                });
                column += lexeme.chars().count();
                pos = end;
                in_fallback = false;
                continue;
            }

            let ch_len = line[pos..].chars().next().map(char::len_utf8).unwrap_or(1);
            let end = pos + ch_len;
            match tokens.last_mut() {
                Some(last) if in_fallback => {
                    last.text.push_str(&line[pos..end]);
                    last.span.end = end;
                }
                _ => tokens.push(Token {
                    category: TokenCategory::PlainText,
                    text: line[pos..end].to_string(),
                    span: Span {
                        start: pos,
                        end,
                        line: line_number,
                        column,
                    },
                }),
            }
            column += 1;
            pos = end;
            in_fallback = true;
        }

        tokens
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(DslGrammarConfig::shared())
    }
}

#[derive(Debug, Clone, Copy)]
enum NextMatch {
    Unknown,
    At { start: usize, end: usize },
    Exhausted,
}

/// Each rule's next match at or after the scan position. A rule is searched
/// again only once the scan has moved past its cached match, so a line costs
/// one forward pass per rule.
struct MatchCache<'r> {
    rules: &'r [TokenRule],
    next: Vec<NextMatch>,
    searches: usize,
}

impl<'r> MatchCache<'r> {
    fn new(rules: &'r [TokenRule]) -> Self {
        Self {
            rules,
            next: vec![NextMatch::Unknown; rules.len()],
            searches: 0,
        }
    }

    /// First rule, in declaration order, with a match starting at `pos`.
    fn match_at(&mut self, line: &str, pos: usize) -> Option<(TokenCategory, usize)> {
        for (rule, slot) in self.rules.iter().zip(self.next.iter_mut()) {
            let stale = match *slot {
                NextMatch::Unknown => true,
                NextMatch::At { start, .. } => start < pos,
                NextMatch::Exhausted => false,
            };
            if stale {
                self.searches += 1;
                *slot = rule
                    .next_match(line, pos)
                    .map_or(NextMatch::Exhausted, |(start, end)| NextMatch::At { start, end });
            }
            if let NextMatch::At { start, end } = *slot {
                if start == pos {
                    return Some((rule.category, end));
                }
            }
        }
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
