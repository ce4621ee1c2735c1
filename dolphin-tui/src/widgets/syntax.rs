//! Syntax highlighting for Dolphin documents.

use crate::theme::TuiTheme;
use dolphin_dsl::{text, Diagnostic, Tokenizer};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};
use std::collections::HashSet;

pub struct SyntaxHighlighter<'a> {
    pub tokenizer: &'a Tokenizer,
    pub theme: &'a TuiTheme,
    pub line_numbers: bool,
}

impl<'a> SyntaxHighlighter<'a> {
    /// Gutter width in cells for a document of `line_count` lines.
    pub fn gutter_width(&self, line_count: usize) -> u16 {
        if !self.line_numbers {
            return 0;
        }
        let digits = line_count.max(1).to_string().len();
        u16::try_from(digits + 1).unwrap_or(u16::MAX)
    }

    /// One styled line per source line. Lines carrying an error marker get a
    /// highlighted line number.
    pub fn highlight(&self, content: &str, markers: &[Diagnostic]) -> Text<'static> {
        let error_lines: HashSet<usize> = markers
            .iter()
            .filter(|marker| marker.is_error())
            .flat_map(|marker| marker.range.start_line..=marker.range.end_line)
            .collect();
        let line_count = text::lines(content).count();
        let width = usize::from(self.gutter_width(line_count));

        let lines: Vec<Line<'static>> = self
            .tokenizer
            .tokenize(content)
            .into_iter()
            .enumerate()
            .map(|(idx, tokens)| {
                let number = idx + 1;
                let mut spans: Vec<Span<'static>> = Vec::with_capacity(tokens.len() + 1);
                if self.line_numbers {
                    let style = if error_lines.contains(&number) {
                        Style::default()
                            .fg(self.theme.error)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(self.theme.text_dim)
                    };
                    spans.push(Span::styled(
                        format!("{:>w$} ", number, w = width.saturating_sub(1)),
                        style,
                    ));
                }
                spans.extend(tokens.into_iter().map(|token| {
                    Span::styled(token.text, self.theme.token_style(token.category))
                }));
                Line::from(spans)
            })
            .collect();

        Text::from(lines)
    }
}
