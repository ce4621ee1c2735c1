//! In-memory editor host for headless use and tests.

use super::EditorHost;
use crate::text::{self, Position};
use crate::theme::DolphinTheme;
use crate::validate::Diagnostic;
use std::borrow::Cow;
use std::collections::HashMap;

/// A text buffer with a cursor that records what the adapter asks of it.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    text: String,
    position: Position,
    markers: HashMap<String, Vec<Diagnostic>>,
    suggest_triggers: usize,
    theme: Option<String>,
    height: Option<u32>,
}

impl MemoryHost {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Cursor at the end of the text.
    pub fn move_to_end(&mut self) {
        let line = text::lines(&self.text).count();
        let column = text::lines(&self.text)
            .last()
            .map_or(1, |last| text::char_len(last) + 1);
        self.position = Position::new(line, column);
    }

    /// Insert at the cursor and move past the insertion.
    pub fn type_text(&mut self, typed: &str) {
        let mut offset = 0;
        for (idx, line) in text::lines(&self.text).enumerate() {
            if idx + 1 == self.position.line {
                offset += text::byte_offset(line, self.position.column);
                break;
            }
            offset += line.len() + 1;
        }
        let offset = offset.min(self.text.len());
        self.text.insert_str(offset, typed);

        let mut typed_lines = text::lines(typed);
        let first = typed_lines.next().unwrap_or_default();
        match typed_lines.last() {
            Some(last) => {
                self.position.line += typed.matches('\n').count();
                self.position.column = text::char_len(last) + 1;
            }
            None => self.position.column += text::char_len(first),
        }
    }

    pub fn suggest_triggers(&self) -> usize {
        self.suggest_triggers
    }

    pub fn theme_name(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }
}

impl EditorHost for MemoryHost {
    fn line_count(&self) -> usize {
        text::lines(&self.text).count()
    }

    fn line_content(&self, line: usize) -> Cow<'_, str> {
        line.checked_sub(1)
            .and_then(|idx| text::lines(&self.text).nth(idx))
            .map_or(Cow::Borrowed(""), Cow::Borrowed)
    }

    fn position(&self) -> Position {
        self.position
    }

    fn value(&self) -> String {
        self.text.clone()
    }

    fn trigger_suggest(&mut self) {
        self.suggest_triggers += 1;
    }

    fn set_markers(&mut self, owner: &str, markers: Vec<Diagnostic>) {
        self.markers.insert(owner.to_string(), markers);
    }

    fn markers(&self, owner: &str) -> Vec<Diagnostic> {
        self.markers.get(owner).cloned().unwrap_or_default()
    }

    fn layout(&mut self, height: u32) {
        self.height = Some(height);
    }

    fn set_theme(&mut self, theme: &DolphinTheme) {
        self.theme = Some(theme.name.clone());
    }
}
