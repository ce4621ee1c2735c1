//! Editor host backed by a `tui-textarea` buffer.

use crossterm::event::KeyEvent;
use dolphin_dsl::{text, Diagnostic, DolphinTheme, EditorHost, Position};
use std::borrow::Cow;
use std::collections::HashMap;
use tui_textarea::{CursorMove, TextArea};

/// Text buffer, cursor and marker store the Dolphin editor adapter drives.
#[derive(Debug, Clone)]
pub struct TerminalHost {
    textarea: TextArea<'static>,
    markers: HashMap<String, Vec<Diagnostic>>,
    suggest_requested: bool,
    theme_name: Option<String>,
    height: u32,
}

impl TerminalHost {
    pub fn new(document: &str) -> Self {
        let lines: Vec<String> = text::lines(document).map(str::to_string).collect();
        Self {
            textarea: TextArea::new(lines),
            markers: HashMap::new(),
            suggest_requested: false,
            theme_name: None,
            height: 0,
        }
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    /// Feed a key to the buffer. Returns whether the text changed.
    pub fn input(&mut self, key: KeyEvent) -> bool {
        self.textarea.input(key)
    }

    /// Replace the `chars` characters before the cursor with `replacement`.
    pub fn replace_before_cursor(&mut self, chars: usize, replacement: &str) {
        for _ in 0..chars {
            if !self.textarea.delete_char() {
                break;
            }
        }
        self.textarea.insert_str(replacement);
    }

    pub fn set_cursor(&mut self, position: Position) {
        let row = clamp_u16(position.line.saturating_sub(1));
        let col = clamp_u16(position.column.saturating_sub(1));
        self.textarea.move_cursor(CursorMove::Jump(row, col));
    }

    /// Whether the adapter asked for the suggestion popup since the last call.
    pub fn take_suggest_request(&mut self) -> bool {
        std::mem::take(&mut self.suggest_requested)
    }

    pub fn theme_name(&self) -> Option<&str> {
        self.theme_name.as_deref()
    }

    /// Last height the adapter laid the widget out at, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl EditorHost for TerminalHost {
    fn line_count(&self) -> usize {
        self.textarea.lines().len()
    }

    fn line_content(&self, line: usize) -> Cow<'_, str> {
        line.checked_sub(1)
            .and_then(|idx| self.textarea.lines().get(idx))
            .map_or(Cow::Borrowed(""), |content| Cow::Borrowed(content.as_str()))
    }

    fn position(&self) -> Position {
        let (row, col) = self.textarea.cursor();
        Position::new(row + 1, col + 1)
    }

    fn value(&self) -> String {
        self.textarea.lines().join("\n")
    }

    fn trigger_suggest(&mut self) {
        self.suggest_requested = true;
    }

    fn set_markers(&mut self, owner: &str, markers: Vec<Diagnostic>) {
        self.markers.insert(owner.to_string(), markers);
    }

    fn markers(&self, owner: &str) -> Vec<Diagnostic> {
        self.markers.get(owner).cloned().unwrap_or_default()
    }

    fn layout(&mut self, height: u32) {
        self.height = height;
    }

    fn set_theme(&mut self, theme: &DolphinTheme) {
        self.theme_name = Some(theme.name.clone());
    }
}

fn clamp_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}
