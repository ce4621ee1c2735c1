//! Editor host integration.
//!
//! [`EditorHost`] is what the adapter needs from a concrete editing widget.
//! [`DolphinEditor`] drives a host: it keeps completion providers registered
//! while the editor is focused, re-extracts variables and re-validates on
//! every change, sizes the widget and reports everything upward as
//! [`EditorEvent`]s.

mod adapter;
mod layout;
mod memory;
mod registry;

pub use adapter::DolphinEditor;
pub use layout::{compute_height, initial_height, SCROLLBAR_HEIGHT};
pub use memory::MemoryHost;
pub use registry::{register_dolphin_language, LanguageConfiguration, LanguageRegistry, Registration};

use crate::extract::BoundVariable;
use crate::text::{self, Position, Range, WordAtPosition};
use crate::theme::DolphinTheme;
use crate::validate::Diagnostic;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The editing widget the adapter drives.
pub trait EditorHost {
    fn line_count(&self) -> usize;

    /// Content of a 1-based line; empty past the end.
    fn line_content(&self, line: usize) -> Cow<'_, str>;

    fn position(&self) -> Position;

    fn value(&self) -> String {
        (1..=self.line_count())
            .map(|line| self.line_content(line).into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn value_in_range(&self, range: Range) -> String {
        text::value_in_range(&self.value(), range)
    }

    fn word_until_position(&self, position: Position) -> WordAtPosition {
        text::word_until_position(&self.line_content(position.line), position.column)
    }

    /// Open the suggestion popup.
    fn trigger_suggest(&mut self);

    /// Replace every marker owned by `owner`.
    fn set_markers(&mut self, owner: &str, markers: Vec<Diagnostic>);

    fn markers(&self, owner: &str) -> Vec<Diagnostic>;

    /// Resize the widget to `height` pixels.
    fn layout(&mut self, height: u32);

    fn set_theme(&mut self, theme: &DolphinTheme);
}

/// Position and message of an error marker, as reported to the embedder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSummary {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<&Diagnostic> for MarkerSummary {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            message: diagnostic.message.clone(),
            line: diagnostic.range.start_line,
            column: diagnostic.range.start_column,
        }
    }
}

/// Notifications for the embedding layer, drained with
/// [`DolphinEditor::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Mounted,
    Changed(String),
    Focused,
    Blurred,
    MouseUp(Position),
    HeightChanged(u32),
    /// Error markers after a validation pass; empty when clean.
    Errors(Vec<MarkerSummary>),
    /// Deduplicated variables bound anywhere in the document.
    VariablesChanged(Vec<BoundVariable>),
}
