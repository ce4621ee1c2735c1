//! Application state.

use crate::config::TuiConfig;
use crate::host::TerminalHost;
use crate::keys::{Action, KeyMode};
use crate::notifications::{Notification, NotificationLevel};
use crate::persistence::PersistedState;
use crate::theme::TuiTheme;
use crossterm::event::KeyEvent;
use dolphin_dsl::{
    BoundVariable, CompletionItem, Diagnostic, DolphinEditor, DslGrammarConfig, EditorEvent,
    EditorHost, LanguageRegistry, MarkerSummary, Tokenizer,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// How long a notification stays in the footer.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// What the event loop should do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Save,
    Quit,
}

/// Open suggestion list.
#[derive(Debug, Clone)]
pub struct CompletionPopup {
    pub items: Vec<CompletionItem>,
    pub selected: usize,
}

impl CompletionPopup {
    /// `None` when there is nothing to suggest.
    pub fn new(items: Vec<CompletionItem>) -> Option<Self> {
        (!items.is_empty()).then_some(Self { items, selected: 0 })
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.items.len() - 1);
    }

    pub fn selected_item(&self) -> Option<&CompletionItem> {
        self.items.get(self.selected)
    }
}

pub struct App {
    pub config: TuiConfig,
    pub theme: TuiTheme,
    pub tokenizer: Tokenizer,
    pub editor: DolphinEditor<TerminalHost>,
    pub completion: Option<CompletionPopup>,
    pub notifications: Vec<Notification>,
    /// Error markers from the last validation pass.
    pub errors: Vec<MarkerSummary>,
    /// Variables bound anywhere in the document.
    pub variables: Vec<BoundVariable>,
    pub sidebar_visible: bool,
    pub modified: bool,
}

impl App {
    pub fn new(config: TuiConfig, registry: Arc<LanguageRegistry>, document: &str) -> Self {
        let grammar = DslGrammarConfig::shared();
        let settings = config.editor_settings();
        let theme = TuiTheme::from_dolphin(&settings.resolve_theme());

        let mut editor = DolphinEditor::new(
            TerminalHost::new(document),
            registry,
            Arc::clone(&grammar),
            settings,
        );
        editor.set_prompt_variables(config.prompt_variables());
        editor.set_tools(config.tool_options());
        editor.set_tool_catalog(config.tool_catalog());
        editor.mount();

        let mut app = Self {
            config,
            theme,
            tokenizer: Tokenizer::new(grammar),
            editor,
            completion: None,
            notifications: Vec::new(),
            errors: Vec::new(),
            variables: Vec::new(),
            sidebar_visible: true,
            modified: false,
        };
        app.sync_content_height();
        app.process_editor_events();
        app
    }

    pub fn key_mode(&self) -> KeyMode {
        if !self.editor.is_focused() {
            KeyMode::Normal
        } else if self.completion.is_some() {
            KeyMode::Completing
        } else {
            KeyMode::Editing
        }
    }

    pub fn value(&self) -> String {
        self.editor.host().value()
    }

    /// Every marker on the document, in position order.
    pub fn markers(&self) -> Vec<Diagnostic> {
        self.editor.markers()
    }

    /// Terminal rows the editor asks for, from its pixel height.
    pub fn editor_rows(&self) -> u16 {
        let line_height = self.editor.settings().layout.line_height.max(1);
        let rows = self.editor.height().div_ceil(line_height).max(1);
        u16::try_from(rows).unwrap_or(u16::MAX)
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    pub fn on_tick(&mut self) {
        self.notifications
            .retain(|note| note.created_at.elapsed() < NOTIFICATION_TTL);
    }

    pub fn restore(&mut self, state: &PersistedState) {
        self.sidebar_visible = state.sidebar_visible;
        self.editor.host_mut().set_cursor(state.cursor);
        self.editor.cursor_moved();
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            cursor: self.editor.host().position(),
            sidebar_visible: self.sidebar_visible,
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Outcome {
        match action {
            Action::Quit => return Outcome::Quit,
            Action::Save => return Outcome::Save,
            Action::Focus => {
                self.editor.focus();
                self.process_editor_events();
            }
            Action::Blur => {
                self.completion = None;
                self.editor.blur();
                self.process_editor_events();
            }
            Action::TriggerCompletion => self.open_completion(),
            Action::NextCompletion => {
                if let Some(popup) = self.completion.as_mut() {
                    popup.select_next();
                }
            }
            Action::PrevCompletion => {
                if let Some(popup) = self.completion.as_mut() {
                    popup.select_previous();
                }
            }
            Action::AcceptCompletion => self.accept_completion(),
            Action::DismissCompletion => self.completion = None,
            Action::ToggleSidebar => self.sidebar_visible = !self.sidebar_visible,
            Action::Edit(key) => self.edit(key),
        }
        Outcome::Continue
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
        let path = self.config.document_path.display().to_string();
        self.notify(NotificationLevel::Success, format!("Saved {}", path));
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    fn edit(&mut self, key: KeyEvent) {
        if self.editor.settings().layout.read_only {
            return;
        }
        let before = self.editor.host().position();
        if self.editor.host_mut().input(key) {
            self.after_edit();
        } else if self.editor.host().position() != before {
            self.editor.cursor_moved();
            self.completion = None;
        }
    }

    fn after_edit(&mut self) {
        self.modified = true;
        self.editor.content_changed();
        self.sync_content_height();
        self.process_editor_events();

        if self.editor.host_mut().take_suggest_request() {
            self.open_completion();
        } else if self.completion.is_some() {
            // Narrow the open list to what still applies.
            self.completion = CompletionPopup::new(self.editor.completions());
        }
    }

    fn open_completion(&mut self) {
        let items = self.editor.completions();
        trace!(count = items.len(), "completion requested");
        self.completion = CompletionPopup::new(items);
    }

    fn accept_completion(&mut self) {
        let Some(item) = self
            .completion
            .take()
            .and_then(|popup| popup.selected_item().cloned())
        else {
            return;
        };
        let host = self.editor.host();
        let cursor = host.position();
        // Only the typed word is replaced, even when the item range reaches
        // further back.
        let word = host.word_until_position(cursor);
        let replaced = if item.range.start_line == cursor.line {
            cursor
                .column
                .saturating_sub(item.range.start_column.max(word.start_column))
        } else {
            0
        };
        debug!(label = %item.label, replaced, "accepted completion");
        self.editor
            .host_mut()
            .replace_before_cursor(replaced, &item.insert_text);
        self.after_edit();
    }

    fn sync_content_height(&mut self) {
        let line_height = self.editor.settings().layout.line_height;
        let lines = u32::try_from(self.editor.host().line_count()).unwrap_or(u32::MAX);
        self.editor
            .content_size_changed(lines.saturating_mul(line_height));
    }

    fn process_editor_events(&mut self) {
        for event in self.editor.drain_events() {
            match event {
                EditorEvent::Errors(errors) => self.errors = errors,
                EditorEvent::VariablesChanged(variables) => self.variables = variables,
                EditorEvent::HeightChanged(height) => {
                    trace!(height, rows = self.editor_rows(), "editor resized");
                }
                EditorEvent::Mounted
                | EditorEvent::Changed(_)
                | EditorEvent::Focused
                | EditorEvent::Blurred
                | EditorEvent::MouseUp(_) => {}
            }
        }
    }
}
