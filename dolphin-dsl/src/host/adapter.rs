//! The Dolphin editor adapter.

use super::layout::{compute_height, initial_height};
use super::registry::register_language_services;
use super::{EditorEvent, EditorHost, LanguageRegistry, MarkerSummary, Registration};
use crate::completion::{
    BlockVariableProvider, CallToolProvider, CompletionItem, CompletionProvider, CompletionRequest,
    ImportToolProvider, KeywordProvider, ProviderKind, ToolCatalog, ToolOption,
};
use crate::config::{EditorHeight, EditorSettings};
use crate::context::classify;
use crate::extract::{dedupe_by_value, BoundVariable, ExtractScope, VariableExtractor};
use crate::grammar::DslGrammarConfig;
use crate::text;
use crate::theme::DolphinTheme;
use crate::validate::{Diagnostic, ValidationContext, Validator};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Option set a provider was registered with.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OptionSnapshot {
    Variables(Vec<BoundVariable>),
    Tools(Vec<ToolOption>),
    Keywords,
    Catalog(ToolCatalog),
}

#[derive(Debug)]
struct ProviderSlot {
    snapshot: OptionSnapshot,
    // Dropping the slot disposes the provider.
    _registration: Registration,
}

/// Wires the Dolphin language services into an [`EditorHost`].
///
/// The embedding layer forwards widget events to the hook methods and drains
/// the resulting [`EditorEvent`]s. Completion providers exist only while the
/// editor is mounted and focused, one per [`ProviderKind`]; whenever an option
/// set changes the old registration is released before the new one is made.
#[derive(Debug)]
pub struct DolphinEditor<H: EditorHost> {
    host: H,
    registry: Arc<LanguageRegistry>,
    grammar: Arc<DslGrammarConfig>,
    settings: EditorSettings,
    theme: DolphinTheme,
    validator: Validator,
    extractor: VariableExtractor,
    prompt_variables: Vec<BoundVariable>,
    tools: Vec<ToolOption>,
    catalog: ToolCatalog,
    custom_variables: Vec<BoundVariable>,
    exported_variables: Vec<BoundVariable>,
    mounted: bool,
    focused: bool,
    slots: BTreeMap<ProviderKind, ProviderSlot>,
    height: u32,
    events: VecDeque<EditorEvent>,
}

impl<H: EditorHost> DolphinEditor<H> {
    pub fn new(
        host: H,
        registry: Arc<LanguageRegistry>,
        grammar: Arc<DslGrammarConfig>,
        settings: EditorSettings,
    ) -> Self {
        if !registry.is_registered(&settings.language_id) {
            register_language_services(&registry, &settings.language_id, &grammar);
        }
        Self {
            host,
            theme: settings.resolve_theme(),
            validator: Validator::new(Arc::clone(&grammar), settings.validation),
            extractor: VariableExtractor::new(Arc::clone(&grammar)),
            height: initial_height(settings.layout.height, settings.layout.line_height),
            registry,
            grammar,
            settings,
            prompt_variables: Vec::new(),
            tools: Vec::new(),
            catalog: ToolCatalog::default(),
            custom_variables: Vec::new(),
            exported_variables: Vec::new(),
            mounted: false,
            focused: false,
            slots: BTreeMap::new(),
            events: VecDeque::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access. Call [`Self::content_changed`] or
    /// [`Self::cursor_moved`] after editing through it.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn grammar(&self) -> &Arc<DslGrammarConfig> {
        &self.grammar
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn theme(&self) -> &DolphinTheme {
        &self.theme
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Variables bound before the cursor.
    pub fn custom_variables(&self) -> &[BoundVariable] {
        &self.custom_variables
    }

    /// Deduplicated variables bound anywhere in the document.
    pub fn bound_variables(&self) -> &[BoundVariable] {
        &self.exported_variables
    }

    /// Kinds with a live registration.
    pub fn active_providers(&self) -> Vec<ProviderKind> {
        self.slots.keys().copied().collect()
    }

    pub fn markers(&self) -> Vec<Diagnostic> {
        self.host.markers(&self.settings.language_id)
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    // ------------------------------------------------------------------------
    // Option sets
    // ------------------------------------------------------------------------

    /// Upstream-step variables offered after `$`.
    pub fn set_prompt_variables(&mut self, variables: Vec<BoundVariable>) {
        self.prompt_variables = variables;
        self.sync_providers();
    }

    /// Tools offered after `@` and in `tools=[...]`.
    pub fn set_tools(&mut self, tools: Vec<ToolOption>) {
        self.tools = tools;
        self.sync_providers();
    }

    /// Toolboxes and tools offered in `import` statements.
    pub fn set_tool_catalog(&mut self, catalog: ToolCatalog) {
        self.catalog = catalog;
        self.sync_providers();
    }

    // ------------------------------------------------------------------------
    // Lifecycle hooks
    // ------------------------------------------------------------------------

    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.host.set_theme(&self.theme);
        let layout = &self.settings.layout;
        self.height = initial_height(layout.height, layout.line_height);
        self.host.layout(self.height);

        let value = self.host.value();
        self.refresh_variables(&value);
        self.run_validation(&value);
        self.events.push_back(EditorEvent::Mounted);
        self.sync_providers();
        debug!(language = %self.settings.language_id, theme = %self.theme.name, "mounted Dolphin editor");
    }

    /// Release every provider and stop reacting to focus.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.focused = false;
        self.release_providers();
    }

    pub fn focus(&mut self) {
        self.focused = true;
        self.events.push_back(EditorEvent::Focused);
        self.sync_providers();
    }

    pub fn blur(&mut self) {
        self.focused = false;
        self.events.push_back(EditorEvent::Blurred);
        self.sync_providers();
    }

    /// The document text changed.
    pub fn content_changed(&mut self) {
        let value = self.host.value();
        self.events.push_back(EditorEvent::Changed(value.clone()));
        self.refresh_variables(&value);
        self.sync_providers();
        self.run_validation(&value);

        if self.mounted && self.cursor_context_triggers_suggest() {
            self.host.trigger_suggest();
        }
    }

    /// The cursor moved without an edit.
    pub fn cursor_moved(&mut self) {
        let value = self.host.value();
        self.custom_variables = self.extract_before_cursor(&value);
        self.sync_providers();
    }

    /// The widget measured a new content height.
    pub fn content_size_changed(&mut self, content_height: u32) {
        if !matches!(self.settings.layout.height, EditorHeight::Auto { .. }) {
            return;
        }
        let height = compute_height(self.settings.layout.height, content_height);
        if height != self.height {
            debug!(content_height, height, "editor height changed");
            self.height = height;
            self.host.layout(height);
            self.events.push_back(EditorEvent::HeightChanged(height));
        }
    }

    pub fn mouse_up(&mut self, position: text::Position) {
        self.events.push_back(EditorEvent::MouseUp(position));
    }

    /// Suggestions for the current cursor from every registered provider.
    pub fn completions(&self) -> Vec<CompletionItem> {
        let position = self.host.position();
        let line = self.host.line_content(position.line);
        let request = CompletionRequest::new(line.into_owned(), position);
        self.registry
            .provide_completions(&self.settings.language_id, &request)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn cursor_context_triggers_suggest(&self) -> bool {
        let position = self.host.position();
        let line = self.host.line_content(position.line);
        let before = text::before_column(&line, position.column);
        classify(before, &line).should_trigger_suggest()
    }

    fn extract_before_cursor(&self, value: &str) -> Vec<BoundVariable> {
        self.extractor
            .extract(value, ExtractScope::BeforeCursor(self.host.position()))
    }

    /// `VariablesChanged` is diffed against the last export: an edit that
    /// leaves the bound set unchanged pushes nothing.
    fn refresh_variables(&mut self, value: &str) {
        self.custom_variables = self.extract_before_cursor(value);
        let exported = dedupe_by_value(self.extractor.extract(value, ExtractScope::All));
        if exported != self.exported_variables {
            self.exported_variables = exported.clone();
            self.events.push_back(EditorEvent::VariablesChanged(exported));
        }
    }

    fn run_validation(&mut self, value: &str) {
        let context = ValidationContext {
            known_variables: self.prompt_variables.iter().map(|v| v.value.clone()).collect(),
        };
        let diagnostics = self.validator.validate_with(value, &context);
        let errors: Vec<MarkerSummary> = diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(MarkerSummary::from)
            .collect();
        self.host.set_markers(&self.settings.language_id, diagnostics);
        self.events.push_back(EditorEvent::Errors(errors));
    }

    fn desired_snapshot(&self, kind: ProviderKind) -> Option<OptionSnapshot> {
        if !(self.mounted && self.focused) {
            return None;
        }
        match kind {
            ProviderKind::BlockVariable => {
                let merged = dedupe_by_value(
                    self.prompt_variables
                        .iter()
                        .chain(&self.custom_variables)
                        .cloned(),
                );
                (!merged.is_empty()).then_some(OptionSnapshot::Variables(merged))
            }
            ProviderKind::CallTool => Some(OptionSnapshot::Tools(self.tools.clone())),
            ProviderKind::Keyword => Some(OptionSnapshot::Keywords),
            ProviderKind::ImportTool => {
                (!self.catalog.is_empty()).then(|| OptionSnapshot::Catalog(self.catalog.clone()))
            }
        }
    }

    fn build_provider(&self, snapshot: &OptionSnapshot) -> Arc<dyn CompletionProvider> {
        match snapshot {
            OptionSnapshot::Variables(vars) => Arc::new(BlockVariableProvider::new(vars.clone())),
            OptionSnapshot::Tools(tools) => Arc::new(CallToolProvider::new(tools.clone())),
            OptionSnapshot::Keywords => Arc::new(KeywordProvider::new(Arc::clone(&self.grammar))),
            OptionSnapshot::Catalog(catalog) => Arc::new(ImportToolProvider::new(catalog.clone())),
        }
    }

    /// Bring every provider slot in line with the current state.
    fn sync_providers(&mut self) {
        for kind in ProviderKind::ALL {
            let desired = self.desired_snapshot(kind);
            if self.slots.get(&kind).map(|slot| &slot.snapshot) == desired.as_ref() {
                continue;
            }

            // Release before registering so the two never coexist.
            drop(self.slots.remove(&kind));

            if let Some(snapshot) = desired {
                let provider = self.build_provider(&snapshot);
                let registration = self
                    .registry
                    .register_completion_provider(&self.settings.language_id, provider);
                self.slots.insert(
                    kind,
                    ProviderSlot {
                        snapshot,
                        _registration: registration,
                    },
                );
            }
        }
    }

    fn release_providers(&mut self) {
        if !self.slots.is_empty() {
            debug!(count = self.slots.len(), "releasing completion providers");
        }
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionItemKind;
    use crate::host::MemoryHost;
    use crate::text::Position;

    fn editor(text: &str) -> DolphinEditor<MemoryHost> {
        DolphinEditor::new(
            MemoryHost::new(text),
            LanguageRegistry::new(),
            DslGrammarConfig::shared(),
            EditorSettings::default(),
        )
    }

    #[test]
    fn test_providers_follow_focus() {
        let mut ed = editor("");
        ed.mount();
        assert!(ed.active_providers().is_empty());

        ed.focus();
        assert_eq!(
            ed.active_providers(),
            vec![ProviderKind::CallTool, ProviderKind::Keyword]
        );

        ed.blur();
        assert!(ed.active_providers().is_empty());
        assert_eq!(ed.registry.provider_count("dolphin"), 0);
    }

    #[test]
    fn test_initial_height_uses_configured_line_height() {
        let mut settings = EditorSettings::default();
        settings.layout.line_height = 30;
        let mut ed = DolphinEditor::new(
            MemoryHost::new("a"),
            LanguageRegistry::new(),
            DslGrammarConfig::shared(),
            settings,
        );
        assert_eq!(ed.height(), 30);
        ed.mount();
        assert_eq!(ed.height(), 30);
    }

    #[test]
    fn test_unfocused_before_mount_registers_nothing() {
        let mut ed = editor("");
        ed.focus();
        assert!(ed.active_providers().is_empty());
        ed.mount();
        assert_eq!(ed.active_providers().len(), 2);
    }

    #[test]
    fn test_mount_applies_theme_and_height() {
        let mut ed = editor("say hi");
        ed.mount();
        assert_eq!(ed.host().theme_name(), Some("dolphin"));
        assert_eq!(ed.host().height(), Some(22));
        assert_eq!(ed.drain_events().last(), Some(&EditorEvent::Mounted));
    }

    #[test]
    fn test_typing_dollar_triggers_suggest() {
        let mut ed = editor("");
        ed.mount();
        ed.focus();
        ed.set_prompt_variables(vec![BoundVariable::new("query")]);

        ed.host_mut().type_text("ask $");
        ed.content_changed();
        assert_eq!(ed.host().suggest_triggers(), 1);

        let items = ed.completions();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "query");
        assert_eq!(items[0].kind, CompletionItemKind::Variable);

        ed.host_mut().type_text("q ");
        ed.content_changed();
        assert_eq!(ed.host().suggest_triggers(), 1);
    }

    #[test]
    fn test_content_change_events() {
        let mut ed = editor("");
        ed.mount();
        ed.drain_events();

        ed.host_mut().type_text("ask -> answer -> in");
        ed.content_changed();
        let events = ed.drain_events();
        assert_eq!(events[0], EditorEvent::Changed("ask -> answer -> in".to_string()));
        assert_eq!(
            events[1],
            EditorEvent::VariablesChanged(vec![BoundVariable::new("answer"), BoundVariable::new("in")])
        );
        match &events[2] {
            EditorEvent::Errors(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].line, 1);
                assert_eq!(errors[0].column, 15);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(ed.markers().len(), 1);
    }

    #[test]
    fn test_unchanged_variables_not_re_exported() {
        let mut ed = editor("-> a");
        ed.mount();
        ed.drain_events();
        ed.host_mut().set_text("-> a\nsay");
        ed.content_changed();
        let events = ed.drain_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, EditorEvent::VariablesChanged(_))));
    }

    #[test]
    fn test_auto_height_events() {
        let mut settings = EditorSettings::default();
        settings.layout.height = EditorHeight::Auto {
            min: Some(44),
            max: Some(110),
        };
        let mut ed = DolphinEditor::new(
            MemoryHost::new(""),
            LanguageRegistry::new(),
            DslGrammarConfig::shared(),
            settings,
        );
        ed.mount();
        assert_eq!(ed.height(), 44);
        ed.drain_events();

        ed.content_size_changed(66);
        assert_eq!(ed.height(), 82);
        ed.content_size_changed(66);
        ed.content_size_changed(400);
        assert_eq!(ed.host().height(), Some(110));
        assert_eq!(
            ed.drain_events(),
            vec![EditorEvent::HeightChanged(82), EditorEvent::HeightChanged(110)]
        );
    }

    #[test]
    fn test_fixed_height_ignores_content() {
        let mut settings = EditorSettings::default();
        settings.layout.height = EditorHeight::Fixed { pixels: 300 };
        let mut ed = DolphinEditor::new(
            MemoryHost::new(""),
            LanguageRegistry::new(),
            DslGrammarConfig::shared(),
            settings,
        );
        ed.mount();
        ed.content_size_changed(1000);
        assert_eq!(ed.height(), 300);
    }

    #[test]
    fn test_mouse_up_forwarded() {
        let mut ed = editor("");
        ed.mouse_up(Position::new(1, 1));
        assert_eq!(ed.drain_events(), vec![EditorEvent::MouseUp(Position::new(1, 1))]);
    }
}
