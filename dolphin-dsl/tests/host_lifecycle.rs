//! Integration tests for the editor adapter driving an in-memory host.
//!
//! Tests verify:
//! - Provider registrations follow mount/focus and never accumulate
//! - Editors sharing one registry release only their own providers
//! - Variable export, scoping and markers after content changes

use dolphin_dsl::{
    BoundVariable, DolphinEditor, DslGrammarConfig, EditorEvent, EditorSettings,
    LanguageRegistry, MemoryHost, Position, ProviderKind, ToolOption, LANGUAGE_ID,
};
use std::sync::Arc;

// ============================================================================
// FIXTURES
// ============================================================================

fn editor_on(registry: &Arc<LanguageRegistry>, text: &str) -> DolphinEditor<MemoryHost> {
    let mut host = MemoryHost::new(text);
    host.move_to_end();
    DolphinEditor::new(
        host,
        Arc::clone(registry),
        DslGrammarConfig::shared(),
        EditorSettings::default(),
    )
}

fn focused_editor(registry: &Arc<LanguageRegistry>, text: &str) -> DolphinEditor<MemoryHost> {
    let mut editor = editor_on(registry, text);
    editor.mount();
    editor.focus();
    editor
}

fn vars(names: &[&str]) -> Vec<BoundVariable> {
    names.iter().map(|n| BoundVariable::new(*n)).collect()
}

fn labels(editor: &DolphinEditor<MemoryHost>) -> Vec<String> {
    editor.completions().into_iter().map(|item| item.label).collect()
}

// ============================================================================
// PROVIDER LIFECYCLE
// ============================================================================

#[test]
fn test_replacing_options_never_unions() {
    let registry = LanguageRegistry::new();
    let mut editor = focused_editor(&registry, "say $");

    editor.set_prompt_variables(vars(&["a"]));
    assert_eq!(labels(&editor), vec!["a"]);

    editor.set_prompt_variables(vars(&["b"]));
    assert_eq!(labels(&editor), vec!["b"]);
    assert_eq!(
        registry.provider_count_of(LANGUAGE_ID, ProviderKind::BlockVariable),
        1
    );
}

#[test]
fn test_refocus_does_not_accumulate() {
    let registry = LanguageRegistry::new();
    let mut editor = focused_editor(&registry, "");
    let registered = registry.provider_count(LANGUAGE_ID);

    for _ in 0..3 {
        editor.blur();
        assert_eq!(registry.provider_count(LANGUAGE_ID), 0);
        editor.focus();
    }
    assert_eq!(registry.provider_count(LANGUAGE_ID), registered);
}

#[test]
fn test_shared_registry_releases_per_editor() {
    let registry = LanguageRegistry::new();
    let mut first = focused_editor(&registry, "");
    let second = focused_editor(&registry, "");
    assert_eq!(registry.provider_count_of(LANGUAGE_ID, ProviderKind::Keyword), 2);

    first.blur();
    assert_eq!(registry.provider_count_of(LANGUAGE_ID, ProviderKind::Keyword), 1);
    assert_eq!(second.active_providers().len(), 2);

    drop(second);
    assert_eq!(registry.provider_count(LANGUAGE_ID), 0);
}

#[test]
fn test_unmount_stops_reacting_to_focus() {
    let registry = LanguageRegistry::new();
    let mut editor = focused_editor(&registry, "");
    editor.unmount();
    editor.focus();
    assert!(editor.active_providers().is_empty());
    assert_eq!(registry.provider_count(LANGUAGE_ID), 0);
}

#[test]
fn test_tool_call_completion() {
    let registry = LanguageRegistry::new();
    let mut editor = focused_editor(&registry, "");
    editor.set_tools(vec![ToolOption::new("web", "search")]);

    editor.host_mut().type_text("@");
    editor.content_changed();
    assert_eq!(editor.host().suggest_triggers(), 1);

    let items = editor.completions();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "search(web)");
    assert_eq!(items[0].insert_text, "search()");
}

// ============================================================================
// DOCUMENT STATE
// ============================================================================

#[test]
fn test_commented_binding_not_exported() {
    let registry = LanguageRegistry::new();
    let editor = focused_editor(&registry, "# -> foo\n -> bar");
    assert_eq!(editor.bound_variables(), vars(&["bar"]).as_slice());
}

#[test]
fn test_cursor_scopes_custom_variables() {
    let registry = LanguageRegistry::new();
    let mut editor = editor_on(&registry, "a -> x\nb -> y");
    editor.host_mut().set_position(Position::new(2, 1));
    editor.mount();

    assert_eq!(editor.custom_variables(), vars(&["x"]).as_slice());
    assert_eq!(editor.bound_variables(), vars(&["x", "y"]).as_slice());
}

#[test]
fn test_reserved_binding_reported() {
    let registry = LanguageRegistry::new();
    let mut editor = editor_on(&registry, "x -> tools");
    editor.mount();

    let errors = editor
        .drain_events()
        .into_iter()
        .find_map(|event| match event {
            EditorEvent::Errors(errors) => Some(errors),
            _ => None,
        })
        .unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 1);
    assert!(errors[0].message.contains("tools"));
    assert_eq!(editor.markers().len(), 1);

    editor.host_mut().set_text("x -> summary");
    editor.content_changed();
    assert!(editor.markers().is_empty());
}

#[test]
fn test_re_extraction_is_stable() {
    let registry = LanguageRegistry::new();
    let mut editor = focused_editor(&registry, "a -> x\nb >> y");
    let before = editor.bound_variables().to_vec();
    editor.drain_events();

    editor.content_changed();
    assert_eq!(editor.bound_variables(), before.as_slice());
    assert!(!editor
        .drain_events()
        .iter()
        .any(|event| matches!(event, EditorEvent::VariablesChanged(_))));
}
