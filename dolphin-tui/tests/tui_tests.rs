use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dolphin_dsl::{
    register_dolphin_language, DolphinTheme, DslGrammarConfig, EditorHost, LanguageRegistry,
    Position, TokenCategory,
};
use dolphin_tui::config::TuiConfig;
use dolphin_tui::keys::{map_key, Action, KeyMode};
use dolphin_tui::persistence::{self, PersistedState};
use dolphin_tui::state::{App, Outcome};
use dolphin_tui::theme::{hex_color, TuiTheme};
use proptest::prelude::*;
use ratatui::style::{Color, Modifier};

const CONFIG: &str = r#"
document_path = "prompts/agent.dph"
state_path = "tmp/dolphin-tui.json"
log_path = "tmp/dolphin-tui.log"
tick_rate_ms = 250
prompt_variables = ["search.data", "search.text"]
tools = ["web.search"]

[theme]
name = "dolphin-dark"

[[toolboxes]]
id = "web"
name = "Web"
tools = ["search", "fetch"]

[editor.validation]
undefined_variables = true
"#;

fn base_config() -> TuiConfig {
    TuiConfig::from_toml_str(CONFIG).unwrap()
}

fn app_with(document: &str) -> App {
    let registry = LanguageRegistry::new();
    register_dolphin_language(&registry, &DslGrammarConfig::shared());
    App::new(base_config(), registry, document)
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn type_str(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_action(Action::Edit(key(c)));
    }
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn config_parses_and_validates() {
    let config = base_config();
    assert!(config.validate().is_ok());
    assert!(config.editor.validation.undefined_variables);
    assert_eq!(config.editor_settings().theme, "dolphin-dark");
    assert_eq!(config.tool_options()[0].label(), "search(web)");
}

#[test]
fn config_builds_tool_catalog() {
    let catalog = base_config().tool_catalog();
    assert_eq!(catalog.toolboxes.len(), 1);
    let tools: Vec<&str> = catalog.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tools, vec!["search", "fetch"]);
    assert!(catalog.tools.iter().all(|t| t.toolbox_name == "Web"));
}

#[test]
fn config_requires_known_theme() {
    let mut config = base_config();
    config.theme.name = "synthwave".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_requires_tick_rate() {
    let mut config = base_config();
    config.tick_rate_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_unknown_fields() {
    let toml = CONFIG.replace("[theme]", "refresh_interval_ms = 5\n[theme]");
    assert!(TuiConfig::from_toml_str(&toml).is_err());
}

#[test]
fn config_rejects_duplicate_toolbox() {
    let mut config = base_config();
    let duplicate = config.toolboxes[0].clone();
    config.toolboxes.push(duplicate);
    assert!(config.validate().is_err());
}

// ============================================================================
// THEME
// ============================================================================

#[test]
fn theme_converts_token_rules() {
    let theme = TuiTheme::from_dolphin(&DolphinTheme::light());
    let keyword = theme.token_style(TokenCategory::Keyword);
    assert_eq!(keyword.fg, Some(Color::Rgb(0xc8, 0x17, 0x9e)));
    assert!(keyword.add_modifier.contains(Modifier::BOLD));
    let comment = theme.token_style(TokenCategory::Comment);
    assert!(comment.add_modifier.contains(Modifier::ITALIC));
}

#[test]
fn invalid_hex_resets_colour() {
    assert_eq!(hex_color("#zzzzzz"), Color::Reset);
    assert_eq!(hex_color("123456"), Color::Reset);
    assert_eq!(hex_color("#000000"), Color::Rgb(0, 0, 0));
}

// ============================================================================
// APP
// ============================================================================

#[test]
fn dollar_opens_variable_suggestions() {
    let mut app = app_with("");
    app.handle_action(Action::Focus);
    assert_eq!(app.key_mode(), KeyMode::Editing);

    type_str(&mut app, "$");
    assert_eq!(app.key_mode(), KeyMode::Completing);
    let labels: Vec<String> = app
        .completion
        .as_ref()
        .unwrap()
        .items
        .iter()
        .map(|item| item.label.clone())
        .collect();
    assert_eq!(labels, vec!["search.data", "search.text"]);

    app.handle_action(Action::NextCompletion);
    app.handle_action(Action::AcceptCompletion);
    assert_eq!(app.value(), "$search.text");
    assert!(app.completion.is_none());
    assert!(app.modified);
}

#[test]
fn keyword_after_space_keeps_typed_text() {
    let mut app = app_with("");
    app.handle_action(Action::Focus);
    type_str(&mut app, "say ");
    app.handle_action(Action::TriggerCompletion);
    let first = app.completion.as_ref().unwrap().selected_item().unwrap().clone();
    assert_eq!(first.label, "if/");
    assert_eq!(first.range.start_column, 4);

    app.handle_action(Action::AcceptCompletion);
    assert_eq!(app.value(), "say if/");
}

#[test]
fn keyword_replaces_partial_word() {
    let mut app = app_with("");
    app.handle_action(Action::Focus);
    type_str(&mut app, "say el");
    app.handle_action(Action::TriggerCompletion);
    let popup = app.completion.as_mut().unwrap();
    let elif = popup.items.iter().position(|item| item.label == "elif").unwrap();
    popup.selected = elif;

    app.handle_action(Action::AcceptCompletion);
    assert_eq!(app.value(), "say elif");
}

#[test]
fn blur_closes_popup_and_releases_providers() {
    let mut app = app_with("");
    app.handle_action(Action::Focus);
    type_str(&mut app, "$");
    assert!(app.completion.is_some());

    app.handle_action(Action::Blur);
    assert!(app.completion.is_none());
    assert!(app.editor.active_providers().is_empty());
    assert_eq!(app.key_mode(), KeyMode::Normal);
}

#[test]
fn errors_and_variables_follow_edits() {
    let mut app = app_with("x -> tools");
    assert_eq!(app.errors.len(), 1);
    assert_eq!(app.variables.len(), 1);

    app.handle_action(Action::Focus);
    app.handle_action(Action::Edit(KeyEvent::new(KeyCode::End, KeyModifiers::NONE)));
    type_str(&mut app, "_list");
    assert!(app.errors.is_empty());
    assert_eq!(app.variables[0].value, "tools_list");
}

#[test]
fn auto_height_tracks_line_count() {
    let app = app_with("a\nb\nc");
    assert_eq!(app.editor.host().height(), 3 * 22 + 16);
    assert_eq!(app.editor_rows(), 4);
}

#[test]
fn read_only_ignores_edits() {
    let registry = LanguageRegistry::new();
    let mut config = base_config();
    config.editor.layout.read_only = true;
    let mut app = App::new(config, registry, "fixed");
    app.handle_action(Action::Focus);
    type_str(&mut app, "abc");
    assert_eq!(app.value(), "fixed");
    assert!(!app.modified);
}

#[test]
fn state_round_trips_through_app() {
    let mut app = app_with("one\ntwo");
    app.handle_action(Action::ToggleSidebar);
    app.restore(&PersistedState {
        cursor: Position::new(2, 3),
        sidebar_visible: false,
    });
    let state = app.persisted_state();
    assert_eq!(state.cursor, Position::new(2, 3));
    assert!(!state.sidebar_visible);
    assert_eq!(app.editor.host().position(), Position::new(2, 3));
}

#[test]
fn quit_and_save_are_outcomes() {
    let mut app = app_with("");
    assert_eq!(app.handle_action(Action::Quit), Outcome::Quit);
    assert_eq!(app.handle_action(Action::Save), Outcome::Save);
    app.mark_saved();
    assert!(!app.modified);
    assert_eq!(app.notifications.len(), 1);
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn persistence_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");
    assert!(persistence::load(&path).unwrap().is_none());

    let state = PersistedState {
        cursor: Position::new(4, 2),
        sidebar_visible: true,
    };
    persistence::save(&path, &state).unwrap();
    assert_eq!(persistence::load(&path).unwrap(), Some(state));
}

#[test]
fn missing_document_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.dph");
    assert_eq!(persistence::load_document(&path).unwrap(), "");
    persistence::save_document(&path, "a -> b").unwrap();
    assert_eq!(persistence::load_document(&path).unwrap(), "a -> b");
}

// ============================================================================
// KEYBINDINGS
// ============================================================================

proptest! {
    #[test]
    fn printable_keys_edit_while_editing(c in proptest::char::range('!', '~')) {
        let event = key(c);
        prop_assert_eq!(map_key(event, KeyMode::Editing), Some(Action::Edit(event)));
    }

    #[test]
    fn ctrl_q_quits_in_every_mode(mode_idx in 0usize..3) {
        let mode = [KeyMode::Normal, KeyMode::Editing, KeyMode::Completing][mode_idx];
        let event = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        prop_assert_eq!(map_key(event, mode), Some(Action::Quit));
    }

    #[test]
    fn unbound_normal_keys_do_nothing(c in "[ac-hj-pr-z]") {
        let ch = c.chars().next().unwrap();
        prop_assert_eq!(map_key(key(ch), KeyMode::Normal), None);
    }
}

#[test]
fn completing_keys_drive_popup() {
    let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
    let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
    let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
    assert_eq!(map_key(enter, KeyMode::Completing), Some(Action::AcceptCompletion));
    assert_eq!(map_key(esc, KeyMode::Completing), Some(Action::DismissCompletion));
    assert_eq!(map_key(down, KeyMode::Completing), Some(Action::NextCompletion));
    assert_eq!(map_key(esc, KeyMode::Editing), Some(Action::Blur));
    assert_eq!(map_key(enter, KeyMode::Normal), Some(Action::Focus));
}
