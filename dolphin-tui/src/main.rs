//! Dolphin TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dolphin_dsl::{register_dolphin_language, DslGrammarConfig, LanguageRegistry};
use dolphin_tui::config::TuiConfig;
use dolphin_tui::error::TuiError;
use dolphin_tui::events::TuiEvent;
use dolphin_tui::keys::map_key;
use dolphin_tui::notifications::NotificationLevel;
use dolphin_tui::persistence;
use dolphin_tui::state::{App, Outcome};
use dolphin_tui::telemetry;
use dolphin_tui::views::render_view;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    telemetry::init(&config.log_path)?;

    let registry = LanguageRegistry::new();
    register_dolphin_language(&registry, &DslGrammarConfig::shared());

    let document = persistence::load_document(&config.document_path)?;
    let state_path = config.state_path.clone();
    let mut app = App::new(config, registry, &document);
    match persistence::load(&state_path) {
        Ok(Some(state)) => app.restore(&state),
        Ok(None) => {}
        Err(err) => app.notify(
            NotificationLevel::Warning,
            format!("Ignoring saved state: {}", err),
        ),
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard {};

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx.clone());

    let tick_rate = Duration::from_millis(app.config.tick_rate_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                let _ = event_tx.send(TuiEvent::Tick).await;
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, event)? {
                    break;
                }
            }
        }
    }

    if let Err(err) = persistence::save(&state_path, &app.persisted_state()) {
        tracing::warn!(error = %err, "failed to save UI state");
    }

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let sent = match evt {
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        sender.blocking_send(TuiEvent::Input(key))
                    }
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    });
}

fn handle_event(app: &mut App, event: TuiEvent) -> Result<bool, TuiError> {
    match event {
        TuiEvent::Input(key) => {
            let Some(action) = map_key(key, app.key_mode()) else {
                return Ok(false);
            };
            match app.handle_action(action) {
                Outcome::Quit => return Ok(true),
                Outcome::Save => save_document(app),
                Outcome::Continue => {}
            }
        }
        TuiEvent::Tick => app.on_tick(),
        TuiEvent::Resize { width, height } => {
            tracing::trace!(width, height, "terminal resized");
        }
    }
    Ok(false)
}

fn save_document(app: &mut App) {
    match persistence::save_document(&app.config.document_path, &app.value()) {
        Ok(()) => app.mark_saved(),
        Err(err) => app.notify(NotificationLevel::Error, format!("Save failed: {}", err)),
    }
}
