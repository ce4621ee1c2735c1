//! View rendering.

pub mod editor;

use crate::state::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);
    editor::render(f, app, layout[1]);
    render_footer(f, app, layout[2]);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let modified = if app.modified { " [+]" } else { "" };
    let focus = if app.editor.is_focused() { "EDIT" } else { "NORMAL" };
    let title = format!(
        "DOLPHIN | {}{} | {} | {} error(s)",
        app.config.document_path.display(),
        modified,
        focus,
        app.errors.len()
    );
    let block = Block::default().borders(Borders::ALL).title(Span::styled(
        title,
        Style::default().fg(app.theme.primary),
    ));
    f.render_widget(block, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let help = if app.editor.is_focused() {
        "Esc leave editor • Ctrl+Space suggest • Ctrl+S save • Ctrl+B sidebar • Ctrl+Q quit"
    } else {
        "i edit • b sidebar • Ctrl+S save • q quit"
    };
    let (text, style) = if let Some(note) = app.notifications.last() {
        let color = app.theme.notification_color(note.level);
        (
            format!("{}: {}", note.label(), note.message),
            Style::default().fg(color),
        )
    } else {
        (help.to_string(), Style::default().fg(app.theme.text_dim))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}
