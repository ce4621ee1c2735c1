//! Dolphin editor view: highlighted buffer, suggestion popup and sidebar.

use crate::state::App;
use crate::widgets::{CompletionList, SyntaxHighlighter};
use dolphin_dsl::{text, EditorHeight, EditorHost};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (editor_area, sidebar_area) = if app.sidebar_visible {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let editor_area = match app.editor.settings().layout.height {
        EditorHeight::Auto { .. } => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(app.editor_rows() + 2), Constraint::Min(0)])
                .split(editor_area);
            chunks[0]
        }
        EditorHeight::Fixed { .. } => editor_area,
    };

    render_buffer(f, app, editor_area);
    if let Some(sidebar) = sidebar_area {
        render_sidebar(f, app, sidebar);
    }
}

fn render_buffer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let host = app.editor.host();
    let content = host.value();
    let markers = app.markers();
    let highlighter = SyntaxHighlighter {
        tokenizer: &app.tokenizer,
        theme: &app.theme,
        line_numbers: app.editor.settings().layout.show_line_numbers,
    };

    let border = if app.editor.is_focused() {
        app.theme.border_focus
    } else {
        app.theme.border
    };
    let block = Block::default()
        .title("Dolphin")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);

    let cursor = host.position();
    let visible = usize::from(inner.height.max(1));
    let scroll = cursor.line.saturating_sub(visible);
    let paragraph = Paragraph::new(highlighter.highlight(&content, &markers))
        .block(block)
        .style(Style::default().bg(app.theme.bg).fg(app.theme.text))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(paragraph, area);

    if !app.editor.is_focused() {
        return;
    }

    let line = host.line_content(cursor.line);
    let before = text::before_column(&line, cursor.column);
    let offset = usize::from(highlighter.gutter_width(host.line_count())) + Span::raw(before).width();
    let cursor_x = inner
        .x
        .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX))
        .min(inner.right().saturating_sub(1));
    let cursor_y = inner
        .y
        .saturating_add(u16::try_from(cursor.line - 1 - scroll).unwrap_or(u16::MAX))
        .min(inner.bottom().saturating_sub(1));
    f.set_cursor(cursor_x, cursor_y);

    if let Some(popup) = app.completion.as_ref() {
        let list = CompletionList {
            popup,
            theme: &app.theme,
        };
        let popup_area = list.area(cursor_x, cursor_y, f.size());
        list.render(f, popup_area);
    }
}

fn render_sidebar(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let diagnostics: Vec<ListItem> = app
        .markers()
        .iter()
        .map(|marker| {
            ListItem::new(format!(
                "Line {} Col {}: {}",
                marker.range.start_line, marker.range.start_column, marker.message
            ))
            .style(Style::default().fg(app.theme.severity_color(marker.severity)))
        })
        .collect();
    let list = List::new(diagnostics)
        .block(Block::default().title("Problems").borders(Borders::ALL));
    f.render_widget(list, chunks[0]);

    let variables: Vec<ListItem> = app
        .variables
        .iter()
        .map(|variable| ListItem::new(format!("${}", variable.value)))
        .collect();
    let list = List::new(variables)
        .block(Block::default().title("Bound variables").borders(Borders::ALL));
    f.render_widget(list, chunks[1]);
}
