//! Suggestion popup.

use crate::state::CompletionPopup;
use crate::theme::TuiTheme;
use dolphin_dsl::CompletionItemKind;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

const MAX_VISIBLE: u16 = 8;

pub struct CompletionList<'a> {
    pub popup: &'a CompletionPopup,
    pub theme: &'a TuiTheme,
}

impl<'a> CompletionList<'a> {
    /// Popup rectangle anchored below (or above) the cursor cell, kept inside
    /// `bounds`.
    pub fn area(&self, cursor_x: u16, cursor_y: u16, bounds: Rect) -> Rect {
        let widest = self
            .popup
            .items
            .iter()
            .map(|item| item.label.chars().count() + kind_tag(item.kind).len() + 1)
            .max()
            .unwrap_or(0);
        let width = u16::try_from(widest + 4)
            .unwrap_or(u16::MAX)
            .clamp(16, bounds.width.max(16));
        let rows = u16::try_from(self.popup.items.len())
            .unwrap_or(u16::MAX)
            .min(MAX_VISIBLE);
        let height = rows + 2;

        let below = cursor_y.saturating_add(1);
        let y = if below.saturating_add(height) <= bounds.bottom() {
            below
        } else {
            cursor_y.saturating_sub(height).max(bounds.y)
        };
        let x = cursor_x.min(bounds.right().saturating_sub(width)).max(bounds.x);
        Rect {
            x,
            y,
            width: width.min(bounds.width),
            height: height.min(bounds.height),
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .popup
            .items
            .iter()
            .map(|item| {
                let mut spans = vec![
                    Span::styled(
                        format!("{} ", kind_tag(item.kind)),
                        Style::default().fg(self.theme.text_dim),
                    ),
                    Span::styled(item.label.clone(), Style::default().fg(self.theme.text)),
                ];
                if let Some(detail) = item.detail.as_ref().or(item.description.as_ref()) {
                    spans.push(Span::styled(
                        format!("  {}", detail),
                        Style::default().fg(self.theme.text_dim),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.border_focus)),
            )
            .style(Style::default().bg(self.theme.bg))
            .highlight_style(
                Style::default()
                    .bg(self.theme.bg_highlight)
                    .add_modifier(Modifier::BOLD),
            );
        let mut state = ListState::default().with_selected(Some(self.popup.selected));

        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut state);
    }
}

fn kind_tag(kind: CompletionItemKind) -> &'static str {
    match kind {
        CompletionItemKind::Keyword => "kw",
        CompletionItemKind::Variable => "$",
        CompletionItemKind::Function => "fn",
        CompletionItemKind::Folder => "box",
    }
}
