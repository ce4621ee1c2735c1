//! Terminal colours derived from a Dolphin theme.

use crate::notifications::NotificationLevel;
use dolphin_dsl::theme::{parse_hex, FontStyle};
use dolphin_dsl::{DolphinTheme, Severity, TokenCategory};
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct TuiTheme {
    pub source: DolphinTheme,
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
}

impl TuiTheme {
    pub fn from_dolphin(theme: &DolphinTheme) -> Self {
        let (highlight, dim, border) = if theme.dark {
            (
                Color::Rgb(43, 45, 48),
                Color::Rgb(111, 115, 122),
                Color::Rgb(67, 69, 74),
            )
        } else {
            (
                Color::Rgb(232, 240, 254),
                Color::Rgb(138, 144, 153),
                Color::Rgb(200, 204, 210),
            )
        };
        let primary = theme
            .style_for(TokenCategory::Variable)
            .map_or(Color::Blue, |style| hex_color(&style.foreground));
        Self {
            source: theme.clone(),
            bg: hex_color(&theme.background),
            bg_highlight: highlight,
            primary,
            text: hex_color(&theme.foreground),
            text_dim: dim,
            border,
            border_focus: primary,
            success: Color::Rgb(46, 139, 87),
            warning: Color::Rgb(212, 112, 15),
            error: Color::Rgb(220, 38, 38),
            info: primary,
        }
    }

    /// Style for one token category.
    pub fn token_style(&self, category: TokenCategory) -> Style {
        let Some(rule) = self.source.style_for(category) else {
            return Style::default().fg(self.text);
        };
        let style = Style::default().fg(hex_color(&rule.foreground));
        match rule.font_style {
            FontStyle::Normal => style,
            FontStyle::Bold => style.add_modifier(Modifier::BOLD),
            FontStyle::Italic => style.add_modifier(Modifier::ITALIC),
        }
    }

    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
            Severity::Hint => self.text_dim,
        }
    }

    pub fn notification_color(&self, level: NotificationLevel) -> Color {
        match level {
            NotificationLevel::Info => self.info,
            NotificationLevel::Warning => self.warning,
            NotificationLevel::Error => self.error,
            NotificationLevel::Success => self.success,
        }
    }
}

/// `#rrggbb` to an RGB colour; anything else resets to the terminal default.
pub fn hex_color(hex: &str) -> Color {
    parse_hex(hex).map_or(Color::Reset, |(r, g, b)| Color::Rgb(r, g, b))
}
