//! Dolphin colour themes.
//!
//! A theme is a set of per-category token rules with hex colours. Hosts map
//! them onto whatever styling their widget understands.

use crate::lexer::TokenCategory;
use serde::{Deserialize, Serialize};

pub const DEFAULT_THEME: &str = "dolphin";
pub const DARK_THEME: &str = "dolphin-dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
}

/// Colour rule for one token category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStyle {
    pub category: TokenCategory,
    /// `#rrggbb`
    pub foreground: String,
    #[serde(default)]
    pub font_style: FontStyle,
}

impl TokenStyle {
    fn new(category: TokenCategory, foreground: &str, font_style: FontStyle) -> Self {
        Self {
            category,
            foreground: foreground.to_string(),
            font_style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DolphinTheme {
    pub name: String,
    pub dark: bool,
    pub background: String,
    pub foreground: String,
    pub rules: Vec<TokenStyle>,
}

impl DolphinTheme {
    /// Light theme used by default.
    pub fn light() -> Self {
        Self {
            name: DEFAULT_THEME.to_string(),
            dark: false,
            background: "#ffffff".to_string(),
            foreground: "#1f2329".to_string(),
            rules: vec![
                TokenStyle::new(TokenCategory::Comment, "#8a9099", FontStyle::Italic),
                TokenStyle::new(TokenCategory::Variable, "#126ee3", FontStyle::Normal),
                TokenStyle::new(TokenCategory::Keyword, "#c8179e", FontStyle::Bold),
                TokenStyle::new(TokenCategory::String, "#2e8b57", FontStyle::Normal),
                TokenStyle::new(TokenCategory::Number, "#d4700f", FontStyle::Normal),
                TokenStyle::new(TokenCategory::Delimiter, "#6b7078", FontStyle::Normal),
                TokenStyle::new(TokenCategory::CallFunction, "#7a3ee8", FontStyle::Normal),
                TokenStyle::new(TokenCategory::ToolsFunction, "#7a3ee8", FontStyle::Normal),
                TokenStyle::new(TokenCategory::PlainText, "#1f2329", FontStyle::Normal),
            ],
        }
    }

    pub fn dark() -> Self {
        Self {
            name: DARK_THEME.to_string(),
            dark: true,
            background: "#1e1f22".to_string(),
            foreground: "#d4d7dc".to_string(),
            rules: vec![
                TokenStyle::new(TokenCategory::Comment, "#6f737a", FontStyle::Italic),
                TokenStyle::new(TokenCategory::Variable, "#56a8f5", FontStyle::Normal),
                TokenStyle::new(TokenCategory::Keyword, "#e06cc0", FontStyle::Bold),
                TokenStyle::new(TokenCategory::String, "#6aab73", FontStyle::Normal),
                TokenStyle::new(TokenCategory::Number, "#e5a34b", FontStyle::Normal),
                TokenStyle::new(TokenCategory::Delimiter, "#9da0a8", FontStyle::Normal),
                TokenStyle::new(TokenCategory::CallFunction, "#b589f5", FontStyle::Normal),
                TokenStyle::new(TokenCategory::ToolsFunction, "#b589f5", FontStyle::Normal),
                TokenStyle::new(TokenCategory::PlainText, "#d4d7dc", FontStyle::Normal),
            ],
        }
    }

    /// Built-in theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            DEFAULT_THEME => Some(Self::light()),
            DARK_THEME => Some(Self::dark()),
            _ => None,
        }
    }

    pub fn style_for(&self, category: TokenCategory) -> Option<&TokenStyle> {
        self.rules.iter().find(|rule| rule.category == category)
    }
}

impl Default for DolphinTheme {
    fn default() -> Self {
        Self::light()
    }
}

/// Parse `#rrggbb` into its components.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
