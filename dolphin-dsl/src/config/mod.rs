//! Editor settings.
//!
//! Settings load from TOML and are checked with [`EditorSettings::validate`]
//! before an editor is built from them. Every field has a default matching the
//! stock editor, so an empty document is a valid configuration.

use crate::grammar::LANGUAGE_ID;
use crate::theme::{DolphinTheme, DEFAULT_THEME};
use crate::validate::ValidationRules;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Height of one editor line in pixels.
pub const LINE_HEIGHT: u32 = 22;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// How the editor height is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case", deny_unknown_fields)]
pub enum EditorHeight {
    /// Grow with the content between optional bounds.
    Auto {
        #[serde(default)]
        min: Option<u32>,
        #[serde(default)]
        max: Option<u32>,
    },
    Fixed { pixels: u32 },
}

impl Default for EditorHeight {
    fn default() -> Self {
        EditorHeight::Auto {
            min: None,
            max: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSettings {
    pub height: EditorHeight,
    pub line_height: u32,
    pub show_line_numbers: bool,
    pub read_only: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            height: EditorHeight::default(),
            line_height: LINE_HEIGHT,
            show_line_numbers: true,
            read_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorSettings {
    pub language_id: String,
    pub theme: String,
    pub layout: LayoutSettings,
    pub validation: ValidationRules,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            language_id: LANGUAGE_ID.to_string(),
            theme: DEFAULT_THEME.to_string(),
            layout: LayoutSettings::default(),
            validation: ValidationRules::default(),
        }
    }
}

impl EditorSettings {
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let settings: EditorSettings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.language_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "language_id",
                reason: "must not be empty".to_string(),
            });
        }
        if DolphinTheme::by_name(&self.theme).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "theme",
                reason: format!("unknown theme '{}'", self.theme),
            });
        }
        if self.layout.line_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "layout.line_height",
                reason: "must be > 0".to_string(),
            });
        }
        match self.layout.height {
            EditorHeight::Fixed { pixels: 0 } => {
                return Err(ConfigError::InvalidValue {
                    field: "layout.height.pixels",
                    reason: "must be > 0".to_string(),
                });
            }
            EditorHeight::Auto {
                min: Some(min),
                max: Some(max),
            } if max < min => {
                return Err(ConfigError::InvalidValue {
                    field: "layout.height.max",
                    reason: "must be >= min".to_string(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// The configured theme, falling back to the default one.
    pub fn resolve_theme(&self) -> DolphinTheme {
        DolphinTheme::by_name(&self.theme).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let settings = EditorSettings::from_toml_str("").unwrap();
        assert_eq!(settings, EditorSettings::default());
        assert_eq!(settings.language_id, "dolphin");
        assert!(settings.validation.reserved_keywords);
        assert!(!settings.validation.undefined_tools);
    }

    #[test]
    fn test_parse_layout_and_rules() {
        let settings = EditorSettings::from_toml_str(
            r#"
            theme = "dolphin-dark"

            [layout]
            height = { mode = "auto", min = 66, max = 220 }
            show_line_numbers = false

            [validation]
            unmatched_delimiters = true
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.layout.height,
            EditorHeight::Auto {
                min: Some(66),
                max: Some(220)
            }
        );
        assert!(!settings.layout.show_line_numbers);
        assert!(settings.validation.unmatched_delimiters);
        assert!(settings.resolve_theme().dark);
    }

    #[test]
    fn test_fixed_height() {
        let settings =
            EditorSettings::from_toml_str("[layout]\nheight = { mode = \"fixed\", pixels = 300 }")
                .unwrap();
        assert_eq!(settings.layout.height, EditorHeight::Fixed { pixels: 300 });
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = EditorSettings::from_toml_str("theme = \"neon\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "theme", .. }));

        let err = EditorSettings::from_toml_str(
            "[layout]\nheight = { mode = \"auto\", min = 200, max = 100 }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "layout.height.max",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = EditorSettings::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
