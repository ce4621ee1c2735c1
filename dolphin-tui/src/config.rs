//! Configuration loading for the Dolphin TUI.
//!
//! Paths and the tick rate are required. Option lists and the embedded editor
//! settings default to empty / stock values.

use dolphin_dsl::completion::{CatalogTool, Toolbox};
use dolphin_dsl::{BoundVariable, DolphinTheme, EditorSettings, ToolCatalog, ToolOption};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub document_path: PathBuf,
    pub state_path: PathBuf,
    pub log_path: PathBuf,
    pub tick_rate_ms: u64,
    pub theme: ThemeConfig,
    /// Upstream-step variables offered after `$`.
    #[serde(default)]
    pub prompt_variables: Vec<String>,
    /// `box.tool` names offered after `@` and in `tools=[...]`.
    #[serde(default)]
    pub tools: Vec<String>,
    /// Toolboxes offered in `import` statements.
    #[serde(default)]
    pub toolboxes: Vec<ToolboxConfig>,
    #[serde(default)]
    pub editor: EditorSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolboxConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or DOLPHIN_TUI_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error(transparent)]
    Editor(#[from] dolphin_dsl::ConfigError),
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: TuiConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "document_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.state_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "state_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_rate_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.theme.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: "must not be empty".to_string(),
            });
        }
        if DolphinTheme::by_name(&self.theme.name).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: format!("unknown theme '{}'", self.theme.name),
            });
        }
        if let Some(tool) = self.tools.iter().find(|t| t.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "tools",
                reason: format!("empty tool name '{}'", tool),
            });
        }
        for (idx, toolbox) in self.toolboxes.iter().enumerate() {
            if toolbox.id.trim().is_empty() || toolbox.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "toolboxes",
                    reason: format!("toolbox #{} needs an id and a name", idx + 1),
                });
            }
            if self.toolboxes[..idx].iter().any(|other| other.id == toolbox.id) {
                return Err(ConfigError::InvalidValue {
                    field: "toolboxes",
                    reason: format!("duplicate toolbox id '{}'", toolbox.id),
                });
            }
        }
        self.editor.validate()?;
        Ok(())
    }

    /// Editor settings with the TUI theme applied.
    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            theme: self.theme.name.clone(),
            ..self.editor.clone()
        }
    }

    pub fn prompt_variables(&self) -> Vec<BoundVariable> {
        self.prompt_variables
            .iter()
            .map(|name| BoundVariable::new(name.trim()))
            .collect()
    }

    pub fn tool_options(&self) -> Vec<ToolOption> {
        self.tools.iter().map(|raw| ToolOption::parse(raw.trim())).collect()
    }

    pub fn tool_catalog(&self) -> ToolCatalog {
        ToolCatalog {
            toolboxes: self
                .toolboxes
                .iter()
                .map(|toolbox| Toolbox {
                    id: toolbox.id.clone(),
                    name: toolbox.name.clone(),
                })
                .collect(),
            tools: self
                .toolboxes
                .iter()
                .flat_map(|toolbox| {
                    toolbox.tools.iter().map(|tool| CatalogTool {
                        toolbox_id: toolbox.id.clone(),
                        toolbox_name: toolbox.name.clone(),
                        name: tool.clone(),
                    })
                })
                .collect(),
        }
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("DOLPHIN_TUI_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
