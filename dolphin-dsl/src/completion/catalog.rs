//! Tool options and the toolbox catalog offered by import completion.

use serde::{Deserialize, Serialize};

/// Id of the toolbox that groups the built-in agents.
pub const BUILT_IN_AGENT_ID: &str = "built-in-agent";
/// Display name of the built-in agent toolbox.
pub const BUILT_IN_AGENT_NAME: &str = "Agent";

/// A tool the call-tool provider can offer, written `box.tool` in imports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolOption {
    pub toolbox: Option<String>,
    pub name: String,
}

impl ToolOption {
    pub fn new(toolbox: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            toolbox: Some(toolbox.into()),
            name: name.into(),
        }
    }

    /// Parse `box.tool` at the first dot, so `a.b.c` is tool `b.c` in box `a`
    /// and [`Self::qualified`] gives the input back. Without a dot the whole
    /// string is the tool name.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((toolbox, name)) => Self::new(toolbox, name),
            None => Self {
                toolbox: None,
                name: raw.to_string(),
            },
        }
    }

    /// `tool(box)` display label.
    pub fn label(&self) -> String {
        match &self.toolbox {
            Some(toolbox) => format!("{}({})", self.name, toolbox),
            None => self.name.clone(),
        }
    }

    /// The `box.tool` form used in import statements.
    pub fn qualified(&self) -> String {
        match &self.toolbox {
            Some(toolbox) => format!("{}.{}", toolbox, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolbox {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTool {
    pub toolbox_id: String,
    pub toolbox_name: String,
    pub name: String,
}

impl CatalogTool {
    pub fn is_built_in_agent(&self) -> bool {
        self.toolbox_id == BUILT_IN_AGENT_ID
    }
}

/// Toolboxes and tools available for import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCatalog {
    pub toolboxes: Vec<Toolbox>,
    pub tools: Vec<CatalogTool>,
}

impl ToolCatalog {
    pub fn is_empty(&self) -> bool {
        self.toolboxes.is_empty() && self.tools.is_empty()
    }

    /// Toolboxes followed by the built-in agent box, when any toolbox exists.
    pub fn toolboxes_with_agent(&self) -> Vec<Toolbox> {
        if self.toolboxes.is_empty() {
            return Vec::new();
        }
        let mut boxes = self.toolboxes.clone();
        if !boxes.iter().any(|b| b.id == BUILT_IN_AGENT_ID) {
            boxes.push(Toolbox {
                id: BUILT_IN_AGENT_ID.to_string(),
                name: BUILT_IN_AGENT_NAME.to_string(),
            });
        }
        boxes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_option() {
        let opt = ToolOption::parse("web.search");
        assert_eq!(opt.toolbox.as_deref(), Some("web"));
        assert_eq!(opt.name, "search");
        assert_eq!(opt.label(), "search(web)");
        assert_eq!(opt.qualified(), "web.search");

        let bare = ToolOption::parse("search");
        assert_eq!(bare.toolbox, None);
        assert_eq!(bare.label(), "search");
    }

    #[test]
    fn test_parse_splits_at_first_dot() {
        let opt = ToolOption::parse("a.b.c");
        assert_eq!(opt.toolbox.as_deref(), Some("a"));
        assert_eq!(opt.name, "b.c");
    }

    #[test]
    fn test_agent_box_appended_once() {
        let catalog = ToolCatalog {
            toolboxes: vec![Toolbox {
                id: "1".into(),
                name: "web".into(),
            }],
            tools: Vec::new(),
        };
        let boxes = catalog.toolboxes_with_agent();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[1].name, BUILT_IN_AGENT_NAME);
        assert!(ToolCatalog::default().toolboxes_with_agent().is_empty());
    }
}
