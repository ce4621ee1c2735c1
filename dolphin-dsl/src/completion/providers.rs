//! The four Dolphin completion providers.

use super::catalog::{ToolCatalog, ToolOption, BUILT_IN_AGENT_ID, BUILT_IN_AGENT_NAME};
use super::{sort_key, CompletionItem, CompletionItemKind, CompletionProvider, CompletionRequest, ProviderKind};
use crate::context::{CompletionContext, ToolTrigger};
use crate::extract::BoundVariable;
use crate::grammar::DslGrammarConfig;
use crate::text::Range;
use std::sync::Arc;

const DATA_DETAIL: &str = "structured output of the upstream step";
const TEXT_DETAIL: &str = "text output of the upstream step";
const KEYWORD_DETAIL: &str = "keyword";
const TOOLBOX_DESCRIPTION: &str = "toolbox";
const TOOL_DESCRIPTION: &str = "tool";

// ============================================================================
// BLOCK VARIABLES
// ============================================================================

/// Offers upstream-step variables and bound variables after `$`.
#[derive(Debug, Clone)]
pub struct BlockVariableProvider {
    options: Vec<BoundVariable>,
}

impl BlockVariableProvider {
    pub fn new(options: Vec<BoundVariable>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &[BoundVariable] {
        &self.options
    }

    fn detail_for(label: &str) -> Option<String> {
        if label.ends_with(".data") {
            Some(DATA_DETAIL.to_string())
        } else if label.ends_with(".text") {
            Some(TEXT_DETAIL.to_string())
        } else {
            None
        }
    }
}

impl CompletionProvider for BlockVariableProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::BlockVariable
    }

    fn provide(&self, request: &CompletionRequest) -> Vec<CompletionItem> {
        if self.options.is_empty() || request.context != CompletionContext::TriggerVariable {
            return Vec::new();
        }

        let range = request.word_range();
        let count = self.options.len();
        self.options
            .iter()
            .enumerate()
            .map(|(index, option)| CompletionItem {
                label: option.label.clone(),
                description: None,
                insert_text: option.label.clone(),
                kind: CompletionItemKind::Variable,
                detail: Self::detail_for(&option.label),
                range,
                sort_text: Some(sort_key(index, count)),
            })
            .collect()
    }
}

// ============================================================================
// CALL TOOL
// ============================================================================

/// Offers imported tools after `@`, `tools=` and inside `tools=[...]`.
#[derive(Debug, Clone)]
pub struct CallToolProvider {
    tools: Vec<ToolOption>,
}

impl CallToolProvider {
    pub fn new(tools: Vec<ToolOption>) -> Self {
        Self { tools }
    }

    /// Build from `box.tool` strings.
    pub fn from_qualified<I, S>(tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(tools.into_iter().map(|t| ToolOption::parse(t.as_ref())).collect())
    }

    pub fn tools(&self) -> &[ToolOption] {
        &self.tools
    }

    fn insert_text(context: CompletionContext, name: &str) -> Option<String> {
        match context {
            CompletionContext::ToolCallAt(ToolTrigger::At) => Some(format!("{name}()")),
            CompletionContext::ToolCallAt(ToolTrigger::ToolsAssign) => Some(format!("[\"{name}\"]")),
            CompletionContext::ToolCallBracketElement => Some(format!("\"{name}\"")),
            _ => None,
        }
    }
}

impl CompletionProvider for CallToolProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CallTool
    }

    fn provide(&self, request: &CompletionRequest) -> Vec<CompletionItem> {
        if self.tools.is_empty() || !request.context.is_tool_call() {
            return Vec::new();
        }

        let range = request.word_range();
        let count = self.tools.len();
        self.tools
            .iter()
            .enumerate()
            .filter_map(|(index, tool)| {
                let insert_text = Self::insert_text(request.context, &tool.name)?;
                Some(CompletionItem {
                    label: tool.label(),
                    description: None,
                    insert_text,
                    kind: CompletionItemKind::Function,
                    detail: None,
                    range,
                    sort_text: Some(sort_key(index, count)),
                })
            })
            .collect()
    }
}

// ============================================================================
// KEYWORDS
// ============================================================================

/// Offers the reserved words when no other context applies.
#[derive(Debug, Clone)]
pub struct KeywordProvider {
    grammar: Arc<DslGrammarConfig>,
}

impl KeywordProvider {
    pub fn new(grammar: Arc<DslGrammarConfig>) -> Self {
        Self { grammar }
    }
}

impl CompletionProvider for KeywordProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Keyword
    }

    fn provide(&self, request: &CompletionRequest) -> Vec<CompletionItem> {
        if request.context != CompletionContext::KeywordDefault {
            return Vec::new();
        }

        // With nothing typed, the range reaches back over the previous char.
        let start_column = if request.word.word.is_empty() {
            request.word.start_column.saturating_sub(1).max(1)
        } else {
            request.word.start_column
        };
        let range = Range::on_line(request.position.line, start_column, request.position.column);

        self.grammar
            .keywords()
            .iter()
            .map(|keyword| CompletionItem {
                label: keyword.label.clone(),
                description: None,
                insert_text: keyword.insert_text.clone(),
                kind: CompletionItemKind::Keyword,
                detail: Some(KEYWORD_DETAIL.to_string()),
                range,
                sort_text: None,
            })
            .collect()
    }
}

// ============================================================================
// IMPORT TOOLS
// ============================================================================

/// Offers toolboxes and `box.tool` entries in `import` statements.
#[derive(Debug, Clone)]
pub struct ImportToolProvider {
    catalog: ToolCatalog,
}

impl ImportToolProvider {
    pub fn new(catalog: ToolCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }
}

impl CompletionProvider for ImportToolProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ImportTool
    }

    fn provide(&self, request: &CompletionRequest) -> Vec<CompletionItem> {
        if self.catalog.is_empty() || request.context != CompletionContext::ToolImport {
            return Vec::new();
        }

        let range = request.word_range();
        let boxes = self.catalog.toolboxes_with_agent().into_iter().map(|toolbox| {
            let description = (toolbox.id != BUILT_IN_AGENT_ID).then(|| TOOLBOX_DESCRIPTION.to_string());
            CompletionItem {
                label: toolbox.name.clone(),
                description,
                insert_text: toolbox.name,
                kind: CompletionItemKind::Folder,
                detail: None,
                range,
                sort_text: None,
            }
        });
        let tools = self.catalog.tools.iter().map(|tool| {
            let description = if tool.is_built_in_agent() {
                BUILT_IN_AGENT_NAME
            } else {
                TOOL_DESCRIPTION
            };
            CompletionItem {
                label: format!("{}({})", tool.name, tool.toolbox_name),
                description: Some(description.to_string()),
                insert_text: format!("{}.{}", tool.toolbox_name, tool.name),
                kind: CompletionItemKind::Function,
                detail: None,
                range,
                sort_text: None,
            }
        });

        let mut items: Vec<CompletionItem> = boxes.chain(tools).collect();
        let count = items.len();
        for (index, item) in items.iter_mut().enumerate() {
            item.sort_text = Some(sort_key(index, count));
        }
        items
    }
}
