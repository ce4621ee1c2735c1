//! Cursor-context classification.
//!
//! The classifier looks at the text before the caret (and the whole line, for
//! the `tools=[...]` scan) and decides which completion source applies. It is a
//! pure function so every branch can be tested without an editor.

mod brackets;

pub use brackets::is_last_comma_in_tools_brackets;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Which suffix opened a tool-call completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolTrigger {
    /// `@` typed: insert a bare call.
    At,
    /// `tools=` typed: insert a one-element list.
    ToolsAssign,
}

/// Completion context at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionContext {
    TriggerVariable,
    ToolCallAt(ToolTrigger),
    /// After `, ` inside an open `tools=[...]` literal.
    ToolCallBracketElement,
    ToolImport,
    KeywordDefault,
}

impl CompletionContext {
    pub fn is_tool_call(&self) -> bool {
        matches!(
            self,
            CompletionContext::ToolCallAt(_) | CompletionContext::ToolCallBracketElement
        )
    }

    /// Whether the adapter should open the suggestion popup on its own.
    pub fn should_trigger_suggest(&self) -> bool {
        matches!(self, CompletionContext::TriggerVariable) || self.is_tool_call()
    }
}

/// Classify the cursor context. First matching branch wins.
pub fn classify(before_cursor: &str, line_content: &str) -> CompletionContext {
    let context = if before_cursor.ends_with('$') {
        CompletionContext::TriggerVariable
    } else if before_cursor.ends_with('@') {
        CompletionContext::ToolCallAt(ToolTrigger::At)
    } else if before_cursor.ends_with("tools=") {
        CompletionContext::ToolCallAt(ToolTrigger::ToolsAssign)
    } else if before_cursor.ends_with(", ") && is_last_comma_in_tools_brackets(line_content) {
        CompletionContext::ToolCallBracketElement
    } else if before_cursor.ends_with("import ")
        || (before_cursor.starts_with("import ") && before_cursor.ends_with(", "))
    {
        CompletionContext::ToolImport
    } else {
        CompletionContext::KeywordDefault
    };

    trace!(?context, before_cursor, "classified cursor context");
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_trigger() {
        assert_eq!(classify("say $", "say $"), CompletionContext::TriggerVariable);
    }

    #[test]
    fn test_tool_triggers() {
        assert_eq!(
            classify("call @", "call @"),
            CompletionContext::ToolCallAt(ToolTrigger::At)
        );
        assert_eq!(
            classify("run tools=", "run tools="),
            CompletionContext::ToolCallAt(ToolTrigger::ToolsAssign)
        );
    }

    #[test]
    fn test_bracket_element() {
        let line = r#"tools=["a", "b", ]"#;
        let before = r#"tools=["a", "b", "#;
        assert_eq!(
            classify(before, line),
            CompletionContext::ToolCallBracketElement
        );
    }

    #[test]
    fn test_comma_outside_tools_literal_is_default() {
        let line = r#"tools=["a"], x=[1,2,]"#;
        assert_eq!(classify(line, line), CompletionContext::KeywordDefault);
        let with_space = r#"tools=["a"], x=[1, "#;
        assert_eq!(
            classify(with_space, with_space),
            CompletionContext::KeywordDefault
        );
    }

    #[test]
    fn test_import_contexts() {
        assert_eq!(classify("import ", "import "), CompletionContext::ToolImport);
        assert_eq!(
            classify("import web.search, ", "import web.search, "),
            CompletionContext::ToolImport
        );
        assert_eq!(
            classify("note, ", "note, "),
            CompletionContext::KeywordDefault
        );
    }

    #[test]
    fn test_variable_wins_over_tools() {
        // `$` checked before anything else
        assert_eq!(
            classify("tools=[$", "tools=[$]"),
            CompletionContext::TriggerVariable
        );
    }

    #[test]
    fn test_should_trigger_suggest() {
        assert!(CompletionContext::TriggerVariable.should_trigger_suggest());
        assert!(CompletionContext::ToolCallAt(ToolTrigger::At).should_trigger_suggest());
        assert!(CompletionContext::ToolCallBracketElement.should_trigger_suggest());
        assert!(!CompletionContext::ToolImport.should_trigger_suggest());
        assert!(!CompletionContext::KeywordDefault.should_trigger_suggest());
    }
}
