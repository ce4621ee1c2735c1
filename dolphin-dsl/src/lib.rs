//! Dolphin DSL - Editor Tooling for the Dolphin Prompt Language
//!
//! This crate provides the language services an editor needs for Dolphin
//! scripts embedded in agent prompts: highlighting, autocompletion, variable
//! extraction and lightweight static validation.
//!
//! Architecture:
//! ```text
//! Keystroke (host editor)
//!     ↓
//! DolphinEditor adapter (host)
//!     ↓
//! VariableExtractor ──→ bound variables ──→ completion providers (re-registered)
//!     ↓
//! Cursor-context classifier (context) ──→ trigger suggestions
//!     ↓
//! Validator ──→ diagnostic markers
//! ```
//!
//! All components share one [`DslGrammarConfig`], built once and passed by `Arc`.

pub mod completion;
pub mod config;
pub mod context;
pub mod extract;
pub mod grammar;
pub mod host;
pub mod lexer;
pub mod prompt;
pub mod text;
pub mod theme;
pub mod validate;

// Re-export key types for convenience
pub use completion::{
    BlockVariableProvider, CallToolProvider, CompletionItem, CompletionItemKind,
    CompletionProvider, CompletionRequest, ImportToolProvider, KeywordProvider, ProviderKind,
    ToolCatalog, ToolOption,
};
pub use config::{ConfigError, EditorHeight, EditorSettings, LayoutSettings};
pub use context::{classify, is_last_comma_in_tools_brackets, CompletionContext, ToolTrigger};
pub use extract::{dedupe_by_value, BoundVariable, ExtractScope, VariableExtractor};
pub use grammar::{DslGrammarConfig, GrammarError, Keyword, LANGUAGE_ID};
pub use host::{
    register_dolphin_language, DolphinEditor, EditorEvent, EditorHost, LanguageRegistry,
    MarkerSummary, MemoryHost, Registration,
};
pub use lexer::{Span, Token, TokenCategory, Tokenizer};
pub use prompt::{DolphinModule, DolphinTemplate, OutputBindings, PromptComposition};
pub use text::{Position, Range, WordAtPosition};
pub use theme::DolphinTheme;
pub use validate::{
    Diagnostic, DiagnosticCode, Issue, Severity, ValidationContext, ValidationRules, Validator,
};
