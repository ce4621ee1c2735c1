//! Reusable widget components.

pub mod completion;
pub mod syntax;

pub use completion::CompletionList;
pub use syntax::SyntaxHighlighter;
