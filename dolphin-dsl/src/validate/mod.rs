//! Static validation of Dolphin source.
//!
//! Every pass produces the full diagnostic set for the document; callers
//! replace their previous markers with it. Binding checks always run, the
//! other rules are opt-in through [`ValidationRules`].

mod rules;

use crate::extract::VariableExtractor;
use crate::grammar::DslGrammarConfig;
use crate::text::{self, Range};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// DIAGNOSTICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

/// Stable identifier of the check that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    ReservedKeyword,
    InvalidVariableName,
    UnmatchedDelimiter,
    UnclosedString,
    DuplicateImport,
    UndefinedTool,
    UndefinedVariable,
}

/// A problem found in the source. The display text is the marker message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Issue {
    #[error("reserved keyword used as variable name: {name}")]
    ReservedKeyword { name: String },

    #[error("invalid variable name: {name} (use letters, digits and '_', not starting with a digit)")]
    InvalidVariableName { name: String },

    #[error("unmatched '{delimiter}'")]
    UnmatchedDelimiter { delimiter: char },

    #[error("unclosed string starting with {quote}")]
    UnclosedString { quote: char },

    #[error("{name} is imported more than once")]
    DuplicateImport { name: String },

    #[error("tool {name} is not imported")]
    UndefinedTool { name: String },

    #[error("variable ${name} is never bound")]
    UndefinedVariable { name: String },
}

impl Issue {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Issue::ReservedKeyword { .. } => DiagnosticCode::ReservedKeyword,
            Issue::InvalidVariableName { .. } => DiagnosticCode::InvalidVariableName,
            Issue::UnmatchedDelimiter { .. } => DiagnosticCode::UnmatchedDelimiter,
            Issue::UnclosedString { .. } => DiagnosticCode::UnclosedString,
            Issue::DuplicateImport { .. } => DiagnosticCode::DuplicateImport,
            Issue::UndefinedTool { .. } => DiagnosticCode::UndefinedTool,
            Issue::UndefinedVariable { .. } => DiagnosticCode::UndefinedVariable,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Issue::UndefinedVariable { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// An editor marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub range: Range,
    pub message: String,
    pub code: DiagnosticCode,
}

impl Diagnostic {
    pub fn from_issue(issue: Issue, range: Range) -> Self {
        Self {
            severity: issue.severity(),
            range,
            message: issue.to_string(),
            code: issue.code(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// RULES
// ============================================================================

/// Which checks run. Binding checks are on by default, the rest are opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationRules {
    pub reserved_keywords: bool,
    pub identifier_syntax: bool,
    pub unmatched_delimiters: bool,
    pub duplicate_imports: bool,
    pub undefined_tools: bool,
    pub undefined_variables: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            reserved_keywords: true,
            identifier_syntax: true,
            unmatched_delimiters: false,
            duplicate_imports: false,
            undefined_tools: false,
            undefined_variables: false,
        }
    }
}

impl ValidationRules {
    /// Every rule enabled.
    pub fn all() -> Self {
        Self {
            reserved_keywords: true,
            identifier_syntax: true,
            unmatched_delimiters: true,
            duplicate_imports: true,
            undefined_tools: true,
            undefined_variables: true,
        }
    }
}

/// Names known from outside the document, such as upstream-step variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    pub known_variables: Vec<String>,
}

// ============================================================================
// VALIDATOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct Validator {
    grammar: Arc<DslGrammarConfig>,
    extractor: VariableExtractor,
    rules: ValidationRules,
}

impl Validator {
    pub fn new(grammar: Arc<DslGrammarConfig>, rules: ValidationRules) -> Self {
        Self {
            extractor: VariableExtractor::new(Arc::clone(&grammar)),
            grammar,
            rules,
        }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn validate(&self, source: &str) -> Vec<Diagnostic> {
        self.validate_with(source, &ValidationContext::default())
    }

    /// Validate with outside knowledge. Diagnostics come back in document order.
    pub fn validate_with(&self, source: &str, context: &ValidationContext) -> Vec<Diagnostic> {
        let mut diagnostics = self.check_bindings(source);

        if self.rules.unmatched_delimiters {
            diagnostics.extend(rules::unmatched_delimiters(&self.grammar, source));
        }
        if self.rules.duplicate_imports {
            diagnostics.extend(rules::duplicate_imports(source));
        }
        if self.rules.undefined_tools {
            diagnostics.extend(rules::undefined_tools(&self.grammar, source));
        }
        if self.rules.undefined_variables {
            diagnostics.extend(rules::undefined_variables(
                &self.grammar,
                &self.extractor,
                source,
                context,
            ));
        }

        diagnostics.sort_by_key(|d| (d.range.start_line, d.range.start_column));
        debug!(count = diagnostics.len(), "validated Dolphin source");
        diagnostics
    }

    /// Reserved-keyword and identifier checks on every `->`/`>>` binding.
    /// Comment lines are included.
    fn check_bindings(&self, source: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for (idx, line) in text::lines(source).enumerate() {
            for binding in self.extractor.bindings_in_line(line) {
                let issue = if self.grammar.is_keyword(binding.name) {
                    if !self.rules.reserved_keywords {
                        continue;
                    }
                    Issue::ReservedKeyword {
                        name: binding.name.to_string(),
                    }
                } else if !self.grammar.is_valid_identifier(binding.name) {
                    if !self.rules.identifier_syntax {
                        continue;
                    }
                    Issue::InvalidVariableName {
                        name: binding.name.to_string(),
                    }
                } else {
                    continue;
                };

                let range = Range::on_line(
                    idx + 1,
                    text::char_column(line, binding.start),
                    text::char_column(line, binding.end),
                );
                diagnostics.push(Diagnostic::from_issue(issue, range));
            }
        }
        diagnostics
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DslGrammarConfig::shared(), ValidationRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_keyword_binding() {
        let diagnostics = Validator::default().validate("-> tools");
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.code, DiagnosticCode::ReservedKeyword);
        assert_eq!(d.range, Range::on_line(1, 1, 9));
        assert!(d.message.contains("reserved keyword used as variable name"));

        assert!(Validator::default().validate("-> my_var").is_empty());
    }

    #[test]
    fn test_invalid_identifier() {
        let diagnostics = Validator::default().validate("-> 1abc");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::InvalidVariableName);
        assert!(diagnostics[0].message.starts_with("invalid variable name"));
        assert!(Validator::default().validate("-> _abc1").is_empty());
    }

    #[test]
    fn test_comment_lines_are_still_validated() {
        let diagnostics = Validator::default().validate("# -> tools");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 3, 11));
    }

    #[test]
    fn test_spans_follow_each_occurrence() {
        let diagnostics = Validator::default().validate("a -> in b -> in");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 3, 8));
        assert_eq!(diagnostics[1].range, Range::on_line(1, 11, 16));
    }

    #[test]
    fn test_rules_can_be_disabled() {
        let rules = ValidationRules {
            reserved_keywords: false,
            identifier_syntax: false,
            ..ValidationRules::default()
        };
        let validator = Validator::new(DslGrammarConfig::shared(), rules);
        assert!(validator.validate("-> tools\n-> 1abc").is_empty());
    }

    #[test]
    fn test_custom_grammar_keywords() {
        let grammar = Arc::new(DslGrammarConfig::with_keywords(["answer"]).unwrap());
        let validator = Validator::new(grammar, ValidationRules::default());
        assert_eq!(validator.validate("-> answer").len(), 1);
        assert!(validator.validate("-> tools").is_empty());
    }

    #[test]
    fn test_diagnostic_serializes_flat() {
        let diagnostics = Validator::default().validate("-> in");
        let json = serde_json::to_value(&diagnostics[0]).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["start_line"], 1);
        assert_eq!(json["end_column"], 6);
        assert_eq!(json["code"], "reserved-keyword");
    }
}
