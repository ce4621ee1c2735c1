//! Opt-in validation rules.

use super::{Diagnostic, Issue, ValidationContext};
use crate::extract::{scan_imports, ExtractScope, VariableExtractor};
use crate::grammar::DslGrammarConfig;
use crate::text::{self, Range};
use std::collections::{HashMap, HashSet};

// ============================================================================
// DELIMITERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Outside,
    Inside { quote: char, column: usize },
}

/// Per line: closers without an opener, strings left open and openers left
/// unclosed. A backslash escapes the next character anywhere on the line.
pub(super) fn unmatched_delimiters(grammar: &DslGrammarConfig, source: &str) -> Vec<Diagnostic> {
    let brackets: Vec<(char, char)> = grammar
        .auto_closing_pairs()
        .iter()
        .copied()
        .filter(|(open, close)| open != close)
        .collect();

    let mut diagnostics = Vec::new();
    for (idx, line) in text::lines(source).enumerate() {
        let number = idx + 1;
        let mut stack: Vec<(char, char, usize)> = Vec::new();
        let mut state = QuoteState::Outside;
        let mut chars = line.chars().enumerate();

        while let Some((i, c)) = chars.next() {
            let column = i + 1;
            if c == '\\' {
                chars.next();
                continue;
            }
            match state {
                QuoteState::Inside { quote, .. } => {
                    if c == quote {
                        state = QuoteState::Outside;
                    }
                }
                QuoteState::Outside => {
                    if c == '"' || c == '\'' {
                        state = QuoteState::Inside { quote: c, column };
                    } else if let Some((open, close)) = brackets.iter().find(|(open, _)| *open == c) {
                        stack.push((*open, *close, column));
                    } else if stack.last().is_some_and(|(_, close, _)| *close == c) {
                        stack.pop();
                    } else if brackets.iter().any(|(_, close)| *close == c) {
                        diagnostics.push(Diagnostic::from_issue(
                            Issue::UnmatchedDelimiter { delimiter: c },
                            Range::on_line(number, column, column + 1),
                        ));
                    }
                }
            }
        }

        if let QuoteState::Inside { quote, column } = state {
            diagnostics.push(Diagnostic::from_issue(
                Issue::UnclosedString { quote },
                Range::on_line(number, column, column + 1),
            ));
        }
        diagnostics.extend(stack.into_iter().map(|(open, _, column)| {
            Diagnostic::from_issue(
                Issue::UnmatchedDelimiter { delimiter: open },
                Range::on_line(number, column, column + 1),
            )
        }));
    }
    diagnostics
}

// ============================================================================
// IMPORTS
// ============================================================================

/// Every occurrence of an entry imported more than once.
pub(super) fn duplicate_imports(source: &str) -> Vec<Diagnostic> {
    let entries = scan_imports(source);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in &entries {
        *counts.entry(entry.qualified()).or_default() += 1;
    }

    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.qualified();
            (counts.get(&name).copied().unwrap_or(0) > 1).then(|| {
                Diagnostic::from_issue(
                    Issue::DuplicateImport { name },
                    Range::on_line(entry.line, entry.start_column, entry.end_column),
                )
            })
        })
        .collect()
}

/// `@name(...)` calls and `tools=[...]` entries naming a tool no import
/// declares. A whole-toolbox import disables the check, its tools being
/// unknown here.
pub(super) fn undefined_tools(grammar: &DslGrammarConfig, source: &str) -> Vec<Diagnostic> {
    let entries = scan_imports(source);
    if entries.iter().any(|entry| entry.tool.is_none()) {
        return Vec::new();
    }
    let imported: HashSet<String> = entries.into_iter().filter_map(|entry| entry.tool).collect();

    let patterns = grammar.patterns();
    let mut diagnostics = Vec::new();
    for (idx, line) in text::lines(source).enumerate() {
        let number = idx + 1;
        let mut report = |name: &str, start: usize, end: usize| {
            if !imported.contains(name) {
                diagnostics.push(Diagnostic::from_issue(
                    Issue::UndefinedTool {
                        name: name.to_string(),
                    },
                    Range::on_line(number, text::char_column(line, start), text::char_column(line, end)),
                ));
            }
        };

        for caps in patterns.call_function.captures_iter(line) {
            if let (Some(call), Some(name)) = (caps.get(0), caps.get(1)) {
                report(name.as_str(), call.start(), call.end());
            }
        }

        for caps in patterns.tools_literal.captures_iter(line) {
            let Some(contents) = caps.get(1) else {
                continue;
            };
            let mut offset = contents.start();
            for raw in contents.as_str().split(',') {
                let lead = raw.len() - raw.trim_start().len();
                let trimmed = raw.trim();
                let name = trimmed.trim_matches(|c| c == '"' || c == '\'');
                if !name.is_empty() {
                    let start = offset + lead;
                    report(name, start, start + trimmed.len());
                }
                offset += raw.len() + 1;
            }
        }
    }
    diagnostics
}

// ============================================================================
// VARIABLES
// ============================================================================

/// `$name` references bound nowhere in the document and unknown to the caller.
pub(super) fn undefined_variables(
    grammar: &DslGrammarConfig,
    extractor: &VariableExtractor,
    source: &str,
    context: &ValidationContext,
) -> Vec<Diagnostic> {
    let bound: HashSet<String> = extractor
        .extract(source, ExtractScope::All)
        .into_iter()
        .map(|v| v.value)
        .collect();
    // `$step.data` references the upstream variable `step.data`
    let is_known = |name: &str| {
        bound.contains(name)
            || context.known_variables.iter().any(|known| {
                known == name
                    || known
                        .strip_prefix(name)
                        .is_some_and(|rest| rest.starts_with('.'))
            })
    };

    let mut diagnostics = Vec::new();
    for (idx, line) in text::lines(source).enumerate() {
        if grammar.is_comment_line(line) {
            continue;
        }
        for caps in grammar.patterns().variable_ref.captures_iter(line) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if is_known(name.as_str()) {
                continue;
            }
            diagnostics.push(Diagnostic::from_issue(
                Issue::UndefinedVariable {
                    name: name.as_str().to_string(),
                },
                Range::on_line(
                    idx + 1,
                    text::char_column(line, whole.start()),
                    text::char_column(line, whole.end()),
                ),
            ));
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::super::{DiagnosticCode, Severity, ValidationRules, Validator};
    use super::*;
    use std::sync::Arc;

    fn validator() -> Validator {
        Validator::new(DslGrammarConfig::shared(), ValidationRules::all())
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_balanced_line_is_clean() {
        let grammar = DslGrammarConfig::shared();
        assert!(unmatched_delimiters(&grammar, r#"@f(a, [b], {c}) "x)" 'y]'"#).is_empty());
    }

    #[test]
    fn test_unmatched_closer_and_opener() {
        let grammar = DslGrammarConfig::shared();
        let diagnostics = unmatched_delimiters(&grammar, "a) (b");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 2, 3));
        assert_eq!(diagnostics[0].message, "unmatched ')'");
        assert_eq!(diagnostics[1].range, Range::on_line(1, 4, 5));
        assert_eq!(diagnostics[1].message, "unmatched '('");
    }

    #[test]
    fn test_mismatched_closer_is_reported() {
        let grammar = DslGrammarConfig::shared();
        let diagnostics = unmatched_delimiters(&grammar, "[)]");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 2, 3));
    }

    #[test]
    fn test_unclosed_string_at_opening_quote() {
        let grammar = DslGrammarConfig::shared();
        let diagnostics = unmatched_delimiters(&grammar, r#"say "hi \" there"#);
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::UnclosedString]);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 5, 6));
    }

    #[test]
    fn test_escaped_bracket_is_ignored() {
        let grammar = DslGrammarConfig::shared();
        assert!(unmatched_delimiters(&grammar, r"a \) b").is_empty());
    }

    #[test]
    fn test_duplicate_imports_flag_every_occurrence() {
        let diagnostics = duplicate_imports("import web.search, calc\nimport web.search");
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.code == DiagnosticCode::DuplicateImport));
        assert_eq!(diagnostics[1].range, Range::on_line(2, 8, 18));
    }

    #[test]
    fn test_undefined_tools() {
        let grammar = DslGrammarConfig::shared();
        let source = "import web.search\n@search(q) @fetch(u) tools=[\"search\", \"write\"]";
        let diagnostics = undefined_tools(&grammar, source);
        let names: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(names, vec!["tool fetch is not imported", "tool write is not imported"]);
        assert_eq!(diagnostics[0].range, Range::on_line(2, 12, 21));
        assert_eq!(diagnostics[1].range, Range::on_line(2, 39, 46));
    }

    #[test]
    fn test_undefined_tools_skipped_for_toolbox_imports() {
        let grammar = DslGrammarConfig::shared();
        assert!(undefined_tools(&grammar, "import web\n@anything()").is_empty());
    }

    #[test]
    fn test_undefined_variables_are_warnings() {
        let source = "ask $query -> answer\nsay $answer $missing $step1";
        let context = ValidationContext {
            known_variables: vec!["query".to_string(), "step1.data".to_string()],
        };
        let diagnostics = validator().validate_with(source, &context);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].message, "variable $missing is never bound");
        assert_eq!(diagnostics[0].range, Range::on_line(2, 13, 21));
    }

    #[test]
    fn test_all_rules_sorted_by_position() {
        let grammar = Arc::new(DslGrammarConfig::default());
        let validator = Validator::new(grammar, ValidationRules::all());
        let diagnostics = validator.validate("x) -> in\n-> 2x");
        assert_eq!(
            codes(&diagnostics),
            vec![
                DiagnosticCode::UnmatchedDelimiter,
                DiagnosticCode::ReservedKeyword,
                DiagnosticCode::InvalidVariableName
            ]
        );
    }
}
