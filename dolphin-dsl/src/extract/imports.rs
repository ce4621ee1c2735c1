//! `import` statement extraction.
//!
//! An import line lists toolboxes and `toolbox.tool` entries separated by
//! commas, semicolons or whitespace:
//!
//! ```text
//! import web.search, 知识库.检索; calculator
//! ```
//!
//! Names may contain CJK characters, ASCII letters, digits, `_` and `-`.

use crate::text;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static IMPORT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^import\s*").expect("import prefix regex is valid"));

static IMPORT_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([\x{4e00}-\x{9fa5}a-zA-Z0-9_\s-]+?)(?:\.([\x{4e00}-\x{9fa5}a-zA-Z0-9_\s-]+?))?(?:,|$|\s|;)",
    )
    .expect("import entry regex is valid")
});

/// One entry of an import statement. Columns are 1-based, end exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub toolbox: String,
    pub tool: Option<String>,
    pub line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

impl ImportEntry {
    /// `toolbox.tool`, or the toolbox alone.
    pub fn qualified(&self) -> String {
        match &self.tool {
            Some(tool) => format!("{}.{}", self.toolbox, tool),
            None => self.toolbox.clone(),
        }
    }
}

/// Every entry of every import line, in source order.
pub fn scan_imports(source: &str) -> Vec<ImportEntry> {
    let mut entries = Vec::new();
    for (idx, line) in text::lines(source).enumerate() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with("import") {
            continue;
        }
        let rest_offset = line.len() - trimmed.len();
        let rest_start = rest_offset
            + IMPORT_PREFIX
                .find(trimmed)
                .map(|m| m.end())
                .unwrap_or(0);
        let rest = &line[rest_start..];

        for caps in IMPORT_ENTRY.captures_iter(rest) {
            let Some(toolbox) = caps.get(1) else {
                continue;
            };
            let toolbox_name = toolbox.as_str().trim();
            if toolbox_name.is_empty() {
                continue;
            }
            let tool = caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .filter(|t| !t.is_empty());

            let lead = toolbox.as_str().len() - toolbox.as_str().trim_start().len();
            let start = rest_start + toolbox.start() + lead;
            let end = match caps.get(2) {
                Some(tool_match) => rest_start + tool_match.start() + tool_match.as_str().trim_end().len(),
                None => start + toolbox_name.len(),
            };
            entries.push(ImportEntry {
                toolbox: toolbox_name.to_string(),
                tool,
                line: idx + 1,
                start_column: text::char_column(line, start),
                end_column: text::char_column(line, end),
            });
        }
    }
    entries
}

/// Imported tools as `toolbox.tool`.
pub fn extract_imported_tools(source: &str) -> Vec<String> {
    scan_imports(source)
        .into_iter()
        .filter(|entry| entry.tool.is_some())
        .map(|entry| entry.qualified())
        .collect()
}

/// Toolboxes imported as a whole.
pub fn extract_imported_toolboxes(source: &str) -> Vec<String> {
    scan_imports(source)
        .into_iter()
        .filter(|entry| entry.tool.is_none())
        .map(|entry| entry.toolbox)
        .collect()
}

/// Tools plus toolboxes, skipping a toolbox already seen through an earlier
/// entry.
pub fn extract_imports(source: &str) -> Vec<String> {
    let mut seen_boxes: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for entry in scan_imports(source) {
        match &entry.tool {
            Some(_) => {
                out.push(entry.qualified());
                seen_boxes.insert(entry.toolbox);
            }
            None => {
                if seen_boxes.insert(entry.toolbox.clone()) {
                    out.push(entry.toolbox);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_and_toolboxes() {
        let source = "import web.search, calculator\nsay hi\nimport 知识库.检索;files";
        assert_eq!(
            extract_imported_tools(source),
            vec!["web.search".to_string(), "知识库.检索".to_string()]
        );
        assert_eq!(
            extract_imported_toolboxes(source),
            vec!["calculator".to_string(), "files".to_string()]
        );
    }

    #[test]
    fn test_combined_skips_seen_toolboxes() {
        let source = "import web.search, web, calc\nimport calc";
        assert_eq!(
            extract_imports(source),
            vec!["web.search".to_string(), "calc".to_string()]
        );
    }

    #[test]
    fn test_whitespace_separates_entries() {
        let entries = scan_imports("import my-box.fetch_page other");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].toolbox, "my-box");
        assert_eq!(entries[0].tool.as_deref(), Some("fetch_page"));
        assert_eq!(entries[1].qualified(), "other");
    }

    #[test]
    fn test_entry_columns() {
        let entries = scan_imports("  import web.search, calc");
        assert_eq!(entries[0].line, 1);
        assert_eq!(entries[0].start_column, 10);
        assert_eq!(entries[0].end_column, 20);
        assert_eq!(entries[1].qualified(), "calc");
        assert_eq!(entries[1].start_column, 22);
        assert_eq!(entries[1].end_column, 26);
    }

    #[test]
    fn test_non_import_lines_ignored() {
        assert!(scan_imports("say import web.search").is_empty());
        assert!(scan_imports("").is_empty());
    }
}
