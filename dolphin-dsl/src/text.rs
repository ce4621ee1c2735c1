//! Positions, ranges and line helpers.
//!
//! Lines and columns are 1-based, matching editor conventions. Columns count
//! characters, not bytes, so CJK prompt text lines up with what the user sees.

use serde::{Deserialize, Serialize};

/// Characters that end a word when scanning backwards from the cursor.
const WORD_SEPARATORS: &str = "`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?";

/// A cursor position (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

/// A text range. The end column is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Range {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// A range contained in a single line.
    pub fn on_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self::new(line, start_column, line, end_column)
    }

    pub fn start(&self) -> Position {
        Position::new(self.start_line, self.start_column)
    }

    pub fn end(&self) -> Position {
        Position::new(self.end_line, self.end_column)
    }
}

/// The word immediately before a position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordAtPosition {
    pub word: String,
    pub start_column: usize,
    pub end_column: usize,
}

/// Split text into lines the way the editor model does (`\n` only, trailing
/// empty line kept).
pub fn lines(text: &str) -> std::str::Split<'_, char> {
    text.split('\n')
}

/// Byte offset of a 1-based character column, clamped to the line length.
pub fn byte_offset(line: &str, column: usize) -> usize {
    let chars_before = column.saturating_sub(1);
    line.char_indices()
        .nth(chars_before)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

/// 1-based character column of a byte offset.
pub fn char_column(line: &str, byte: usize) -> usize {
    let byte = byte.min(line.len());
    line[..byte].chars().count() + 1
}

/// The part of `line` before the 1-based `column`.
pub fn before_column(line: &str, column: usize) -> &str {
    &line[..byte_offset(line, column)]
}

/// Number of characters in a line, as a column count.
pub fn char_len(line: &str) -> usize {
    line.chars().count()
}

pub fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !WORD_SEPARATORS.contains(c)
}

/// The word ending at `column`. An empty word starts and ends at `column`.
pub fn word_until_position(line: &str, column: usize) -> WordAtPosition {
    let before = before_column(line, column);
    let end_column = char_len(before) + 1;
    let word: String = {
        let mut rev: Vec<char> = before.chars().rev().take_while(|c| is_word_char(*c)).collect();
        rev.reverse();
        rev.into_iter().collect()
    };
    let start_column = end_column - char_len(&word);
    WordAtPosition {
        word,
        start_column,
        end_column,
    }
}

/// Text covered by `range` within `text`, joined with `\n`.
pub fn value_in_range(text: &str, range: Range) -> String {
    let mut out = String::new();
    for (idx, line) in lines(text).enumerate() {
        let number = idx + 1;
        if number < range.start_line || number > range.end_line {
            continue;
        }
        let start = if number == range.start_line {
            byte_offset(line, range.start_column)
        } else {
            0
        };
        let end = if number == range.end_line {
            byte_offset(line, range.end_column)
        } else {
            line.len()
        };
        if number > range.start_line {
            out.push('\n');
        }
        if start < end {
            out.push_str(&line[start..end]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_count_characters() {
        let line = "你好 -> 变量";
        assert_eq!(byte_offset(line, 1), 0);
        assert_eq!(byte_offset(line, 2), "你".len());
        assert_eq!(char_column(line, "你好 ".len()), 4);
        assert_eq!(before_column(line, 3), "你好");
        assert_eq!(byte_offset(line, 100), line.len());
    }

    #[test]
    fn test_word_until_position() {
        let word = word_until_position("say $que", 9);
        assert_eq!(word.word, "que");
        assert_eq!(word.start_column, 6);
        assert_eq!(word.end_column, 9);

        let empty = word_until_position("say $", 6);
        assert_eq!(empty.word, "");
        assert_eq!(empty.start_column, 6);
        assert_eq!(empty.end_column, 6);
    }

    #[test]
    fn test_value_in_range_spans_lines() {
        let text = "first line\nsecond line\nthird";
        assert_eq!(value_in_range(text, Range::on_line(2, 1, 7)), "second");
        assert_eq!(value_in_range(text, Range::new(1, 7, 2, 7)), "line\nsecond");
    }
}
