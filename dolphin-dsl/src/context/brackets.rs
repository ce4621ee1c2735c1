//! Bracket scan for `tools=[...]` literals.
//!
//! A small automaton walks the text after `tools=[` looking for the matching
//! `]`. Quoted substrings are skipped (with backslash escapes honoured inside
//! them), and nested `[`/`]` pairs are counted.

const TOOLS_OPEN: &str = "tools=[";

/// Automaton state while scanning a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InSingleQuote { escaped: bool },
    InDoubleQuote { escaped: bool },
}

#[derive(Debug)]
struct BracketScanner {
    state: ScanState,
    depth: usize,
}

impl BracketScanner {
    /// Start just after an opening `[`.
    fn new() -> Self {
        Self {
            state: ScanState::Normal,
            depth: 1,
        }
    }

    /// Feed one character. Returns `true` when the opening bracket closes.
    fn step(&mut self, c: char) -> bool {
        self.state = match self.state {
            ScanState::Normal => match c {
                '"' => ScanState::InDoubleQuote { escaped: false },
                '\'' => ScanState::InSingleQuote { escaped: false },
                '[' => {
                    self.depth += 1;
                    ScanState::Normal
                }
                ']' => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return true;
                    }
                    ScanState::Normal
                }
                _ => ScanState::Normal,
            },
            ScanState::InDoubleQuote { escaped: true } => ScanState::InDoubleQuote { escaped: false },
            ScanState::InDoubleQuote { escaped: false } => match c {
                '\\' => ScanState::InDoubleQuote { escaped: true },
                '"' => ScanState::Normal,
                _ => ScanState::InDoubleQuote { escaped: false },
            },
            ScanState::InSingleQuote { escaped: true } => ScanState::InSingleQuote { escaped: false },
            ScanState::InSingleQuote { escaped: false } => match c {
                '\\' => ScanState::InSingleQuote { escaped: true },
                '\'' => ScanState::Normal,
                _ => ScanState::InSingleQuote { escaped: false },
            },
        };
        false
    }
}

/// Byte offset (relative to `rest`) of the `]` closing an already-open `[`.
fn matching_close(rest: &str) -> Option<usize> {
    let mut scanner = BracketScanner::new();
    rest.char_indices()
        .find(|(_, c)| scanner.step(*c))
        .map(|(idx, _)| idx)
}

/// Whether the last comma of `line` sits inside the last `tools=[...]` literal.
///
/// An unclosed literal counts as "not inside".
pub fn is_last_comma_in_tools_brackets(line: &str) -> bool {
    let Some(last_comma) = line.rfind(',') else {
        return false;
    };
    let Some(tools_start) = line.rfind(TOOLS_OPEN) else {
        return false;
    };
    let bracket_start = tools_start + TOOLS_OPEN.len();
    if last_comma < bracket_start {
        return false;
    }

    match matching_close(&line[bracket_start..]) {
        Some(offset) => {
            let bracket_end = bracket_start + offset;
            last_comma > bracket_start && last_comma < bracket_end
        }
        None => false,
    }
}
