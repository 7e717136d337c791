//! Look-ahead Lowering Utilities
//!
//! Decisions that depend on the next logical line. Only the brace tracker
//! needs this: a `}` keeps its frame open when the chain continues on the
//! following line, and a braceless body ends before a following `else`.

use super::source_lines_lowering::SourceLine;

/// `s` starts with the word `kw`, not merely a longer identifier.
pub fn starts_with_keyword(s: &str, kw: &str) -> bool {
    match s.strip_prefix(kw) {
        Some(rest) => !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'),
        None => false,
    }
}

/// Next code line after `idx`, skipping blanks and comments
pub fn next_code_line(lines: &[SourceLine], idx: usize) -> Option<&SourceLine> {
    lines.iter().skip(idx + 1).find(|l| l.is_code())
}
