//! Source Line Lowering
//!
//! Turns raw text into logical lines before any conversion happens:
//! - blank and pure-comment lines are kept as their own kinds
//! - inline comments are split off the code
//! - physical lines are joined while `(`/`[` (and `{` for indentation
//!   sources) stay open, or after a trailing backslash
//! - docstrings and `/* ... */` blocks become one comment per line
//! - a lone `{` (Allman style) is folded into the preceding header

use serde::Serialize;

use super::depth_tracking_lowering::bracket_balance;
use crate::helpers::{leading_columns, strip_inline_comment};
use crate::options::SourceConvention;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Blank,
    Comment,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    /// 1-based number of the first physical line
    pub number: usize,
    pub kind: LineKind,
    /// Leading whitespace exactly as written
    pub raw_indent: String,
    pub columns: usize,
    /// Trimmed code; empty for blank and comment lines
    pub code: String,
    /// Comment text without its marker
    pub comment: Option<String>,
}

impl SourceLine {
    fn blank(number: usize) -> Self {
        SourceLine {
            number,
            kind: LineKind::Blank,
            raw_indent: String::new(),
            columns: 0,
            code: String::new(),
            comment: None,
        }
    }

    fn comment(number: usize, raw: &str, text: &str) -> Self {
        SourceLine {
            number,
            kind: LineKind::Comment,
            raw_indent: indent_of(raw),
            columns: leading_columns(raw),
            code: String::new(),
            comment: Some(text.trim().to_string()),
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == LineKind::Code
    }

    /// Rendering for blank and comment lines; `None` for code.
    pub fn passthrough(&self) -> Option<String> {
        match self.kind {
            LineKind::Blank => Some(String::new()),
            LineKind::Comment => Some(match self.comment.as_deref() {
                Some(text) if !text.is_empty() => format!("{}// {}", self.raw_indent, text),
                _ => format!("{}//", self.raw_indent),
            }),
            LineKind::Code => None,
        }
    }
}

fn indent_of(raw: &str) -> String {
    raw.chars().take_while(|c| c.is_whitespace()).collect()
}

pub fn comment_marker(convention: SourceConvention) -> &'static str {
    match convention {
        SourceConvention::Indentation => "#",
        SourceConvention::Braces => "//",
    }
}

/// Split `source` into logical lines.
pub fn split_logical_lines(source: &str, convention: SourceConvention) -> Vec<SourceLine> {
    let physical: Vec<&str> = source.lines().collect();
    let marker = comment_marker(convention);
    let join_braces = convention == SourceConvention::Indentation;
    let mut out: Vec<SourceLine> = Vec::new();
    let mut i = 0;

    while i < physical.len() {
        let raw = physical[i];
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            out.push(SourceLine::blank(i + 1));
            i += 1;
            continue;
        }

        if let Some(consumed) = block_comment(&physical, i, convention, &mut out) {
            i += consumed;
            continue;
        }

        if let Some(text) = trimmed.strip_prefix(marker) {
            out.push(SourceLine::comment(i + 1, raw, text));
            i += 1;
            continue;
        }

        let number = i + 1;
        let (code, comment) = strip_inline_comment(raw, marker);
        let mut code = code.trim().to_string();
        let mut comment = comment.map(str::to_string);
        let mut depth = bracket_balance(&code, join_braces);
        let mut continued = join_braces && code.ends_with('\\');
        i += 1;

        while (depth > 0 || continued) && i < physical.len() {
            if continued {
                code.pop();
                code.truncate(code.trim_end().len());
            }
            let (next, next_comment) = strip_inline_comment(physical[i], marker);
            let next = next.trim();
            if !next.is_empty() {
                if !code.ends_with(['(', '[', '{']) && !next.starts_with([')', ']', '}']) {
                    code.push(' ');
                }
                code.push_str(next);
            }
            if comment.is_none() {
                comment = next_comment.map(str::to_string);
            }
            depth += bracket_balance(next, join_braces);
            continued = join_braces && code.ends_with('\\');
            i += 1;
        }

        if convention == SourceConvention::Braces && code == "{" {
            if let Some(prev) = out.iter_mut().rev().find(|l| l.is_code()) {
                prev.code.push_str(" {");
                continue;
            }
        }

        out.push(SourceLine {
            number,
            kind: LineKind::Code,
            raw_indent: indent_of(raw),
            columns: leading_columns(raw),
            code,
            comment,
        });
    }

    out
}

/// Docstrings (`"""`/`'''`) and `/* */` blocks. Returns the number of
/// physical lines consumed, or `None` if line `start` opens no block.
fn block_comment(
    physical: &[&str],
    start: usize,
    convention: SourceConvention,
    out: &mut Vec<SourceLine>,
) -> Option<usize> {
    let trimmed = physical[start].trim();
    let (open, close) = match convention {
        SourceConvention::Indentation => {
            if trimmed.starts_with("\"\"\"") {
                ("\"\"\"", "\"\"\"")
            } else if trimmed.starts_with("'''") {
                ("'''", "'''")
            } else {
                return None;
            }
        }
        SourceConvention::Braces => {
            if trimmed.starts_with("/*") {
                ("/*", "*/")
            } else {
                return None;
            }
        }
    };

    let first = &trimmed[open.len()..];
    if let Some(end) = first.find(close) {
        out.push(SourceLine::comment(start + 1, physical[start], clean_block_text(&first[..end])));
        return Some(1);
    }

    let mut i = start;
    let mut text = first;
    loop {
        let body = clean_block_text(text);
        if !body.is_empty() {
            out.push(SourceLine::comment(i + 1, physical[i], body));
        }
        i += 1;
        if i >= physical.len() {
            return Some(i - start);
        }
        let line = physical[i].trim();
        if let Some(end) = line.find(close) {
            let body = clean_block_text(&line[..end]);
            if !body.is_empty() {
                out.push(SourceLine::comment(i + 1, physical[i], body));
            }
            return Some(i + 1 - start);
        }
        text = line;
    }
}

fn clean_block_text(text: &str) -> &str {
    let t = text.trim();
    let t = t.strip_prefix('*').unwrap_or(t);
    t.trim()
}
