//! Depth Tracking Lowering
//!
//! Delimiter counting that skips string and char literals. Used both for
//! joining physical lines into logical ones and for the brace tracker.

/// Scan `s` and call `f` for every character outside quotes.
fn for_each_unquoted(s: &str, mut f: impl FnMut(char)) {
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for c in s.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if let Some(q) = quote {
            if c == '\\' {
                escape_next = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
            continue;
        }
        f(c);
    }
}

/// Count opening and closing braces OUTSIDE of string literals
///
/// # Returns
/// A tuple of (opening_count, closing_count)
pub fn count_braces_outside_strings(s: &str) -> (usize, usize) {
    let mut opens = 0;
    let mut closes = 0;
    for_each_unquoted(s, |c| match c {
        '{' => opens += 1,
        '}' => closes += 1,
        _ => {}
    });
    (opens, closes)
}

/// Net open-bracket count of a line.
///
/// `(` and `[` always count; `{` only when `include_braces` is set, since in
/// brace-delimited sources a `{` opens a block rather than an expression.
pub fn bracket_balance(s: &str, include_braces: bool) -> i32 {
    let mut depth = 0i32;
    for_each_unquoted(s, |c| match c {
        '(' | '[' => depth += 1,
        ')' | ']' => depth -= 1,
        '{' if include_braces => depth += 1,
        '}' if include_braces => depth -= 1,
        _ => {}
    });
    depth
}
