//! Helper utility functions for the transpiler
//!
//! String-aware scanning shared by the pre-scan, the converters and the
//! tracker:
//! - Comment splitting
//! - Top-level comma splitting and `=` search
//! - Identifier and literal checks
//! - Name casing

/// Split a line into code and inline comment, ignoring markers inside
/// string literals. Both quote styles are honoured.
pub fn strip_inline_comment<'a>(line: &'a str, marker: &str) -> (&'a str, Option<&'a str>) {
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for (i, c) in line.char_indices() {
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
        if line[i..].starts_with(marker) {
            return (line[..i].trim_end(), Some(line[i + marker.len()..].trim()));
        }
    }

    (line.trim_end(), None)
}

/// Leading whitespace width in columns; a tab counts as four.
pub fn leading_columns(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Split on `sep` where it is not nested in brackets or quoted.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escape_next = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
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
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if c == sep && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    let last = s[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

/// Byte offset of a plain assignment `=` at bracket depth zero.
///
/// Skips `==`, `!=`, `<=`, `>=` and compound forms such as `+=`.
pub fn find_assignment_eq(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut escape_next = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if let Some(q) = quote {
            if b == b'\\' {
                escape_next = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 => {
                let prev = if i > 0 { bytes[i - 1] } else { b' ' };
                let next = bytes.get(i + 1).copied().unwrap_or(b' ');
                if next == b'=' || b"=!<>+-*/%&|^:".contains(&prev) {
                    continue;
                }
                return Some(i);
            }
            _ => {}
        }
    }
    None
}

/// Check if a string is a valid identifier
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// `obj.field` or `self.field`, one level deep
pub fn is_field_access(name: &str) -> bool {
    match name.split_once('.') {
        Some((base, field)) => is_valid_identifier(base) && is_valid_identifier(field),
        None => false,
    }
}

/// Assignment target: identifier, field access or a single subscript.
pub fn is_assignable(target: &str) -> bool {
    let t = target.trim();
    if is_valid_identifier(t) || is_field_access(t) {
        return true;
    }
    match (t.find('['), t.ends_with(']')) {
        (Some(open), true) => {
            let base = &t[..open];
            is_valid_identifier(base) || is_field_access(base)
        }
        _ => false,
    }
}

pub fn is_string_literal(s: &str) -> bool {
    let s = s.trim();
    s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
}

/// `'text'` → `"text"`; other input unchanged.
pub fn normalise_quotes(s: &str) -> String {
    let t = s.trim();
    if t.len() >= 2 && t.starts_with('\'') && t.ends_with('\'') {
        format!("\"{}\"", &t[1..t.len() - 1])
    } else {
        t.to_string()
    }
}

/// `SCREAMING_CASE` of at least two characters
pub fn is_constant_name(name: &str) -> bool {
    name.len() >= 2
        && is_valid_identifier(name)
        && name.chars().any(|c| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// `get_value` → `GetValue`
pub fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Contents of the outermost `(...)` that closes at the end of `s`.
pub fn call_arguments(s: &str) -> Option<&str> {
    let s = s.trim_end();
    if !s.ends_with(')') {
        return None;
    }
    let open = matching_open_paren(s)?;
    Some(&s[open + 1..s.len() - 1])
}

/// Index of the `(` matching the final `)` of `s`.
pub fn matching_open_paren(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_inline_comment_respects_strings() {
        assert_eq!(strip_inline_comment("x = 5  # five", "#"), ("x = 5", Some("five")));
        assert_eq!(strip_inline_comment("s = \"a # b\"", "#"), ("s = \"a # b\"", None));
        assert_eq!(strip_inline_comment("s = 'it''s' # q", "#"), ("s = 'it''s'", Some("q")));
        assert_eq!(strip_inline_comment("url = \"http://x\"; // go", "//"), ("url = \"http://x\";", Some("go")));
    }

    #[test]
    fn test_leading_columns_counts_tabs() {
        assert_eq!(leading_columns("    x"), 4);
        assert_eq!(leading_columns("\tx"), 4);
        assert_eq!(leading_columns("x"), 0);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a, f(b, c), [d, e]", ','), vec!["a", "f(b, c)", "[d, e]"]);
        assert_eq!(split_top_level("\"x, y\", z", ','), vec!["\"x, y\"", "z"]);
        assert!(split_top_level("", ',').is_empty());
    }

    #[test]
    fn test_find_assignment_eq() {
        assert_eq!(find_assignment_eq("x = 1"), Some(2));
        assert_eq!(find_assignment_eq("x == 1"), None);
        assert_eq!(find_assignment_eq("x += 1"), None);
        assert_eq!(find_assignment_eq("f(a=1)"), None);
        assert_eq!(find_assignment_eq("a <= b"), None);
        assert_eq!(find_assignment_eq("s = \"=\""), Some(2));
    }

    #[test]
    fn test_identifiers_and_targets() {
        assert!(is_valid_identifier("_tmp1"));
        assert!(!is_valid_identifier("1x"));
        assert!(is_field_access("self.name"));
        assert!(is_assignable("nums[i + 1]"));
        assert!(!is_assignable("f(x)"));
    }

    #[test]
    fn test_constant_names() {
        assert!(is_constant_name("PI"));
        assert!(is_constant_name("MAX_SIZE"));
        assert!(!is_constant_name("X"));
        assert!(!is_constant_name("Total"));
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("add"), "Add");
        assert_eq!(to_pascal_case("get_value"), "GetValue");
    }

    #[test]
    fn test_call_arguments() {
        assert_eq!(call_arguments("print(f(x), y)"), Some("f(x), y"));
        assert_eq!(call_arguments("x"), None);
    }
}
