//! Expression Translation
//!
//! Rewrites a source expression into dialect spelling. String literals are
//! never touched: the expression is cut into code and literal segments and
//! only code segments are rewritten.
//!
//! Order matters:
//! 1. f-strings expand into concatenations
//! 2. record subscripts (`d["k"]`) become dotted access
//! 3. top-level `+` becomes the dialect's concatenation when a string is involved
//! 4. operators, boolean literals and builtin calls are respelled per segment

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::dialect::{DialectPolicy, Keyword};
use crate::helpers::{is_string_literal, split_top_level, to_pascal_case};
use crate::options::SourceConvention;
use crate::parser_state::ParserState;
use crate::type_resolution::STRING;

static FSTRING: Lazy<Regex> = lazy_regex!(r#"\bf(?:"([^"]*)"|'([^']*)')"#);
static RECORD_ACCESS: Lazy<Regex> = lazy_regex!(r#"\b([A-Za-z_]\w*)\[\s*["']([A-Za-z_]\w*)["']\s*\]"#);
static CALL_NAME: Lazy<Regex> = lazy_regex!(r"\b([A-Za-z_]\w*)\(");
static CASE_METHOD: Lazy<Regex> =
    lazy_regex!(r"\b([A-Za-z_][\w.]*?)\.(upper|lower|toUpperCase|toLowerCase|length)\(\)");
static LENGTH_FIELD: Lazy<Regex> = lazy_regex!(r"\b([A-Za-z_][\w.]*?)\.length\b");
static MATH_POW: Lazy<Regex> = lazy_regex!(r"Math\.pow\(\s*([^,()]+?)\s*,\s*([^()]+?)\s*\)");
static NEW_OBJECT: Lazy<Regex> = lazy_regex!(r"\bnew\s+([A-Z]\w*)\s*\(");

static POW: Lazy<Regex> = lazy_regex!(r"\s*\*\*\s*");
static FLOOR_DIV: Lazy<Regex> = lazy_regex!(r"\s*//\s*");
static MODULO: Lazy<Regex> = lazy_regex!(r"\s*%\s*");
static NOT_EQUAL: Lazy<Regex> = lazy_regex!(r"\s*!=\s*");
static EQUAL: Lazy<Regex> = lazy_regex!(r"\s*==\s*");
static LESS_EQUAL: Lazy<Regex> = lazy_regex!(r"\s*<=\s*");
static GREATER_EQUAL: Lazy<Regex> = lazy_regex!(r"\s*>=\s*");
static LOGICAL_AND: Lazy<Regex> = lazy_regex!(r"\s*&&\s*");
static LOGICAL_OR: Lazy<Regex> = lazy_regex!(r"\s*\|\|\s*");
static LOGICAL_NOT: Lazy<Regex> = lazy_regex!(r"!\s*");
static WORD_AND: Lazy<Regex> = lazy_regex!(r"\band\b");
static WORD_OR: Lazy<Regex> = lazy_regex!(r"\bor\b");
static WORD_NOT: Lazy<Regex> = lazy_regex!(r"\bnot\b");
static PY_TRUE: Lazy<Regex> = lazy_regex!(r"\bTrue\b");
static PY_FALSE: Lazy<Regex> = lazy_regex!(r"\bFalse\b");
static JAVA_TRUE: Lazy<Regex> = lazy_regex!(r"\btrue\b");
static JAVA_FALSE: Lazy<Regex> = lazy_regex!(r"\bfalse\b");
static LEN_CALL: Lazy<Regex> = lazy_regex!(r"\blen\(");
static THIS_ACCESS: Lazy<Regex> = lazy_regex!(r"\bthis\.");
static STRING_INDEX: Lazy<Regex> = lazy_regex!(r"\b([A-Za-z_]\w*)\[([^\[\]]+)\]");

const JAVA_MATH: &[(&str, &str)] = &[
    ("Math.sqrt(", "SQRT("),
    ("Math.abs(", "ABS("),
    ("Math.max(", "MAX("),
    ("Math.min(", "MIN("),
    ("Math.round(", "ROUND("),
    ("Math.random()", "RANDOM()"),
];

/// Translate one expression into dialect spelling.
pub fn translate_expression(
    expr: &str,
    policy: &DialectPolicy,
    state: &ParserState,
    convention: SourceConvention,
) -> String {
    let expr = expr.trim();
    let python = convention == SourceConvention::Indentation;

    let mut s = if python { expand_fstrings(expr) } else { expr.to_string() };

    if policy.records && !state.record_fields.is_empty() {
        s = RECORD_ACCESS
            .replace_all(&s, |caps: &Captures| {
                if state.record_fields.contains_key(&caps[1]) {
                    format!("{}.{}", &caps[1], &caps[2])
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
    }

    if policy.substrings {
        s = STRING_INDEX
            .replace_all(&s, |caps: &Captures| {
                if state.declared_types.get(&caps[1]).map_or(false, |t| t == STRING) {
                    format!("{}({}, {}, 1)", policy.kw(Keyword::Substring), &caps[1], caps[2].trim())
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
    }

    s = apply_concatenation(&s, policy, state);

    map_code_segments(&s, python, |code| rewrite_code(code, policy, state, python))
}

/// `f"Hi {name}!"` → `"Hi " + name + "!"`
pub fn expand_fstrings(expr: &str) -> String {
    FSTRING
        .replace_all(expr, |caps: &Captures| {
            let body = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let parts = fstring_parts(body);
            if parts.is_empty() {
                "\"\"".to_string()
            } else {
                parts.join(" + ")
            }
        })
        .into_owned()
}

fn fstring_parts(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                if !literal.is_empty() {
                    parts.push(format!("\"{}\"", literal));
                    literal.clear();
                }
                let mut field = String::new();
                for inner in chars.by_ref() {
                    if inner == '}' {
                        break;
                    }
                    field.push(inner);
                }
                // drop `!r` conversions and `:.2f` format specs
                let field = field.split(['!', ':']).next().unwrap_or("").trim();
                if !field.is_empty() {
                    parts.push(field.to_string());
                }
            }
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        parts.push(format!("\"{}\"", literal));
    }
    parts
}

fn is_stringish(part: &str, state: &ParserState) -> bool {
    let p = part.trim();
    is_string_literal(p)
        || p.starts_with("str(")
        || p.starts_with("String.valueOf(")
        || state.declared_types.get(p).map_or(false, |t| t == STRING)
}

/// Respell top-level `+` as concatenation when any operand is a string.
fn apply_concatenation(s: &str, policy: &DialectPolicy, state: &ParserState) -> String {
    let parts = split_top_level(s, '+');
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        return s.to_string();
    }
    if !parts.iter().any(|p| is_stringish(p, state)) {
        return s.to_string();
    }
    let joiner = format!(" {} ", policy.concat);
    parts
        .iter()
        .map(|p| strip_str_call(p))
        .collect::<Vec<_>>()
        .join(&joiner)
}

/// `str(x)` → `x`; the concatenation already implies the conversion.
fn strip_str_call(part: &str) -> &str {
    part.strip_prefix("str(")
        .and_then(|rest| rest.strip_suffix(')'))
        .filter(|inner| split_top_level(inner, ',').len() == 1)
        .unwrap_or(part)
}

/// Apply `f` to the code between string literals. Python single-quoted
/// strings are normalised to double quotes.
pub fn map_code_segments(s: &str, python: bool, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut code = String::new();
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '"' && c != '\'' {
            code.push(c);
            continue;
        }
        out.push_str(&f(&code));
        code.clear();

        let mut literal = String::new();
        let mut escape_next = false;
        let mut closed = false;
        for inner in chars.by_ref() {
            if escape_next {
                escape_next = false;
                literal.push(inner);
                continue;
            }
            if inner == '\\' {
                escape_next = true;
                literal.push(inner);
                continue;
            }
            if inner == c {
                closed = true;
                break;
            }
            literal.push(inner);
        }

        let quote = if python && c == '\'' && !literal.contains('"') { '"' } else { c };
        out.push(quote);
        out.push_str(&literal);
        if closed {
            out.push(quote);
        }
    }
    out.push_str(&f(&code));
    out
}

fn rewrite_code(code: &str, policy: &DialectPolicy, state: &ParserState, python: bool) -> String {
    if code.trim().is_empty() {
        return code.to_string();
    }
    let mut s = code.to_string();

    if python {
        s = POW.replace_all(&s, " ^ ").into_owned();
        s = FLOOR_DIV.replace_all(&s, format!(" {} ", policy.kw(Keyword::Div)).as_str()).into_owned();
    } else {
        s = MATH_POW.replace_all(&s, "$1 ^ $2").into_owned();
        for (from, to) in JAVA_MATH {
            s = s.replace(from, to);
        }
        s = THIS_ACCESS.replace_all(&s, "self.").into_owned();
    }

    s = MODULO.replace_all(&s, format!(" {} ", policy.kw(Keyword::Mod)).as_str()).into_owned();
    s = NOT_EQUAL.replace_all(&s, " ≠ ").into_owned();
    s = EQUAL.replace_all(&s, " = ").into_owned();
    s = LESS_EQUAL.replace_all(&s, " ≤ ").into_owned();
    s = GREATER_EQUAL.replace_all(&s, " ≥ ").into_owned();

    let and = policy.kw(Keyword::And);
    let or = policy.kw(Keyword::Or);
    let not = policy.kw(Keyword::Not);
    if python {
        s = WORD_AND.replace_all(&s, and).into_owned();
        s = WORD_OR.replace_all(&s, or).into_owned();
        s = WORD_NOT.replace_all(&s, not).into_owned();
        s = PY_TRUE.replace_all(&s, policy.kw(Keyword::True)).into_owned();
        s = PY_FALSE.replace_all(&s, policy.kw(Keyword::False)).into_owned();
        s = LEN_CALL.replace_all(&s, format!("{}(", policy.kw(Keyword::Length)).as_str()).into_owned();
    } else {
        s = LOGICAL_AND.replace_all(&s, format!(" {} ", and).as_str()).into_owned();
        s = LOGICAL_OR.replace_all(&s, format!(" {} ", or).as_str()).into_owned();
        s = LOGICAL_NOT.replace_all(&s, format!("{} ", not).as_str()).into_owned();
        s = JAVA_TRUE.replace_all(&s, policy.kw(Keyword::True)).into_owned();
        s = JAVA_FALSE.replace_all(&s, policy.kw(Keyword::False)).into_owned();
    }

    s = CASE_METHOD
        .replace_all(&s, |caps: &Captures| {
            let func = match &caps[2] {
                "upper" | "toUpperCase" => policy.kw(Keyword::Upper),
                "lower" | "toLowerCase" => policy.kw(Keyword::Lower),
                _ => policy.kw(Keyword::Length),
            };
            format!("{}({})", func, &caps[1])
        })
        .into_owned();
    if !python {
        s = LENGTH_FIELD
            .replace_all(&s, format!("{}($1)", policy.kw(Keyword::Length)).as_str())
            .into_owned();
    }

    if policy.object_model {
        s = NEW_OBJECT.replace_all(&s, format!("{} $1(", policy.kw(Keyword::New)).as_str()).into_owned();
    }

    rewrite_calls(&s, policy, state, python)
}

/// PascalCase user routine calls and prefix Python class construction
/// with `NEW`, per the policy switches.
fn rewrite_calls(s: &str, policy: &DialectPolicy, state: &ParserState, python: bool) -> String {
    if !policy.capitalise_routines && !policy.object_model {
        return s.to_string();
    }
    let new_kw = policy.kw(Keyword::New);
    CALL_NAME
        .replace_all(s, |caps: &Captures| {
            let name = &caps[1];
            let start = caps.get(0).map_or(0, |m| m.start());
            let before = s[..start].trim_end();
            if policy.object_model && python && state.is_class(name) && !before.ends_with('.') && !before.ends_with(new_kw) {
                format!("{} {}(", new_kw, name)
            } else if policy.capitalise_routines && state.is_routine(name) {
                format!("{}(", to_pascal_case(name))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{CAMBRIDGE, IB};

    fn py(expr: &str, policy: &DialectPolicy) -> String {
        translate_expression(expr, policy, &ParserState::new(), SourceConvention::Indentation)
    }

    fn java(expr: &str, policy: &DialectPolicy) -> String {
        translate_expression(expr, policy, &ParserState::new(), SourceConvention::Braces)
    }

    #[test]
    fn test_python_operators() {
        assert_eq!(py("x > y and a <= b and c != d and e == f", &CAMBRIDGE), "x > y AND a ≤ b AND c ≠ d AND e = f");
        assert_eq!(py("x % y", &CAMBRIDGE), "x MOD y");
        assert_eq!(py("x // y", &IB), "x div y");
        assert_eq!(py("x ** 2", &CAMBRIDGE), "x ^ 2");
        assert_eq!(py("a and not b", &IB), "a AND NOT b");
        assert_eq!(py("True", &CAMBRIDGE), "TRUE");
    }

    #[test]
    fn test_strings_are_untouched() {
        assert_eq!(py("\"a == b and c\"", &CAMBRIDGE), "\"a == b and c\"");
        assert_eq!(py("'hello'", &CAMBRIDGE), "\"hello\"");
        assert_eq!(py("x == 'it'", &IB), "x = \"it\"");
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(py("\"Hello\" + \" \" + name", &CAMBRIDGE), "\"Hello\" & \" \" & name");
        assert_eq!(py("\"Total: \" + str(n)", &CAMBRIDGE), "\"Total: \" & n");
        assert_eq!(py("a + b", &CAMBRIDGE), "a + b");
        assert_eq!(py("\"a\" + b", &IB), "\"a\" + b");
    }

    #[test]
    fn test_fstrings() {
        assert_eq!(py("f\"Hello {name}\"", &CAMBRIDGE), "\"Hello \" & name");
        assert_eq!(py("f\"Hello, {name}!\"", &IB), "\"Hello, \" + name + \"!\"");
        assert_eq!(py("f\"{x:.2f}\"", &IB), "x");
    }

    #[test]
    fn test_builtins() {
        assert_eq!(py("len(text)", &CAMBRIDGE), "LENGTH(text)");
        assert_eq!(py("text.upper()", &CAMBRIDGE), "UPPER(text)");
        assert_eq!(py("self.name.lower()", &IB), "LOWER(self.name)");
    }

    #[test]
    fn test_record_access() {
        let mut state = ParserState::new();
        state.record_fields.insert("student".to_string(), Default::default());
        let out = translate_expression("student[\"name\"]", &CAMBRIDGE, &state, SourceConvention::Indentation);
        assert_eq!(out, "student.name");
        let out = translate_expression("other[\"name\"]", &CAMBRIDGE, &state, SourceConvention::Indentation);
        assert_eq!(out, "other[\"name\"]");
    }

    #[test]
    fn test_string_indexing() {
        let mut state = ParserState::new();
        state.declared_types.insert("text".to_string(), STRING.to_string());
        let out = translate_expression("text[0]", &CAMBRIDGE, &state, SourceConvention::Indentation);
        assert_eq!(out, "MID(text, 0, 1)");
        let out = translate_expression("nums[0]", &CAMBRIDGE, &state, SourceConvention::Indentation);
        assert_eq!(out, "nums[0]");
        let out = translate_expression("text[0]", &IB, &state, SourceConvention::Indentation);
        assert_eq!(out, "text[0]");
    }

    #[test]
    fn test_routine_and_class_calls() {
        let mut state = ParserState::new();
        state.routines.insert("add".to_string());
        state.classes.insert("Dog".to_string());
        let out = translate_expression("add(5, 3)", &CAMBRIDGE, &state, SourceConvention::Indentation);
        assert_eq!(out, "Add(5, 3)");
        let out = translate_expression("Dog(\"Rex\")", &CAMBRIDGE, &state, SourceConvention::Indentation);
        assert_eq!(out, "NEW Dog(\"Rex\")");
        let out = translate_expression("add(1, 2)", &IB, &state, SourceConvention::Indentation);
        assert_eq!(out, "add(1, 2)");
    }

    #[test]
    fn test_java_operators_and_math() {
        assert_eq!(java("a && !b || c", &CAMBRIDGE), "a AND NOT b OR c");
        assert_eq!(java("(p != q)", &IB), "(p ≠ q)");
        assert_eq!(java("Math.pow(x, 2) + Math.sqrt(y)", &CAMBRIDGE), "x ^ 2 + SQRT(y)");
        assert_eq!(java("name.length()", &CAMBRIDGE), "LENGTH(name)");
        assert_eq!(java("arr.length - 1", &CAMBRIDGE), "LENGTH(arr) - 1");
        assert_eq!(java("this.count", &IB), "self.count");
        assert_eq!(java("new Dog(\"Rex\")", &CAMBRIDGE), "NEW Dog(\"Rex\")");
        assert_eq!(java("flag == true", &IB), "flag = TRUE");
    }

    #[test]
    fn test_java_char_literal_kept() {
        assert_eq!(java("c == 'x'", &CAMBRIDGE), "c = 'x'");
    }
}
