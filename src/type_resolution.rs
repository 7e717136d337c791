//! Shallow type heuristics for typed pseudocode output.
//!
//! Nothing here does inference in earnest. Literals map to their obvious
//! type, Java declarations map through a fixed table, and untyped Python
//! parameters are guessed from their names.

use crate::helpers::{is_string_literal, split_top_level};

pub const INTEGER: &str = "INTEGER";
pub const REAL: &str = "REAL";
pub const STRING: &str = "STRING";
pub const BOOLEAN: &str = "BOOLEAN";
pub const CHAR: &str = "CHAR";

/// Type of a literal expression, if it is one.
pub fn literal_type(expr: &str) -> Option<&'static str> {
    let t = expr.trim();
    if t.is_empty() {
        return None;
    }
    if is_string_literal(t) || is_fstring(t) {
        return Some(STRING);
    }
    if matches!(t, "True" | "False" | "true" | "false" | "TRUE" | "FALSE") {
        return Some(BOOLEAN);
    }
    let digits = t.strip_prefix('-').unwrap_or(t);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return Some(INTEGER);
    }
    if digits.parse::<f64>().is_ok() && digits.chars().next().map_or(false, |c| c.is_ascii_digit() || c == '.') {
        return Some(REAL);
    }
    None
}

pub fn is_fstring(expr: &str) -> bool {
    let t = expr.trim();
    (t.starts_with("f\"") || t.starts_with("f'")) && t.len() >= 3
}

/// Best guess for an arbitrary expression: literals, string concatenation,
/// comparisons and real arithmetic.
pub fn expression_type(expr: &str) -> Option<&'static str> {
    if let Some(ty) = literal_type(expr) {
        return Some(ty);
    }
    let parts = split_top_level(expr, '+');
    if parts.len() > 1 && parts.iter().any(|p| literal_type(p) == Some(STRING)) {
        return Some(STRING);
    }
    let t = expr.trim();
    if ["==", "!=", "<=", ">=", " < ", " > ", " and ", " or ", "&&", "||"]
        .iter()
        .any(|op| t.contains(op))
    {
        return Some(BOOLEAN);
    }
    if t.starts_with("len(") || t.starts_with("int(") {
        return Some(INTEGER);
    }
    if t.starts_with("float(") || t.starts_with("round(") {
        return Some(REAL);
    }
    if t.starts_with("str(") || t.starts_with("input(") {
        return Some(STRING);
    }
    None
}

/// Map a Java primitive or library type onto the pseudocode name.
/// Unknown names (user classes) pass through unchanged.
pub fn java_type(ty: &str) -> String {
    match ty.trim() {
        "int" | "long" | "short" | "byte" | "Integer" | "Long" => INTEGER.to_string(),
        "double" | "float" | "Double" | "Float" => REAL.to_string(),
        "String" => STRING.to_string(),
        "boolean" | "Boolean" => BOOLEAN.to_string(),
        "char" | "Character" => CHAR.to_string(),
        other => other.to_string(),
    }
}

/// Map a Python annotation onto the pseudocode name; `None` for anything
/// that is not a builtin scalar.
pub fn python_type(annotation: &str) -> Option<&'static str> {
    match annotation.trim() {
        "int" => Some(INTEGER),
        "float" => Some(REAL),
        "str" => Some(STRING),
        "bool" => Some(BOOLEAN),
        _ => None,
    }
}

const BOOLEAN_PREFIXES: &[&str] = &["is_", "has_", "can_", "should_"];
const BOOLEAN_NAMES: &[&str] = &["flag", "found", "done", "valid", "ok"];
const STRING_HINTS: &[&str] = &[
    "name", "text", "str", "word", "message", "msg", "operation", "title", "label",
    "prompt", "line", "sentence", "letter", "colour", "color", "email", "address",
];
const INTEGER_NAMES: &[&str] = &["number", "count", "index", "n", "i", "j", "k", "size", "length", "age"];
const REAL_HINTS: &[&str] = &[
    "num", "price", "amount", "total", "average", "avg", "rate", "weight", "height",
    "salary", "cost", "balance", "temperature", "radius",
];

/// Guess a parameter or field type from its name.
pub fn guess_type_from_name(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if BOOLEAN_PREFIXES.iter().any(|p| lower.starts_with(p)) || BOOLEAN_NAMES.contains(&lower.as_str()) {
        return BOOLEAN;
    }
    if STRING_HINTS.iter().any(|h| lower.contains(h)) {
        return STRING;
    }
    if INTEGER_NAMES.contains(&lower.as_str()) {
        return INTEGER;
    }
    if REAL_HINTS.iter().any(|h| lower.contains(h)) {
        return REAL;
    }
    INTEGER
}

/// Return type of a routine with no better evidence: the first numeric
/// parameter type, then the first parameter type, then `INTEGER`.
pub fn guess_return_type(param_types: &[&'static str]) -> &'static str {
    param_types
        .iter()
        .copied()
        .find(|t| *t == REAL || *t == INTEGER)
        .or_else(|| param_types.first().copied())
        .unwrap_or(INTEGER)
}

/// Element type shared by all items of a list literal; `STRING` when mixed.
pub fn common_element_type(items: &[&str]) -> &'static str {
    let mut found: Option<&'static str> = None;
    for item in items {
        let ty = literal_type(item).unwrap_or(INTEGER);
        match found {
            None => found = Some(ty),
            Some(prev) if prev == ty => {}
            Some(prev) if (prev == INTEGER && ty == REAL) || (prev == REAL && ty == INTEGER) => found = Some(REAL),
            Some(_) => return STRING,
        }
    }
    found.unwrap_or(INTEGER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_types() {
        assert_eq!(literal_type("42"), Some(INTEGER));
        assert_eq!(literal_type("-7"), Some(INTEGER));
        assert_eq!(literal_type("3.14"), Some(REAL));
        assert_eq!(literal_type("'hi'"), Some(STRING));
        assert_eq!(literal_type("f\"x {y}\""), Some(STRING));
        assert_eq!(literal_type("True"), Some(BOOLEAN));
        assert_eq!(literal_type("total"), None);
        assert_eq!(literal_type("inf"), None);
    }

    #[test]
    fn test_expression_types() {
        assert_eq!(expression_type("\"Hi \" + name"), Some(STRING));
        assert_eq!(expression_type("a <= b"), Some(BOOLEAN));
        assert_eq!(expression_type("len(xs)"), Some(INTEGER));
        assert_eq!(expression_type("a + b"), None);
    }

    #[test]
    fn test_java_type_table() {
        assert_eq!(java_type("int"), "INTEGER");
        assert_eq!(java_type("double"), "REAL");
        assert_eq!(java_type("char"), "CHAR");
        assert_eq!(java_type("Dog"), "Dog");
    }

    #[test]
    fn test_python_annotations() {
        assert_eq!(python_type("float"), Some(REAL));
        assert_eq!(python_type(" str "), Some(STRING));
        assert_eq!(python_type("list[int]"), None);
    }

    #[test]
    fn test_name_heuristics() {
        assert_eq!(guess_type_from_name("x"), INTEGER);
        assert_eq!(guess_type_from_name("first_name"), STRING);
        assert_eq!(guess_type_from_name("operation"), STRING);
        assert_eq!(guess_type_from_name("num1"), REAL);
        assert_eq!(guess_type_from_name("number"), INTEGER);
        assert_eq!(guess_type_from_name("is_valid"), BOOLEAN);
    }

    #[test]
    fn test_return_and_element_types() {
        assert_eq!(guess_return_type(&[REAL, REAL, STRING]), REAL);
        assert_eq!(guess_return_type(&[STRING]), STRING);
        assert_eq!(guess_return_type(&[]), INTEGER);
        assert_eq!(common_element_type(&["1", "2"]), INTEGER);
        assert_eq!(common_element_type(&["1", "2.5"]), REAL);
        assert_eq!(common_element_type(&["1", "\"a\""]), STRING);
    }
}
