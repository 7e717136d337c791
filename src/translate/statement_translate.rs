//! Statement Translation
//!
//! Single-line statements of indentation sources: `pass`, imports, `print`,
//! `input` and bare calls.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Conversion, Ctx};
use crate::dialect::Keyword;
use crate::helpers::{call_arguments, matching_open_paren, split_top_level};
use crate::type_resolution::{INTEGER, REAL, STRING};

static PASS: Lazy<Regex> = lazy_regex!(r"^pass$");
static IMPORT: Lazy<Regex> = lazy_regex!(r"^(?:import\s+\S|from\s+\S+\s+import\b)");
static PRINT: Lazy<Regex> = lazy_regex!(r"^print\s*\((.*)\)$");
static INPUT_TARGET: Lazy<Regex> = lazy_regex!(r"^([A-Za-z_][\w.]*)\s*=\s*(.+)$");
static CONVERSION_CALL: Lazy<Regex> = lazy_regex!(r"^(int|float|str)\s*\((.*)\)$");
static INPUT_CALL: Lazy<Regex> = lazy_regex!(r"^input\s*\((.*)\)$");
static CALLEE: Lazy<Regex> = lazy_regex!(r"^[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*\s*$");
static PRINT_KEYWORD_ARG: Lazy<Regex> = lazy_regex!(r"^(?:sep|end|file|flush)\s*=");

pub fn convert_pass(code: &str, _indent: &str, _cx: &mut Ctx<'_>) -> Option<Conversion> {
    PASS.is_match(code).then(Conversion::empty)
}

pub fn convert_import(code: &str, _indent: &str, _cx: &mut Ctx<'_>) -> Option<Conversion> {
    IMPORT.is_match(code).then(Conversion::empty)
}

pub fn convert_print(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = PRINT.captures(code)?;
    let args: Vec<String> = split_top_level(&caps[1], ',')
        .into_iter()
        .filter(|a| !a.is_empty() && !PRINT_KEYWORD_ARG.is_match(a))
        .map(|a| cx.expr(a))
        .collect();

    let output = cx.kw(Keyword::Output);
    let line = if args.is_empty() {
        format!("{}{} \"\"", indent, output)
    } else {
        format!("{}{} {}", indent, output, args.join(", "))
    };
    Some(Conversion::line(line))
}

/// `name = input("prompt")`, optionally wrapped in `int(...)`/`float(...)`.
pub fn convert_input(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = INPUT_TARGET.captures(code)?;
    let target = &caps[1];
    let mut value = caps[2].trim();
    let mut ty = STRING;

    if let Some(conv) = CONVERSION_CALL.captures(value) {
        ty = match &conv[1] {
            "int" => INTEGER,
            "float" => REAL,
            _ => STRING,
        };
        value = conv.get(2).map_or("", |m| m.as_str()).trim();
    }
    // `input("a").strip()` ends in `)` too
    if matching_open_paren(value) != value.find('(') {
        return None;
    }
    let prompt = INPUT_CALL.captures(value)?.get(1).map_or("", |m| m.as_str()).trim();

    cx.state.declared_types.entry(target.to_string()).or_insert_with(|| ty.to_string());

    let mut lines = Vec::new();
    if cx.policy.prompt_input && !prompt.is_empty() {
        lines.push(format!("{}{} {}", indent, cx.kw(Keyword::Output), cx.expr(prompt)));
    }
    lines.push(format!("{}{} {}", indent, cx.kw(Keyword::Input), target));
    Some(Conversion::lines(lines))
}

/// A call used as a statement: `greet("Al")`, `dog.speak()`.
pub fn convert_call(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    call_arguments(code)?;
    let open = matching_open_paren(code)?;
    if !CALLEE.is_match(&code[..open]) {
        return None;
    }

    let call = cx.expr(code);
    let line = if cx.policy.call_keyword {
        format!("{}{} {}", indent, cx.kw(Keyword::Call), call)
    } else {
        format!("{}{}", indent, call)
    };
    Some(Conversion::line(line))
}
