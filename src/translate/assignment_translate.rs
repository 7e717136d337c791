//! Assignment Translation
//!
//! Every `target = value` form of indentation sources. The specific shapes
//! (records, lists, instantiation, constants, tuple assignment) are tried
//! before the plain assignment that would otherwise swallow them.

use once_cell::sync::Lazy;
use regex::Regex;

use super::control_flow_translate::{minus_one, plus_one};
use super::expression_translate::map_code_segments;
use super::{Conversion, Ctx};
use crate::block::BlockKind;
use crate::dialect::Keyword;
use crate::helpers::{
    find_assignment_eq, is_assignable, is_constant_name, is_string_literal, is_valid_identifier, split_top_level,
    to_pascal_case,
};
use crate::type_resolution::{common_element_type, expression_type, literal_type, STRING};

static COMPREHENSION: Lazy<Regex> = lazy_regex!(
    r"^([A-Za-z_]\w*)\s*=\s*\[\s*(.+?)\s+for\s+([A-Za-z_]\w*)\s+in\s+range\s*\((.*)\)\s*\]$"
);
static COMPOUND: Lazy<Regex> =
    lazy_regex!(r"^([A-Za-z_][\w.]*(?:\[[^\]]+\])?)\s*(\*\*|//|\+|-|\*|/|%)=\s*(.+)$");
static MULTIPLE: Lazy<Regex> =
    lazy_regex!(r"^([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)+)\s*=\s*(.+)$");
static DICT_LITERAL: Lazy<Regex> = lazy_regex!(r"^([A-Za-z_]\w*)\s*=\s*\{(.*)\}$");
static LIST_LITERAL: Lazy<Regex> = lazy_regex!(r"^([A-Za-z_]\w*)\s*=\s*\[(.*)\]$");
static INSTANTIATION: Lazy<Regex> =
    lazy_regex!(r"^([A-Za-z_][\w.]*)\s*=\s*([A-Za-z_]\w*)\s*\((.*)\)$");
static CONSTANT: Lazy<Regex> = lazy_regex!(r"^([A-Z][A-Z0-9_]*)\s*=\s*(.+)$");
static TIGHT_STAR: Lazy<Regex> = lazy_regex!(r"\s*\*\s*");

/// `[expr for x in xs]` and friends. Only the `range` form has a rewrite;
/// every other one is reported as unsupported.
pub fn is_comprehension(value: &str) -> bool {
    let v = value.trim();
    (v.starts_with('[') || v.starts_with('{') || v.starts_with('('))
        && v.contains(" for ")
        && v.contains(" in ")
}

fn record_type(cx: &mut Ctx<'_>, name: &str, value: &str) {
    if let Some(ty) = expression_type(value) {
        cx.state.declared_types.entry(name.to_string()).or_insert_with(|| ty.to_string());
    }
}

pub fn convert_comprehension(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = COMPREHENSION.captures(code)?;
    let (name, element, var) = (&caps[1], &caps[2], &caps[3]);
    let args = split_top_level(&caps[4], ',');

    let (start, end, step) = match args.as_slice() {
        [stop] => ("0".to_string(), minus_one(&cx.expr(stop)), None),
        [start, stop] => (cx.expr(start), minus_one(&cx.expr(stop)), None),
        [start, stop, step] if step.trim().starts_with('-') => {
            (cx.expr(start), plus_one(&cx.expr(stop)), Some(cx.expr(step)))
        }
        [start, stop, step] => (cx.expr(start), minus_one(&cx.expr(stop)), Some(cx.expr(step))),
        _ => return None,
    };

    let element = TIGHT_STAR.replace_all(element, " * ");
    let body = cx.body_indent(indent);
    Some(Conversion::lines(vec![
        cx.assign(indent, "index", "0"),
        format!("{}{}", indent, cx.policy.for_header(var, &start, &end, step.as_deref())),
        cx.assign(&body, &format!("{}[index]", name), &cx.expr(&element)),
        cx.assign(&body, "index", "index + 1"),
        format!("{}{}", indent, cx.policy.terminator(BlockKind::For, Some(var), None)),
    ]))
}

/// `x += v` is spelled out as `x ← x + v`.
pub fn convert_compound_assignment(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = COMPOUND.captures(code)?;
    let target = cx.expr(&caps[1]);
    let value = cx.expr(&format!("{} {} {}", &caps[1], &caps[2], caps[3].trim()));
    Some(Conversion::line(cx.assign(indent, &target, &value)))
}

/// `a, b = 1, 2` becomes one assignment per name. Names that a later value
/// reads back are saved to `temp_<name>` first, so `a, b = b, a` swaps.
pub fn convert_multiple_assignment(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = MULTIPLE.captures(code)?;
    let targets: Vec<&str> = caps[1].split(',').map(str::trim).collect();
    let values = split_top_level(&caps[2], ',');
    if targets.len() != values.len() {
        return None;
    }

    let saved: Vec<&str> = targets
        .iter()
        .enumerate()
        .filter(|(i, t)| values.iter().skip(i + 1).any(|v| reads_identifier(v, t)))
        .map(|(_, t)| *t)
        .collect();

    let mut lines: Vec<String> = saved
        .iter()
        .map(|t| cx.assign(indent, &format!("temp_{}", t), t))
        .collect();

    for (target, value) in targets.iter().zip(&values) {
        let mut value = value.to_string();
        for t in &saved {
            value = replace_identifier(&value, t, &format!("temp_{}", t));
        }
        record_type(cx, target, &value);
        lines.push(cx.assign(indent, target, &cx.expr(&value)));
    }
    Some(Conversion::lines(lines))
}

fn reads_identifier(expr: &str, name: &str) -> bool {
    replace_identifier(expr, name, "\u{0}") != expr
}

/// Replace whole-identifier occurrences of `from` outside string literals.
/// Attribute names (`obj.from`) are left alone.
fn replace_identifier(expr: &str, from: &str, to: &str) -> String {
    map_code_segments(expr, false, |code| {
        let mut out = String::with_capacity(code.len());
        let mut word = String::new();
        let mut prev: Option<char> = None;
        let flush = |word: &mut String, out: &mut String, prev: Option<char>| {
            if word == from && prev != Some('.') {
                out.push_str(to);
            } else {
                out.push_str(word);
            }
            word.clear();
        };
        let mut before_word: Option<char> = None;
        for c in code.chars() {
            if c.is_alphanumeric() || c == '_' {
                if word.is_empty() {
                    before_word = prev;
                }
                word.push(c);
            } else {
                flush(&mut word, &mut out, before_word);
                out.push(c);
            }
            prev = Some(c);
        }
        flush(&mut word, &mut out, before_word);
        out
    })
}

/// `d = {"k": v, ...}` becomes a `TYPE` record (once per variable) and one
/// field assignment per pair.
pub fn convert_dict_literal(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = DICT_LITERAL.captures(code)?;
    let name = caps[1].to_string();
    if is_comprehension(&format!("{{{}}}", &caps[2])) {
        return None;
    }

    let mut pairs = Vec::new();
    for entry in split_top_level(&caps[2], ',') {
        let (key, value) = entry.split_once(':')?;
        if !is_string_literal(key) {
            return None;
        }
        let key = key.trim();
        let key = &key[1..key.len() - 1];
        if !is_valid_identifier(key) {
            return None;
        }
        pairs.push((key.to_string(), value.trim().to_string()));
    }

    if !cx.policy.records {
        let value = cx.expr(&format!("{{{}}}", &caps[2]));
        return Some(Conversion::line(cx.assign(indent, &name, &value)));
    }

    let mut lines = Vec::new();
    if cx.state.declared_records.insert(name.clone()) {
        let mut fields = cx.state.record_fields.get(&name).cloned().unwrap_or_default();
        for (key, value) in &pairs {
            let ty = literal_type(value).unwrap_or(STRING);
            fields.entry(key.clone()).or_insert_with(|| ty.to_string());
        }
        let body = cx.body_indent(indent);
        let declare = cx.kw(Keyword::Declare);
        let record = format!("{}Record", to_pascal_case(&name));
        lines.push(format!("{}TYPE {}", indent, record));
        lines.extend(fields.iter().map(|(field, ty)| format!("{}{} {} : {}", body, declare, field, ty)));
        lines.push(format!("{}ENDTYPE", indent));
        lines.push(String::new());
        lines.push(format!("{}{} {} : {}", indent, declare, name, record));
    }

    for (key, value) in &pairs {
        lines.push(cx.assign(indent, &format!("{}.{}", name, key), &cx.expr(value)));
    }
    Some(Conversion::lines(lines))
}

/// Cambridge: `DECLARE xs : ARRAY[0:n-1] OF T` plus one element assignment
/// per item. Mixed lists are declared `STRING` with every item quoted.
pub fn convert_list_literal(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = LIST_LITERAL.captures(code)?;
    let name = &caps[1];
    let body = &caps[2];
    if is_comprehension(&format!("[{}]", body)) {
        return None;
    }
    let items = split_top_level(body, ',');

    if !cx.policy.array_declarations || items.is_empty() {
        return Some(Conversion::line(cx.assign(indent, name, &cx.expr(&format!("[{}]", body)))));
    }

    let ty = common_element_type(&items);
    let mut lines = Vec::new();
    if cx.state.declare(name, &format!("ARRAY OF {}", ty)) {
        lines.push(format!("{}{}", indent, cx.policy.array_declaration(name, &items.len().to_string(), ty)));
    }
    for (i, item) in items.iter().enumerate() {
        let mut value = cx.expr(item);
        if ty == STRING && !is_string_literal(item) {
            value = format!("\"{}\"", value);
        }
        lines.push(cx.assign(indent, &format!("{}[{}]", name, i), &value));
    }
    Some(Conversion::lines(lines))
}

/// `d = Dog("Rex")` for a class seen by the pre-scan.
pub fn convert_instantiation(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = INSTANTIATION.captures(code)?;
    let (target, class) = (&caps[1], &caps[2]);
    if !cx.state.is_class(class) {
        return None;
    }

    let mut lines = Vec::new();
    if cx.policy.object_model && is_valid_identifier(target) && cx.state.declare(target, class) {
        lines.push(format!("{}{} {} : {}", indent, cx.kw(Keyword::Declare), target, class));
    }
    lines.push(cx.assign(indent, target, &cx.expr(&format!("{}({})", class, &caps[3]))));
    Some(Conversion::lines(lines))
}

/// `MAX_SIZE = 10` → `CONSTANT MAX_SIZE = 10` where the dialect has constants.
pub fn convert_constant(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    if !cx.policy.constants {
        return None;
    }
    let caps = CONSTANT.captures(code)?;
    let (name, value) = (&caps[1], caps[2].trim());
    let ty = literal_type(value)?;
    if !is_constant_name(name) {
        return None;
    }
    cx.state.declared_types.entry(name.to_string()).or_insert_with(|| ty.to_string());
    Some(Conversion::line(format!(
        "{}{} {} = {}",
        indent,
        cx.kw(Keyword::Constant),
        name,
        cx.expr(value)
    )))
}

pub fn convert_assignment(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let at = find_assignment_eq(code)?;
    let target = code[..at].trim();
    let value = code[at + 1..].trim();
    // `x: int = 5`
    let target = match split_top_level(target, ':').as_slice() {
        [name, _annotation] => *name,
        _ => target,
    };
    if value.is_empty() || !is_assignable(target) || is_comprehension(value) {
        return None;
    }

    if is_valid_identifier(target) {
        record_type(cx, target, value);
    }
    Some(Conversion::line(cx.assign(indent, &cx.expr(target), &cx.expr(value))))
}
