//! First pass analysis
//!
//! A read-only scan over every logical line before the forward pass. It
//! registers the names the converters need to know ahead of use:
//! - routine, lambda and class names
//! - record fields from dict literals and `x["k"] = v` writes
//! - instance fields assigned through `self.` / `this.`
//! - assignment and declaration targets

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::helpers::{find_assignment_eq, is_valid_identifier, split_top_level};
use crate::lowering::count_braces_outside_strings;
use crate::lowering::source_lines_lowering::SourceLine;
use crate::options::SourceConvention;
use crate::parser_state::ParserState;
use crate::type_resolution::{literal_type, STRING};

static PY_DEF: Lazy<Regex> = lazy_regex!(r"^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(");
static PY_CLASS: Lazy<Regex> = lazy_regex!(r"^class\s+([A-Za-z_]\w*)");
static PY_LAMBDA: Lazy<Regex> = lazy_regex!(r"^([A-Za-z_]\w*)\s*=\s*lambda\b");
static PY_DICT: Lazy<Regex> = lazy_regex!(r"^([A-Za-z_]\w*)\s*(?::\s*[\w\[\], ]+)?=\s*\{(.*)\}$");
static KEY_WRITE: Lazy<Regex> = lazy_regex!(r#"^([A-Za-z_]\w*)\s*\[\s*(?:"([^"]*)"|'([^']*)')\s*\]\s*=\s*(.+)$"#);
static SELF_FIELD: Lazy<Regex> = lazy_regex!(r"^(?:self|this)\.([A-Za-z_]\w*)\s*(?:[-+*/%]?=)");
static JAVA_CLASS: Lazy<Regex> = lazy_regex!(r"\bclass\s+([A-Za-z_]\w*)");
static JAVA_METHOD: Lazy<Regex> = lazy_regex!(
    r"^(?:(?:public|private|protected|static|final|abstract|synchronized)\s+)*[\w<>\[\],]+\s+([A-Za-z_]\w*)\s*\([^;]*\)\s*(?:throws\s+[\w.,\s]+)?\{?$"
);
static JAVA_DECLARATION: Lazy<Regex> = lazy_regex!(
    r"^(?:(?:final|static|private|public|protected)\s+)*([\w<>]+)(?:\[\])?\s+([A-Za-z_]\w*)\s*(?:\[\])?\s*(?:=|;)"
);
static TYPE_ANNOTATION: Lazy<Regex> = lazy_regex!(r"^([A-Za-z_]\w*)\s*:\s*[\w\[\], ]+$");

const CONTROL_WORDS: &[&str] = &["if", "for", "while", "switch", "catch", "return", "new", "else"];

/// Scan `lines` and fill the name tables of `state`.
pub fn prescan(lines: &[SourceLine], convention: SourceConvention, state: &mut ParserState) {
    match convention {
        SourceConvention::Indentation => prescan_indentation(lines, state),
        SourceConvention::Braces => prescan_braces(lines, state),
    }
    debug!(
        routines = state.routines.len(),
        classes = state.classes.len(),
        records = state.record_fields.len(),
        names = state.declared_names.len(),
        "pre-scan complete"
    );
}

fn prescan_indentation(lines: &[SourceLine], state: &mut ParserState) {
    // (class name, header column)
    let mut class_scope: Option<(String, usize)> = None;

    for line in lines.iter().filter(|l| l.is_code()) {
        let code = line.code.as_str();

        if matches!(&class_scope, Some((_, col)) if line.columns <= *col) {
            class_scope = None;
        }

        if let Some(caps) = PY_CLASS.captures(code) {
            state.classes.insert(caps[1].to_string());
            class_scope = Some((caps[1].to_string(), line.columns));
            continue;
        }
        if let Some(caps) = PY_DEF.captures(code) {
            state.routines.insert(caps[1].to_string());
            continue;
        }
        if let Some(caps) = PY_LAMBDA.captures(code) {
            state.lambdas.insert(caps[1].to_string());
            continue;
        }
        if let (Some(caps), Some((class, _))) = (SELF_FIELD.captures(code), &class_scope) {
            state.class_fields.entry(class.clone()).or_default().insert(caps[1].to_string());
            continue;
        }
        if let Some(caps) = PY_DICT.captures(code) {
            record_dict_fields(state, &caps[1], &caps[2]);
        }
        if let Some(caps) = KEY_WRITE.captures(code) {
            let key = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            record_field(state, &caps[1], key, &caps[4]);
        }
        register_targets(state, code);
    }
}

fn prescan_braces(lines: &[SourceLine], state: &mut ParserState) {
    let mut depth: usize = 0;
    // (class name, brace depth inside its body)
    let mut class_scopes: Vec<(String, usize)> = Vec::new();

    for line in lines.iter().filter(|l| l.is_code()) {
        let code = line.code.as_str();

        if let Some(caps) = JAVA_CLASS.captures(code) {
            state.classes.insert(caps[1].to_string());
            class_scopes.push((caps[1].to_string(), depth + 1));
        } else if let Some(caps) = JAVA_METHOD.captures(code) {
            let name = &caps[1];
            if !CONTROL_WORDS.contains(&name) {
                state.routines.insert(name.to_string());
            }
        } else if let Some(caps) = JAVA_DECLARATION.captures(code) {
            if !CONTROL_WORDS.contains(&&caps[1]) {
                state.declared_names.insert(caps[2].to_string());
            }
        } else if let Some(caps) = SELF_FIELD.captures(code) {
            if let Some((class, _)) = class_scopes.last() {
                state.class_fields.entry(class.clone()).or_default().insert(caps[1].to_string());
            }
        }

        let (opens, closes) = count_braces_outside_strings(code);
        depth = (depth + opens).saturating_sub(closes);
        while matches!(class_scopes.last(), Some((_, inner)) if depth < *inner) {
            class_scopes.pop();
        }
    }
}

/// Targets of simple, multiple and annotated assignments.
fn register_targets(state: &mut ParserState, code: &str) {
    if let Some(caps) = TYPE_ANNOTATION.captures(code) {
        state.declared_names.insert(caps[1].to_string());
        return;
    }
    let Some(eq) = find_assignment_eq(code) else {
        return;
    };
    let lhs = code[..eq].trim();
    let lhs = lhs.split(':').next().unwrap_or(lhs).trim();
    for target in split_top_level(lhs, ',') {
        if is_valid_identifier(target) {
            state.declared_names.insert(target.to_string());
        }
    }
}

fn record_dict_fields(state: &mut ParserState, name: &str, body: &str) {
    for pair in split_top_level(body, ',') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let unquoted = key
            .strip_prefix('"')
            .and_then(|k| k.strip_suffix('"'))
            .or_else(|| key.strip_prefix('\'').and_then(|k| k.strip_suffix('\'')));
        if let Some(key) = unquoted {
            record_field(state, name, key, value);
        }
    }
}

fn record_field(state: &mut ParserState, name: &str, key: &str, value: &str) {
    if !is_valid_identifier(key) {
        return;
    }
    let ty = literal_type(value).unwrap_or(STRING);
    state
        .record_fields
        .entry(name.to_string())
        .or_default()
        .entry(key.to_string())
        .or_insert_with(|| ty.to_string());
}
