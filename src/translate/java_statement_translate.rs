//! Java Statement Translation
//!
//! `;`-terminated statements of brace sources: declarations, `Scanner`
//! input, console output, increments and assignments. `Scanner` set-up,
//! `close()` calls and `import`/`package` lines are recognised and dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use super::java_control_translate::java_param_type;
use super::{Conversion, Ctx};
use crate::dialect::Keyword;
use crate::helpers::{find_assignment_eq, is_assignable, split_top_level};
use crate::type_resolution::{BOOLEAN, INTEGER, REAL, STRING};

const SCANNER: &str = "Scanner";

static PACKAGE_IMPORT: Lazy<Regex> = lazy_regex!(r"^(?:package|import)\s+(?:static\s+)?[\w.*]+\s*;$");
static SCANNER_NEW: Lazy<Regex> =
    lazy_regex!(r"^(?:(?:final\s+)?Scanner\s+)?([A-Za-z_]\w*)\s*=\s*new\s+Scanner\s*\(.*\)\s*;$");
static CLOSE_CALL: Lazy<Regex> = lazy_regex!(r"^([A-Za-z_]\w*)\.close\s*\(\s*\)\s*;$");
static RETURN_STMT: Lazy<Regex> = lazy_regex!(r"^return\b\s*(.*?)\s*;$");
static PRINT: Lazy<Regex> = lazy_regex!(r"^System\.out\.(?:println|print|printf)\s*\((.*)\)\s*;$");
static SCANNER_READ: Lazy<Regex> = lazy_regex!(
    r"^(?:([\w<>]+)\s+)?([A-Za-z_]\w*)\s*=\s*([A-Za-z_]\w*)\.(nextInt|nextLong|nextDouble|nextFloat|nextBoolean|nextLine|next)\s*\(\s*\)\s*;$"
);
static ARRAY_NEW: Lazy<Regex> = lazy_regex!(
    r"^(?:final\s+)?(\w+)\s*(\[\])?\s+([A-Za-z_]\w*)\s*(\[\])?\s*=\s*new\s+\w+\s*\[\s*(.+?)\s*\]\s*;$"
);
static ARRAY_LITERAL: Lazy<Regex> = lazy_regex!(
    r"^(?:final\s+)?(\w+)\s*(\[\])?\s+([A-Za-z_]\w*)\s*(\[\])?\s*=\s*\{(.*)\}\s*;$"
);
static DECLARATION: Lazy<Regex> = lazy_regex!(
    r"^((?:(?:public|private|protected|static|final)\s+)*)([\w<>]+(?:\[\])?)\s+([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)\s*(?:=\s*(.+?))?\s*;$"
);
static INCREMENT: Lazy<Regex> =
    lazy_regex!(r"^(?:([A-Za-z_][\w.]*(?:\[[^\]]+\])?)\s*(\+\+|--)|(\+\+|--)\s*([A-Za-z_][\w.]*(?:\[[^\]]+\])?))\s*;$");
static COMPOUND: Lazy<Regex> =
    lazy_regex!(r"^([A-Za-z_][\w.]*(?:\[[^\]]+\])?)\s*(\+|-|\*|/|%)=\s*(.+?)\s*;$");
static CALL: Lazy<Regex> = lazy_regex!(r"^([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)\s*\((.*)\)\s*;$");

const NOT_TYPES: &[&str] = &["return", "throw", "new", "else", "case", "goto", "break", "continue"];
const CONTROL_WORDS: &[&str] = &["if", "while", "for", "do", "switch", "catch", "synchronized", "return", "throw"];

fn is_scanner(cx: &Ctx<'_>, name: &str) -> bool {
    cx.state.declared_types.get(name).map_or(false, |t| t == SCANNER)
}

/// `DECLARE name : ty` the first time `name` is seen, in dialects that
/// declare variables.
fn declare_line(cx: &mut Ctx<'_>, indent: &str, name: &str, ty: &str) -> Option<String> {
    if !cx.policy.declare_variables {
        cx.state.declared_types.entry(name.to_string()).or_insert_with(|| ty.to_string());
        return None;
    }
    cx.state
        .declare(name, ty)
        .then(|| format!("{}{} {} : {}", indent, cx.kw(Keyword::Declare), name, ty))
}

pub fn convert_package_import(code: &str, _indent: &str, _cx: &mut Ctx<'_>) -> Option<Conversion> {
    PACKAGE_IMPORT.is_match(code).then(Conversion::empty)
}

/// `Scanner sc = new Scanner(System.in);` and `sc.close();`
pub fn convert_scanner_setup(code: &str, _indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    if let Some(caps) = SCANNER_NEW.captures(code) {
        cx.state.declared_types.insert(caps[1].to_string(), SCANNER.to_string());
        return Some(Conversion::empty());
    }
    let caps = CLOSE_CALL.captures(code)?;
    is_scanner(cx, &caps[1]).then(Conversion::empty)
}

pub fn convert_return(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = RETURN_STMT.captures(code)?;
    let line = match caps[1].trim() {
        "" => format!("{}{}", indent, cx.kw(Keyword::Return)),
        value => format!("{}{} {}", indent, cx.kw(Keyword::Return), cx.expr(value)),
    };
    Some(Conversion::line(line))
}

pub fn convert_print(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = PRINT.captures(code)?;
    let args: Vec<String> = split_top_level(&caps[1], ',').into_iter().map(|a| cx.expr(a)).collect();
    let line = if args.is_empty() {
        format!("{}{} \"\"", indent, cx.kw(Keyword::Output))
    } else {
        format!("{}{} {}", indent, cx.kw(Keyword::Output), args.join(", "))
    };
    Some(Conversion::line(line))
}

/// `int x = sc.nextInt();` → `DECLARE x : INTEGER` + `INPUT x`
pub fn convert_scanner_input(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = SCANNER_READ.captures(code)?;
    let name = &caps[2];
    if !is_scanner(cx, &caps[3]) && cx.state.declared_types.contains_key(&caps[3]) {
        return None;
    }

    let mut lines = Vec::new();
    if let Some(ty) = caps.get(1) {
        let ty = java_param_type(ty.as_str());
        lines.extend(declare_line(cx, indent, name, &ty));
    } else {
        let ty = match &caps[4] {
            "nextInt" | "nextLong" => INTEGER,
            "nextDouble" | "nextFloat" => REAL,
            "nextBoolean" => BOOLEAN,
            _ => STRING,
        };
        cx.state.declared_types.entry(name.to_string()).or_insert_with(|| ty.to_string());
    }
    lines.push(format!("{}{} {}", indent, cx.kw(Keyword::Input), name));
    Some(Conversion::lines(lines))
}

/// `int[] a = new int[5];` and `int[] a = {1, 2, 3};`
pub fn convert_array_declaration(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    if let Some(caps) = ARRAY_NEW.captures(code) {
        if caps.get(2).is_none() && caps.get(4).is_none() {
            return None;
        }
        let (name, ty) = (&caps[3], java_param_type(&caps[1]));
        let size = cx.expr(&caps[5]);
        cx.state.declared_types.insert(name.to_string(), format!("ARRAY OF {}", ty));
        return Some(Conversion::line(format!("{}{}", indent, cx.policy.array_declaration(name, &size, &ty))));
    }

    let caps = ARRAY_LITERAL.captures(code)?;
    if caps.get(2).is_none() && caps.get(4).is_none() {
        return None;
    }
    let (name, ty) = (&caps[3], java_param_type(&caps[1]));
    let items: Vec<String> = split_top_level(&caps[5], ',').into_iter().map(|i| cx.expr(i)).collect();

    let mut lines = Vec::new();
    if cx.policy.declare_variables && cx.state.declare(name, &format!("ARRAY OF {}", ty)) {
        lines.push(format!(
            "{}{}",
            indent,
            cx.policy.array_declaration(name, &items.len().to_string(), &ty)
        ));
    }
    lines.push(cx.assign(indent, name, &format!("[{}]", items.join(", "))));
    Some(Conversion::lines(lines))
}

/// Typed declarations. Directly inside a class they are fields; `final`
/// ones become constants where the dialect has them.
pub fn convert_declaration(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = DECLARATION.captures(code)?;
    let modifiers = &caps[1];
    let java_ty = &caps[2];
    if NOT_TYPES.contains(&java_ty) {
        return None;
    }
    let ty = java_param_type(java_ty);
    let names: Vec<&str> = caps[3].split(',').map(str::trim).collect();
    let value = caps.get(4).map(|m| m.as_str().trim());
    if value.is_some() && names.len() > 1 {
        return None;
    }
    let is_final = modifiers.split_whitespace().any(|m| m == "final");

    if let (true, true, Some(value)) = (is_final, cx.policy.constants, value) {
        cx.state.declared_types.entry(names[0].to_string()).or_insert_with(|| ty.clone());
        return Some(Conversion::line(format!(
            "{}{} {} = {}",
            indent,
            cx.kw(Keyword::Constant),
            names[0],
            cx.expr(value)
        )));
    }

    if cx.state.open_class().is_some() {
        if cx.policy.object_model {
            let private = !modifiers.split_whitespace().any(|m| m == "public");
            let visibility = cx.kw(if private { Keyword::Private } else { Keyword::Public });
            let lines = names
                .iter()
                .map(|name| {
                    cx.state.declared_types.insert(name.to_string(), ty.clone());
                    format!("{}{} {} : {}", indent, visibility, name, ty)
                })
                .collect();
            return Some(Conversion::lines(lines));
        }
        return Some(match value {
            Some(value) => Conversion::line(cx.assign(indent, names[0], &cx.expr(value))),
            None => Conversion::empty(),
        });
    }

    let mut lines: Vec<String> = Vec::new();
    for name in &names {
        lines.extend(declare_line(cx, indent, name, &ty));
    }
    if let Some(value) = value {
        lines.push(cx.assign(indent, names[0], &cx.expr(value)));
    }
    Some(Conversion::lines(lines))
}

/// `x++` / `--x`
pub fn convert_increment(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = INCREMENT.captures(code)?;
    let (target, op) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
        (Some(t), Some(op), _, _) | (_, _, Some(op), Some(t)) => (t.as_str(), op.as_str()),
        _ => return None,
    };
    let sign = if op == "++" { "+" } else { "-" };
    let target = cx.expr(target);
    let value = format!("{} {} 1", target, sign);
    Some(Conversion::line(cx.assign(indent, &target, &value)))
}

pub fn convert_compound_assignment(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = COMPOUND.captures(code)?;
    let target = cx.expr(&caps[1]);
    let value = cx.expr(&format!("{} {} {}", &caps[1], &caps[2], &caps[3]));
    Some(Conversion::line(cx.assign(indent, &target, &value)))
}

pub fn convert_assignment(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let code = code.strip_suffix(';')?.trim_end();
    let at = find_assignment_eq(code)?;
    let target = code[..at].trim();
    let value = code[at + 1..].trim();
    if value.is_empty() || !is_assignable(target) {
        return None;
    }
    Some(Conversion::line(cx.assign(indent, &cx.expr(target), &cx.expr(value))))
}

/// A call used as a statement: `greet(name);`, `list.add(x);`
pub fn convert_call(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = CALL.captures(code)?;
    if CONTROL_WORDS.contains(&&caps[1]) {
        return None;
    }
    let call = cx.expr(code.trim_end_matches(';').trim_end());
    let line = if cx.policy.call_keyword {
        format!("{}{} {}", indent, cx.kw(Keyword::Call), call)
    } else {
        format!("{}{}", indent, call)
    };
    Some(Conversion::line(line))
}
