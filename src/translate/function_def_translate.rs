//! Function Definition Translation
//!
//! Routine and class headers of indentation sources. A `def` cannot be
//! spelled until its body has been seen (a Cambridge routine with no
//! `return <value>` is a `PROCEDURE`), so the header emitted here is a
//! placeholder that `postprocess::finalise_routine` rewrites when the frame
//! closes.
//!
//! ```text
//! def add(x, y):               FUNCTION Add(x : INTEGER, y : INTEGER) RETURNS INTEGER
//!     return x + y                RETURN x + y
//!                              ENDFUNCTION
//! square = lambda x: x * x     FUNCTION Square(x : INTEGER) RETURNS INTEGER ...
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Conversion, Ctx};
use crate::block::{BlockFrame, PendingRoutine};
use crate::dialect::Keyword;
use crate::helpers::{is_valid_identifier, split_top_level};
use crate::postprocess::routine_header;
use crate::type_resolution::{expression_type, guess_type_from_name, python_type};

static CLASS_HEADER: Lazy<Regex> =
    lazy_regex!(r"^class\s+([A-Za-z_]\w*)\s*(?:\(\s*([^)]*?)\s*\))?\s*:$");
static DEF_HEADER: Lazy<Regex> =
    lazy_regex!(r"^def\s+([A-Za-z_]\w*)\s*\((.*)\)\s*(?:->\s*(.+?))?\s*:$");
static RETURN_STMT: Lazy<Regex> = lazy_regex!(r"^return\b\s*(.*)$");
static LAMBDA_ASSIGN: Lazy<Regex> =
    lazy_regex!(r"^([A-Za-z_]\w*)\s*=\s*lambda\b\s*([^:]*):\s*(.+)$");

/// Parameter names from a Python parameter list, without annotations,
/// defaults or star prefixes.
pub fn parameter_names(list: &str) -> Vec<String> {
    split_top_level(list, ',')
        .into_iter()
        .map(|p| {
            let p = p.split('=').next().unwrap_or(p);
            let p = p.split(':').next().unwrap_or(p);
            p.trim().trim_start_matches('*').trim().to_string()
        })
        .filter(|p| !p.is_empty() && p != "/")
        .collect()
}

pub fn convert_class(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = CLASS_HEADER.captures(code)?;
    let name = &caps[1];
    let base = caps
        .get(2)
        .and_then(|m| split_top_level(m.as_str(), ',').first().map(|b| b.to_string()))
        .filter(|b| !b.is_empty() && b != "object");

    let mut lines = vec![match base {
        Some(base) => format!("{}{} {} {} {}", indent, cx.kw(Keyword::Class), name, cx.kw(Keyword::Inherits), base),
        None => format!("{}{} {}", indent, cx.kw(Keyword::Class), name),
    }];

    if cx.policy.object_model {
        let body = cx.body_indent(indent);
        if let Some(fields) = cx.state.class_fields.get(name) {
            for field in fields {
                lines.push(format!(
                    "{}{} {} : {}",
                    body,
                    cx.kw(Keyword::Private),
                    field,
                    guess_type_from_name(field)
                ));
            }
        }
    }

    Some(Conversion::open_lines(lines, BlockFrame::class(name)))
}

pub fn convert_def(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = DEF_HEADER.captures(code)?;
    let name = caps[1].to_string();
    let class = cx.state.open_class().map(str::to_string);
    let is_method = class.is_some();

    let routine = PendingRoutine {
        header_index: cx.state.output.len(),
        is_constructor: is_method && name == "__init__",
        name,
        class,
        params: parameter_names(&caps[2]),
        is_method,
    };

    if let Some(ty) = caps.get(3).and_then(|m| python_type(m.as_str())) {
        cx.state.return_types.insert(routine.key(), ty.to_string());
    }

    let (placeholder, _) = routine_header(cx.policy, &routine, false, None);
    Some(Conversion::open(format!("{}{}", indent, placeholder), BlockFrame::routine(routine)))
}

/// A bare name no line ever assigns (a parameter, a global from elsewhere)
/// is typed from its spelling. Known variables without a recorded type stay
/// unknown, leaving the header to the parameter guess.
fn unassigned_reference_type(cx: &Ctx<'_>, value: &str) -> Option<&'static str> {
    if !cx.policy.typed_parameters
        || !is_valid_identifier(value)
        || matches!(value, "None" | "self")
        || cx.state.declared_names.contains(value)
    {
        return None;
    }
    Some(guess_type_from_name(value))
}

pub fn convert_return(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = RETURN_STMT.captures(code)?;
    let value = caps[1].trim();
    if value.is_empty() {
        return Some(Conversion::line(format!("{}{}", indent, cx.kw(Keyword::Return))));
    }

    let ty = expression_type(value)
        .map(str::to_string)
        .or_else(|| cx.state.declared_types.get(value).cloned())
        .or_else(|| unassigned_reference_type(cx, value).map(str::to_string));
    cx.state.mark_return(ty.as_deref());
    Some(Conversion::line(format!("{}{} {}", indent, cx.kw(Keyword::Return), cx.expr(value))))
}

/// `name = lambda params: expr` becomes a one-statement function.
pub fn convert_lambda(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = LAMBDA_ASSIGN.captures(code)?;
    let name = caps[1].to_string();
    cx.state.lambdas.insert(name.clone());

    let routine = PendingRoutine {
        header_index: 0,
        name,
        class: None,
        params: parameter_names(&caps[2]),
        is_method: false,
        is_constructor: false,
    };
    let return_type = expression_type(&caps[3]);
    let (header, kind) = routine_header(cx.policy, &routine, true, return_type);

    Some(Conversion::lines(vec![
        format!("{}{}", indent, header),
        format!("{}{} {}", cx.body_indent(indent), cx.kw(Keyword::Return), cx.expr(&caps[3])),
        format!("{}{}", indent, cx.policy.terminator(kind, None, None)),
        String::new(),
    ]))
}
