//! Post-processing of emitted lines
//!
//! - Rewriting a Python routine's placeholder header once its body is known
//! - Attaching inline comments to the first emitted line

use tracing::debug;

use crate::block::{BlockKind, PendingRoutine};
use crate::dialect::{DialectPolicy, Keyword};
use crate::helpers::to_pascal_case;
use crate::parser_state::ParserState;
use crate::type_resolution::{guess_return_type, guess_type_from_name};

/// Header text for a routine, as it should finally read.
pub fn routine_header(
    policy: &DialectPolicy,
    routine: &PendingRoutine,
    returns: bool,
    return_type: Option<&str>,
) -> (String, BlockKind) {
    let kind = if policy.procedures && (routine.is_constructor || !returns) {
        BlockKind::Procedure
    } else {
        BlockKind::Function
    };
    let keyword = match kind {
        BlockKind::Procedure => policy.kw(Keyword::Procedure),
        _ => policy.kw(Keyword::Function),
    };

    let params: Vec<&str> = routine
        .params
        .iter()
        .map(String::as_str)
        .filter(|p| !(policy.typed_parameters && *p == "self"))
        .collect();
    let param_types: Vec<&'static str> = params.iter().map(|p| guess_type_from_name(p)).collect();

    let rendered: Vec<String> = if policy.typed_parameters {
        params
            .iter()
            .zip(&param_types)
            .map(|(p, t)| format!("{} : {}", p, t))
            .collect()
    } else {
        params.iter().map(|p| p.to_string()).collect()
    };

    let name = if routine.is_constructor && policy.object_model {
        policy.kw(Keyword::New).to_string()
    } else if policy.capitalise_routines {
        to_pascal_case(&routine.name)
    } else {
        routine.name.clone()
    };

    let visibility = if routine.is_method && policy.object_model {
        if routine.name.starts_with('_') && !routine.is_constructor {
            format!("{} ", policy.kw(Keyword::Private))
        } else {
            format!("{} ", policy.kw(Keyword::Public))
        }
    } else {
        String::new()
    };

    let mut header = format!("{}{} {}({})", visibility, keyword, name, rendered.join(", "));
    if kind == BlockKind::Function && policy.typed_parameters {
        let ty = return_type.unwrap_or_else(|| guess_return_type(&param_types));
        header.push_str(&format!(" {} {}", policy.kw(Keyword::Returns), ty));
    }
    (header, kind)
}

/// Rewrite the placeholder header of `routine` and report the block kind
/// its terminator should use.
pub fn finalise_routine(state: &mut ParserState, policy: &DialectPolicy, routine: &PendingRoutine) -> BlockKind {
    let key = routine.key();
    let returns = state.returns_value(&key);
    let return_type = state.return_types.get(&key).cloned();
    let (header, kind) = routine_header(policy, routine, returns, return_type.as_deref());

    match state.output.get_mut(routine.header_index) {
        Some(line) => {
            let indent: String = line.chars().take_while(|c| *c == ' ').collect();
            let comment = line.find("  // ").map(|at| line[at..].to_string()).unwrap_or_default();
            debug!(routine = %key, returns, header = %header, "patched routine header");
            *line = format!("{}{}{}", indent, header, comment);
        }
        None => debug!(routine = %key, index = routine.header_index, "routine header index out of range"),
    }
    kind
}

/// Append `  // comment` to the first line of a converted block.
pub fn attach_inline_comment(lines: &mut [String], comment: &str) {
    if comment.is_empty() {
        return;
    }
    if let Some(first) = lines.first_mut() {
        first.push_str("  // ");
        first.push_str(comment);
    }
}
