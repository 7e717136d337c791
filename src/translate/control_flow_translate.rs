//! Control Flow Translation
//!
//! Block headers of indentation sources:
//! ```text
//! if score >= 50:          IF score ≥ 50 THEN
//! elif score >= 40:        ELSE IF score ≥ 40 THEN
//! for i in range(1, 11):   FOR i ← 1 TO 10
//! while x < 10:            WHILE x < 10 DO
//! except ValueError as e:  CATCH ValueError
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Conversion, Ctx};
use crate::block::{BlockFrame, BlockKind};
use crate::dialect::{CollectionLoop, Keyword};
use crate::helpers::split_top_level;

static IF_HEADER: Lazy<Regex> = lazy_regex!(r"^if\b\s*(.+?)\s*:$");
static ELIF_HEADER: Lazy<Regex> = lazy_regex!(r"^elif\b\s*(.+?)\s*:$");
static ELSE_HEADER: Lazy<Regex> = lazy_regex!(r"^else\s*:$");
static FOR_RANGE: Lazy<Regex> = lazy_regex!(r"^for\s+([A-Za-z_]\w*)\s+in\s+range\s*\((.*)\)\s*:$");
static FOR_EACH: Lazy<Regex> = lazy_regex!(r"^for\s+([A-Za-z_]\w*)\s+in\s+(.+?)\s*:$");
static WHILE_HEADER: Lazy<Regex> = lazy_regex!(r"^while\b\s*(.+?)\s*:$");
static TRY_HEADER: Lazy<Regex> = lazy_regex!(r"^try\s*:$");
static EXCEPT_HEADER: Lazy<Regex> = lazy_regex!(r"^except\b\s*(.*?)\s*:$");
static FINALLY_HEADER: Lazy<Regex> = lazy_regex!(r"^finally\s*:$");

/// `n - 1`, folded when `n` is an integer literal.
pub fn minus_one(bound: &str) -> String {
    offset_bound(bound, -1)
}

/// `n + 1`, folded when `n` is an integer literal.
pub fn plus_one(bound: &str) -> String {
    offset_bound(bound, 1)
}

fn offset_bound(bound: &str, delta: i64) -> String {
    let bound = bound.trim();
    match bound.parse::<i64>() {
        Ok(n) => (n + delta).to_string(),
        Err(_) if delta < 0 => format!("{} - {}", bound, -delta),
        Err(_) => format!("{} + {}", bound, delta),
    }
}

fn is_negative(step: &str) -> bool {
    step.trim().starts_with('-')
}

/// Collection iteration in the active dialect's style. The frame closes with
/// the ordinary `For` terminator.
pub fn collection_loop(var: &str, collection: &str, indent: &str, cx: &Ctx<'_>) -> Conversion {
    let frame = BlockFrame::for_loop(var);
    match cx.policy.collection_loop {
        CollectionLoop::ForEach => {
            Conversion::open(format!("{}FOR EACH {} IN {}", indent, var, collection), frame)
        }
        CollectionLoop::Iterator => Conversion::open_lines(
            vec![
                format!("{}{}.resetNext()", indent, collection),
                format!("{}loop {} {}.hasNext()", indent, cx.kw(Keyword::While), collection),
                cx.assign(&cx.body_indent(indent), var, &format!("{}.getNext()", collection)),
            ],
            frame,
        ),
    }
}

pub fn if_header(cond: &str, indent: &str, cx: &Ctx<'_>) -> String {
    format!("{}{} {} {}", indent, cx.kw(Keyword::If), cx.expr(cond), cx.kw(Keyword::Then))
}

pub fn elif_header(cond: &str, indent: &str, cx: &Ctx<'_>) -> String {
    format!("{}{} {} {}", indent, cx.kw(Keyword::ElseIf), cx.expr(cond), cx.kw(Keyword::Then))
}

pub fn while_header(cond: &str, indent: &str, cx: &Ctx<'_>) -> String {
    format!("{}{} {} {}", indent, cx.kw(Keyword::While), cx.expr(cond), cx.kw(Keyword::Do))
}

pub fn convert_if(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = IF_HEADER.captures(code)?;
    Some(Conversion::open(if_header(&caps[1], indent, cx), BlockFrame::new(BlockKind::If)))
}

pub fn convert_elif(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = ELIF_HEADER.captures(code)?;
    Some(Conversion::open(elif_header(&caps[1], indent, cx), BlockFrame::new(BlockKind::Elif)))
}

pub fn convert_else(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    if !ELSE_HEADER.is_match(code) {
        return None;
    }
    Some(Conversion::open(
        format!("{}{}", indent, cx.kw(Keyword::Else)),
        BlockFrame::new(BlockKind::Else),
    ))
}

pub fn convert_for_range(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = FOR_RANGE.captures(code)?;
    let var = &caps[1];
    let args = split_top_level(&caps[2], ',');

    let (start, stop, step) = match args.as_slice() {
        [stop] => ("0".to_string(), *stop, None),
        [start, stop] => (cx.expr(start), *stop, None),
        [start, stop, step] => (cx.expr(start), *stop, Some(cx.expr(step))),
        _ => return None,
    };
    let stop = cx.expr(stop);
    let end = match &step {
        Some(step) if is_negative(step) => plus_one(&stop),
        _ => minus_one(&stop),
    };

    let header = cx.policy.for_header(var, &start, &end, step.as_deref());
    Some(Conversion::open(format!("{}{}", indent, header), BlockFrame::for_loop(var)))
}

pub fn convert_for_each(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = FOR_EACH.captures(code)?;
    let collection = cx.expr(&caps[2]);
    Some(collection_loop(&caps[1], &collection, indent, cx))
}

pub fn convert_while(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = WHILE_HEADER.captures(code)?;
    Some(Conversion::open(while_header(&caps[1], indent, cx), BlockFrame::new(BlockKind::While)))
}

pub fn convert_try(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    if !TRY_HEADER.is_match(code) {
        return None;
    }
    Some(Conversion::open(format!("{}{}", indent, cx.kw(Keyword::Try)), BlockFrame::new(BlockKind::Try)))
}

pub fn convert_except(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = EXCEPT_HEADER.captures(code)?;
    let clause = caps[1].trim();
    let exception = clause.split(" as ").next().unwrap_or("").trim();
    let exception = exception.trim_start_matches('(').trim_end_matches(')');

    let line = if exception.is_empty() {
        format!("{}{}", indent, cx.kw(Keyword::Catch))
    } else {
        format!("{}{} {}", indent, cx.kw(Keyword::Catch), exception)
    };
    Some(Conversion::open(line, BlockFrame::new(BlockKind::Catch)))
}

pub fn convert_finally(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    if !FINALLY_HEADER.is_match(code) {
        return None;
    }
    Some(Conversion::open(
        format!("{}{}", indent, cx.kw(Keyword::Finally)),
        BlockFrame::new(BlockKind::Finally),
    ))
}
