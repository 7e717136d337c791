//! Java Control Translation
//!
//! Block headers of brace sources. Leading `}` tokens have already been
//! consumed by the brace tracker, so a header arrives as e.g.
//! `else if (x > 5) {`. The trailing `{` is optional here; the tracker
//! decides ownership from the brace count.
//!
//! ```text
//! for (int i = 0; i < n; i++) {     FOR i ← 0 TO n - 1
//! for (int i = 10; i > 0; i--) {    FOR i ← 10 TO 1 STEP -1
//! public int add(int a, int b) {    PUBLIC FUNCTION Add(a : INTEGER, b : INTEGER) RETURNS INTEGER
//! do {                              REPEAT
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::control_flow_translate::{collection_loop, elif_header, if_header, minus_one, plus_one, while_header};
use super::{Conversion, Ctx};
use crate::block::{BlockFrame, BlockKind};
use crate::dialect::{DialectPolicy, Keyword};
use crate::helpers::{split_top_level, to_pascal_case};
use crate::type_resolution::{java_type, INTEGER};

static CLASS_HEADER: Lazy<Regex> = lazy_regex!(
    r"^(?:(?:public|private|protected|abstract|final|static)\s+)*class\s+([A-Za-z_]\w*)(?:\s*<[^>]*>)?(?:\s+extends\s+([A-Za-z_]\w*))?(?:\s+implements\s+[\w\s,<>]+?)?\s*\{?$"
);
static METHOD_HEADER: Lazy<Regex> = lazy_regex!(
    r"^((?:(?:public|private|protected|static|final|abstract|synchronized)\s+)*)(?:([\w<>\[\]]+(?:\s*,\s*[\w<>\[\]]+)*)\s+)?([A-Za-z_]\w*)\s*\(([^)]*)\)\s*(?:throws\s+[\w\s,.]+?)?\s*\{$"
);
static ELSE_IF_HEADER: Lazy<Regex> = lazy_regex!(r"^else\s+if\s*\((.*)\)\s*\{?$");
static IF_HEADER: Lazy<Regex> = lazy_regex!(r"^if\s*\((.*)\)\s*\{?$");
static ELSE_HEADER: Lazy<Regex> = lazy_regex!(r"^else\s*\{?$");
static FOR_COUNT: Lazy<Regex> = lazy_regex!(
    r"^for\s*\(\s*(?:(?:int|long|short|byte)\s+)?([A-Za-z_]\w*)\s*=\s*([^;]+?)\s*;\s*([A-Za-z_]\w*)\s*(<=|<|>=|>)\s*([^;]+?)\s*;\s*([^)]*?)\s*\)\s*\{?$"
);
static FOR_EACH: Lazy<Regex> = lazy_regex!(
    r"^for\s*\(\s*(?:final\s+)?[\w<>\[\]]+\s+([A-Za-z_]\w*)\s*:\s*(.+?)\s*\)\s*\{?$"
);
static WHILE_HEADER: Lazy<Regex> = lazy_regex!(r"^while\s*\((.*)\)\s*\{?$");
static EMPTY_WHILE: Lazy<Regex> = lazy_regex!(r"^while\s*\((.*)\)\s*;$");
static DO_HEADER: Lazy<Regex> = lazy_regex!(r"^do\s*\{?$");
static TRY_HEADER: Lazy<Regex> = lazy_regex!(r"^try\s*\{?$");
static CATCH_HEADER: Lazy<Regex> =
    lazy_regex!(r"^catch\s*\(\s*(?:final\s+)?([\w.]+(?:\s*\|\s*[\w.]+)*)\s+[A-Za-z_]\w*\s*\)\s*\{?$");
static FINALLY_HEADER: Lazy<Regex> = lazy_regex!(r"^finally\s*\{?$");

const NOT_METHOD_NAMES: &[&str] = &["if", "while", "for", "switch", "catch", "synchronized", "return", "new"];

/// Pseudocode type of a Java type, with arrays spelled out.
pub fn java_param_type(ty: &str) -> String {
    match ty.trim().strip_suffix("[]") {
        Some(element) => format!("ARRAY OF {}", java_type(element)),
        None => java_type(ty),
    }
}

/// Step of a counting loop update clause; `None` for a unit increment.
/// Unrecognised updates also yield `None`.
fn loop_step(update: &str, var: &str) -> Option<String> {
    let u: String = update.chars().filter(|c| !c.is_whitespace()).collect();
    if u == format!("{}++", var) || u == format!("++{}", var) {
        return None;
    }
    if u == format!("{}--", var) || u == format!("--{}", var) {
        return Some("-1".to_string());
    }
    if let Some(k) = u.strip_prefix(&format!("{}+=", var)) {
        return Some(k.to_string());
    }
    if let Some(k) = u.strip_prefix(&format!("{}-=", var)) {
        return Some(format!("-{}", k));
    }
    None
}

pub fn convert_class(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = CLASS_HEADER.captures(code)?;
    let name = &caps[1];
    let line = match caps.get(2) {
        Some(base) => format!(
            "{}{} {} {} {}",
            indent,
            cx.kw(Keyword::Class),
            name,
            cx.kw(Keyword::Inherits),
            base.as_str()
        ),
        None => format!("{}{} {}", indent, cx.kw(Keyword::Class), name),
    };
    Some(Conversion::open(line, BlockFrame::class(name)))
}

fn method_header(
    policy: &DialectPolicy,
    modifiers: &str,
    name: &str,
    params: &[(String, String)],
    return_type: Option<&str>,
    is_constructor: bool,
    in_class: bool,
) -> (String, BlockKind) {
    let kind = match return_type {
        Some("void") | None if policy.procedures => BlockKind::Procedure,
        _ => BlockKind::Function,
    };
    let keyword = match kind {
        BlockKind::Procedure => policy.kw(Keyword::Procedure),
        _ => policy.kw(Keyword::Function),
    };

    let name = if is_constructor && policy.object_model {
        policy.kw(Keyword::New).to_string()
    } else if policy.capitalise_routines {
        to_pascal_case(name)
    } else {
        name.to_string()
    };

    let rendered: Vec<String> = params
        .iter()
        .map(|(p, ty)| if policy.typed_parameters { format!("{} : {}", p, ty) } else { p.clone() })
        .collect();

    let visibility = if in_class && policy.object_model {
        let private = modifiers.split_whitespace().any(|m| m == "private");
        format!("{} ", policy.kw(if private { Keyword::Private } else { Keyword::Public }))
    } else {
        String::new()
    };

    let mut header = format!("{}{} {}({})", visibility, keyword, name, rendered.join(", "));
    if let (BlockKind::Function, Some(ty), true) = (kind, return_type, policy.typed_parameters) {
        if ty != "void" {
            header.push_str(&format!(" {} {}", policy.kw(Keyword::Returns), java_param_type(ty)));
        }
    }
    (header, kind)
}

/// Method and constructor headers. `main(String[] args)` loses its
/// parameter.
pub fn convert_method(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = METHOD_HEADER.captures(code)?;
    let name = &caps[3];
    if NOT_METHOD_NAMES.contains(&name) {
        return None;
    }
    let return_type = caps.get(2).map(|m| m.as_str());
    if return_type.map_or(false, |t| NOT_METHOD_NAMES.contains(&t) || t == "else") {
        return None;
    }
    let class = cx.state.open_class().map(str::to_string);
    let is_constructor = return_type.is_none() && class.as_deref() == Some(name);
    if return_type.is_none() && !is_constructor {
        return None;
    }

    let mut params = Vec::new();
    if name != "main" {
        for param in split_top_level(&caps[4], ',') {
            let param = param.trim_start_matches("final ").trim();
            let Some((ty, pname)) = param.rsplit_once(char::is_whitespace) else {
                continue;
            };
            let ty = java_param_type(ty);
            cx.state.declared_types.insert(pname.to_string(), ty.clone());
            params.push((pname.to_string(), ty));
        }
    }

    let (header, kind) = method_header(cx.policy, &caps[1], name, &params, return_type, is_constructor, class.is_some());
    Some(Conversion::open(format!("{}{}", indent, header), BlockFrame::new(kind)))
}

pub fn convert_else_if(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = ELSE_IF_HEADER.captures(code)?;
    Some(Conversion::open(elif_header(&caps[1], indent, cx), BlockFrame::new(BlockKind::Elif)))
}

pub fn convert_if(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = IF_HEADER.captures(code)?;
    Some(Conversion::open(if_header(&caps[1], indent, cx), BlockFrame::new(BlockKind::If)))
}

pub fn convert_else(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    if !ELSE_HEADER.is_match(code) {
        return None;
    }
    Some(Conversion::open(format!("{}{}", indent, cx.kw(Keyword::Else)), BlockFrame::new(BlockKind::Else)))
}

pub fn convert_for_count(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = FOR_COUNT.captures(code)?;
    let var = &caps[1];
    if &caps[3] != var {
        return None;
    }
    let bound = cx.expr(&caps[5]);
    let end = match &caps[4] {
        "<" => minus_one(&bound),
        ">" => plus_one(&bound),
        _ => bound,
    };
    let step = loop_step(&caps[6], var);
    let start = cx.expr(&caps[2]);

    cx.state.declared_types.entry(var.to_string()).or_insert_with(|| INTEGER.to_string());
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

/// `while (cond);` waits without a body: an empty loop, opened and closed
/// on the spot.
pub fn convert_empty_while(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = EMPTY_WHILE.captures(code)?;
    let header = while_header(&caps[1], indent, cx);
    let end = format!("{}{}", indent, cx.policy.terminator(BlockKind::While, None, None));
    Some(Conversion::lines(vec![header, end]))
}

/// `do {` opens a `REPEAT`; the condition arrives with the closing
/// `} while (...);`.
pub fn convert_do(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    if !DO_HEADER.is_match(code) {
        return None;
    }
    Some(Conversion::open(format!("{}{}", indent, cx.kw(Keyword::Repeat)), BlockFrame::new(BlockKind::Repeat)))
}

pub fn convert_try(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    if !TRY_HEADER.is_match(code) {
        return None;
    }
    Some(Conversion::open(format!("{}{}", indent, cx.kw(Keyword::Try)), BlockFrame::new(BlockKind::Try)))
}

pub fn convert_catch(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    let caps = CATCH_HEADER.captures(code)?;
    let exception: Vec<&str> = caps[1].split('|').map(str::trim).collect();
    Some(Conversion::open(
        format!("{}{} {}", indent, cx.kw(Keyword::Catch), exception.join(", ")),
        BlockFrame::new(BlockKind::Catch),
    ))
}

pub fn convert_finally(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<Conversion> {
    if !FINALLY_HEADER.is_match(code) {
        return None;
    }
    Some(Conversion::open(format!("{}{}", indent, cx.kw(Keyword::Finally)), BlockFrame::new(BlockKind::Finally)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{CAMBRIDGE, IB};
    use crate::options::SourceConvention;
    use crate::parser_state::ParserState;
    use crate::translate::ConvertFn;

    fn run_with(state: &mut ParserState, f: ConvertFn, code: &str, ib: bool) -> Option<Conversion> {
        let policy = if ib { &IB } else { &CAMBRIDGE };
        let mut cx = Ctx::new(state, policy, SourceConvention::Braces);
        f(code, "", &mut cx)
    }

    fn run(f: ConvertFn, code: &str, ib: bool) -> Option<Conversion> {
        run_with(&mut ParserState::new(), f, code, ib)
    }

    fn in_class(name: &str) -> ParserState {
        let mut state = ParserState::new();
        state.block_stack.push(BlockFrame::class(name));
        state
    }

    #[test]
    fn test_class_header() {
        let conv = run(convert_class, "public class Dog extends Animal {", false).unwrap();
        assert_eq!(conv.lines, vec!["CLASS Dog INHERITS Animal"]);
        assert_eq!(conv.opens.and_then(|f| f.name).as_deref(), Some("Dog"));
        assert_eq!(run(convert_class, "class Main", true).unwrap().lines, vec!["CLASS Main"]);
    }

    #[test]
    fn test_method_headers() {
        let mut state = in_class("Calc");
        let conv = run_with(&mut state, convert_method, "public int add(int a, int b) {", false).unwrap();
        assert_eq!(conv.lines, vec!["PUBLIC FUNCTION Add(a : INTEGER, b : INTEGER) RETURNS INTEGER"]);
        assert_eq!(conv.opens.map(|f| f.kind), Some(BlockKind::Function));

        let conv = run_with(&mut state, convert_method, "private void log(String msg) {", false).unwrap();
        assert_eq!(conv.lines, vec!["PRIVATE PROCEDURE Log(msg : STRING)"]);
        assert_eq!(conv.opens.map(|f| f.kind), Some(BlockKind::Procedure));
        assert_eq!(state.declared_types.get("msg").map(String::as_str), Some("STRING"));

        let conv = run_with(&mut state, convert_method, "public static void main(String[] args) {", false).unwrap();
        assert_eq!(conv.lines, vec!["PUBLIC PROCEDURE Main()"]);
    }

    #[test]
    fn test_constructor() {
        let mut state = in_class("Dog");
        let conv = run_with(&mut state, convert_method, "public Dog(String name) {", false).unwrap();
        assert_eq!(conv.lines, vec!["PUBLIC PROCEDURE NEW(name : STRING)"]);

        let mut state = in_class("Dog");
        let conv = run_with(&mut state, convert_method, "public Dog(String name) {", true).unwrap();
        assert_eq!(conv.lines, vec!["FUNCTION Dog(name)"]);
    }

    #[test]
    fn test_method_rejects_control_headers_and_calls() {
        assert!(run(convert_method, "if (x > 0) {", false).is_none());
        assert!(run(convert_method, "while (running) {", false).is_none());
        assert!(run(convert_method, "greet(name);", false).is_none());
        assert!(run(convert_method, "foo(x) {", false).is_none());
    }

    #[test]
    fn test_conditionals() {
        assert_eq!(run(convert_if, "if (x >= 10 && !done) {", false).unwrap().lines, vec!["IF x ≥ 10 AND NOT done THEN"]);
        assert_eq!(run(convert_else_if, "else if (x == 5) {", true).unwrap().lines, vec!["ELSE IF x = 5 THEN"]);
        assert_eq!(run(convert_else, "else {", false).unwrap().lines, vec!["ELSE"]);
        assert!(run(convert_else, "else if (y) {", false).is_none());
    }

    #[test]
    fn test_counting_loops() {
        let lines = |code: &str, ib: bool| run(convert_for_count, code, ib).unwrap().lines;
        assert_eq!(lines("for (int i = 0; i < 5; i++) {", false), vec!["FOR i ← 0 TO 4"]);
        assert_eq!(lines("for (int i = 1; i <= n; i++) {", false), vec!["FOR i ← 1 TO n"]);
        assert_eq!(lines("for (int i = 10; i > 0; i--) {", false), vec!["FOR i ← 10 TO 1 STEP -1"]);
        assert_eq!(lines("for (int i = 10; i >= 0; i -= 2) {", false), vec!["FOR i ← 10 TO 0 STEP -2"]);
        assert_eq!(lines("for (int i = 0; i < 10; i += 3) {", true), vec!["loop i from 0 to 9"]);
        assert_eq!(lines("for (int i = 0; i < arr.length; i++) {", false), vec!["FOR i ← 0 TO LENGTH(arr) - 1"]);
        assert!(run(convert_for_count, "for (int i = 0; j < 5; i++) {", false).is_none());
    }

    #[test]
    fn test_enhanced_for() {
        assert_eq!(
            run(convert_for_each, "for (String name : names) {", false).unwrap().lines,
            vec!["FOR EACH name IN names"]
        );
        let conv = run(convert_for_each, "for (int n : nums) {", true).unwrap();
        assert_eq!(conv.lines[0], "nums.resetNext()");
        assert_eq!(conv.opens.and_then(|f| f.loop_variable).as_deref(), Some("n"));
    }

    #[test]
    fn test_loops_and_exceptions() {
        assert_eq!(run(convert_while, "while (count < 3) {", false).unwrap().lines, vec!["WHILE count < 3 DO"]);
        assert!(run(convert_while, "while (busy());", false).is_none());
        let conv = run(convert_empty_while, "while (busy());", true).unwrap();
        assert_eq!(conv.lines, vec!["WHILE busy() DO", "END WHILE"]);
        assert!(conv.opens.is_none());
        let conv = run(convert_do, "do {", false).unwrap();
        assert_eq!(conv.lines, vec!["REPEAT"]);
        assert_eq!(conv.opens.map(|f| f.kind), Some(BlockKind::Repeat));
        assert_eq!(run(convert_try, "try {", true).unwrap().lines, vec!["TRY"]);
        assert_eq!(
            run(convert_catch, "catch (ArithmeticException e) {", false).unwrap().lines,
            vec!["CATCH ArithmeticException"]
        );
        assert_eq!(
            run(convert_catch, "catch (IOException | RuntimeException e) {", false).unwrap().lines,
            vec!["CATCH IOException, RuntimeException"]
        );
        assert_eq!(run(convert_finally, "finally {", false).unwrap().lines, vec!["FINALLY"]);
    }

    #[test]
    fn test_loop_step() {
        assert_eq!(loop_step("i++", "i"), None);
        assert_eq!(loop_step("--i", "i"), Some("-1".to_string()));
        assert_eq!(loop_step("i += 2", "i"), Some("2".to_string()));
        assert_eq!(loop_step("i -= 3", "i"), Some("-3".to_string()));
    }
}
