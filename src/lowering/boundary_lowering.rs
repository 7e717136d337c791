//! Boundary Lowering
//!
//! Maps a source convention onto block boundaries. Before a line is
//! converted, `enter_line` closes whatever the line ends and sets aside the
//! frame a continuation replaces. After conversion, `leave_line` pushes the
//! frame the line opened and settles the nesting stacks.
//!
//! Indentation sources keep `indent_stack` one level per frame whose body
//! has begun; a frame pushed by a header waits for its first deeper line.
//!
//! Brace sources keep `brace_stack` one entry per unmatched `{`. Every open
//! frame either owns exactly one `true` entry or is braceless, in which case
//! its body is the next statement. A frame whose body has ended but whose
//! chain goes on (`} else {`, `}` then `catch` on the next line, a `do`
//! tail) owns no brace and is marked by `chain_pending` until the
//! continuation line takes it.

use tracing::{trace, warn};

use super::depth_tracking_lowering::count_braces_outside_strings;
use super::lookahead_lowering::{next_code_line, starts_with_keyword};
use super::source_lines_lowering::SourceLine;
use crate::block::{BlockFrame, BlockKind};
use crate::block_tracker::{close_frame, push_frame, take_for_continuation};
use crate::dialect::{DialectPolicy, Keyword};
use crate::error_msg::ErrorCode;
use crate::options::SourceConvention;
use crate::parser_state::ParserState;
use crate::translate::translate_expression;

/// One code line after boundary handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEntry {
    /// What remains to convert; empty when the line was pure structure
    pub code: String,
    /// Frame taken off the stack for a continuation line
    pub taken: Option<BlockFrame>,
}

pub trait BlockBoundaries: Sync {
    fn enter_line(
        &self,
        state: &mut ParserState,
        policy: &DialectPolicy,
        lines: &[SourceLine],
        idx: usize,
    ) -> LineEntry;

    fn leave_line(
        &self,
        state: &mut ParserState,
        policy: &DialectPolicy,
        lines: &[SourceLine],
        idx: usize,
        entry: LineEntry,
        opened: Option<BlockFrame>,
    );
}

pub struct IndentationBoundaries;
pub struct BraceBoundaries;

static INDENTATION: IndentationBoundaries = IndentationBoundaries;
static BRACES: BraceBoundaries = BraceBoundaries;

pub fn boundaries_for(convention: SourceConvention) -> &'static dyn BlockBoundaries {
    match convention {
        SourceConvention::Indentation => &INDENTATION,
        SourceConvention::Braces => &BRACES,
    }
}

/// Continuation kind of an indentation header (`elif ...:`, `else:`,
/// `except ...:`, `finally:`).
pub fn indentation_continuation(code: &str) -> Option<BlockKind> {
    if !code.ends_with(':') {
        return None;
    }
    if starts_with_keyword(code, "elif") {
        Some(BlockKind::Elif)
    } else if starts_with_keyword(code, "else") {
        Some(BlockKind::Else)
    } else if starts_with_keyword(code, "except") {
        Some(BlockKind::Catch)
    } else if starts_with_keyword(code, "finally") {
        Some(BlockKind::Finally)
    } else {
        None
    }
}

/// Continuation kind of a brace header (`else if`, `else`, `catch`,
/// `finally`).
pub fn brace_continuation(code: &str) -> Option<BlockKind> {
    let code = code.trim_start();
    if starts_with_keyword(code, "else") {
        let rest = code["else".len()..].trim_start();
        if starts_with_keyword(rest, "if") {
            Some(BlockKind::Elif)
        } else {
            Some(BlockKind::Else)
        }
    } else if starts_with_keyword(code, "catch") {
        Some(BlockKind::Catch)
    } else if starts_with_keyword(code, "finally") {
        Some(BlockKind::Finally)
    } else {
        None
    }
}

fn top_level(state: &ParserState) -> usize {
    state.indent_stack.last().copied().unwrap_or(0)
}

/// Pop one indentation level and close its frame.
fn pop_level(state: &mut ParserState, policy: &DialectPolicy) {
    state.indent_stack.pop();
    close_frame(state, policy);
}

fn next_code(lines: &[SourceLine], idx: usize) -> &str {
    next_code_line(lines, idx).map_or("", |l| l.code.as_str())
}

fn top_is_braceless(state: &ParserState) -> bool {
    state.block_stack.last().map_or(false, |f| f.braceless)
}

impl BlockBoundaries for IndentationBoundaries {
    fn enter_line(
        &self,
        state: &mut ParserState,
        policy: &DialectPolicy,
        lines: &[SourceLine],
        idx: usize,
    ) -> LineEntry {
        let line = &lines[idx];
        let cur = line.columns;
        let continuation = indentation_continuation(&line.code);

        // The top frame is still waiting for its body.
        if state.block_stack.len() >= state.indent_stack.len() {
            if cur > top_level(state) {
                trace!(line = line.number, level = cur, "body begins");
                state.indent_stack.push(cur);
            } else {
                let accepted = match (state.top_kind(), continuation) {
                    (Some(top), Some(next)) => top.accepts(next),
                    _ => false,
                };
                if !accepted {
                    trace!(line = line.number, "closing block with no body");
                    close_frame(state, policy);
                }
            }
        }

        let mut taken = None;
        if let Some(kind) = continuation {
            while state.indent_stack.len() >= 2 && state.indent_stack[state.indent_stack.len() - 2] > cur {
                pop_level(state, policy);
            }
            // The next branch shares the body level of the chain.
            taken = take_for_continuation(state, kind, line.number);
        } else {
            let mut popped = false;
            while state.indent_stack.len() > 1 && cur < top_level(state) {
                pop_level(state, policy);
                popped = true;
            }
            if cur > top_level(state) {
                let code = if popped { ErrorCode::UnbalancedDedent } else { ErrorCode::UnexpectedIndent };
                warn!(
                    code = %code,
                    line = line.number,
                    columns = cur,
                    level = top_level(state),
                    "indentation does not match an open block"
                );
            }
        }

        LineEntry { code: line.code.clone(), taken }
    }

    fn leave_line(
        &self,
        state: &mut ParserState,
        _policy: &DialectPolicy,
        _lines: &[SourceLine],
        _idx: usize,
        entry: LineEntry,
        opened: Option<BlockFrame>,
    ) {
        match (opened, entry.taken) {
            (Some(frame), _) => push_frame(state, frame),
            // The continuation did not convert; the chain carries on.
            (None, Some(taken)) => push_frame(state, taken),
            (None, None) => {}
        }
    }
}

impl BraceBoundaries {
    /// Whether the chain of the top frame goes on with `next`: the code
    /// after a `}` on the same line, or the next code line.
    fn chain_continues(state: &ParserState, next: &str) -> bool {
        match (state.top_kind(), brace_continuation(next)) {
            (Some(top), Some(kind)) => top.accepts(kind),
            (Some(BlockKind::Repeat), None) => starts_with_keyword(next.trim_start(), "while"),
            _ => false,
        }
    }

    /// The body of the top frame has ended. Keep the frame when its chain
    /// goes on with `next`; otherwise close it, then every braceless frame
    /// whose single statement it was.
    fn finish_body(state: &mut ParserState, policy: &DialectPolicy, next: &str) {
        while !state.block_stack.is_empty() {
            if Self::chain_continues(state, next) {
                trace!(kind = ?state.top_kind(), "chain continues");
                state.chain_pending = true;
                return;
            }
            close_frame(state, policy);
            if !top_is_braceless(state) {
                return;
            }
        }
    }

    /// Braceless frames still waiting for a statement when an enclosing
    /// `}` arrives have an empty body.
    fn close_unfilled(state: &mut ParserState, policy: &DialectPolicy) {
        while top_is_braceless(state) {
            close_frame(state, policy);
        }
    }

    /// A `}` matched an owning `{`: the top frame's body is over.
    fn close_owned(state: &mut ParserState, policy: &DialectPolicy, next: &str) {
        Self::close_unfilled(state, policy);
        Self::finish_body(state, policy, next);
    }

    /// `while (cond);` ending a pending `do` block: record the exit
    /// condition and close the `Repeat` frame.
    fn close_do_while(state: &mut ParserState, policy: &DialectPolicy, rest: &str) -> bool {
        if state.top_kind() != Some(BlockKind::Repeat) || !starts_with_keyword(rest, "while") || !rest.ends_with(';') {
            return false;
        }
        let (Some(open), Some(close)) = (rest.find('('), rest.rfind(')')) else {
            return false;
        };
        if close <= open {
            return false;
        }
        let cond = translate_expression(&rest[open + 1..close], policy, state, SourceConvention::Braces);
        let exit = format!("{} ({})", policy.kw(Keyword::Not), cond);
        if let Some(frame) = state.block_stack.last_mut() {
            frame.exit_condition = Some(exit);
        }
        close_frame(state, policy);
        true
    }
}

impl BlockBoundaries for BraceBoundaries {
    fn enter_line(
        &self,
        state: &mut ParserState,
        policy: &DialectPolicy,
        lines: &[SourceLine],
        idx: usize,
    ) -> LineEntry {
        let line = &lines[idx];
        let mut rest = line.code.trim_start();

        while let Some(after) = rest.strip_prefix('}') {
            rest = after.trim_start();
            if std::mem::take(&mut state.chain_pending) {
                Self::finish_body(state, policy, "");
            }
            match state.brace_stack.pop() {
                None => warn!(code = %ErrorCode::StrayClosingBrace, line = line.number, "`}}` with no open block"),
                Some(false) => {}
                Some(true) => {
                    let next = if rest.is_empty() { next_code(lines, idx) } else { rest };
                    Self::close_owned(state, policy, next);
                }
            }
        }

        // A lone `}` leaves the chain to the next line.
        if state.chain_pending && !rest.is_empty() {
            state.chain_pending = false;
            if Self::close_do_while(state, policy, rest) {
                if top_is_braceless(state) {
                    Self::finish_body(state, policy, next_code(lines, idx));
                }
                return LineEntry { code: String::new(), taken: None };
            }
            if let Some(kind) = brace_continuation(rest) {
                let taken = take_for_continuation(state, kind, line.number);
                return LineEntry { code: rest.to_string(), taken };
            }
            Self::finish_body(state, policy, "");
        }

        if let Some(kind) = brace_continuation(rest) {
            // The frame it could continue still owns its `{`.
            warn!(
                code = %ErrorCode::OrphanContinuation,
                line = line.number,
                continuation = ?kind,
                open = ?state.top_kind(),
                "continuation without a matching block"
            );
        }
        LineEntry { code: rest.to_string(), taken: None }
    }

    fn leave_line(
        &self,
        state: &mut ParserState,
        policy: &DialectPolicy,
        lines: &[SourceLine],
        idx: usize,
        entry: LineEntry,
        opened: Option<BlockFrame>,
    ) {
        let (opens, closes) = count_braces_outside_strings(&entry.code);
        let statement = opened.is_none() && entry.taken.is_none() && !entry.code.is_empty();
        let mut owned = false;

        match (opened, entry.taken) {
            (Some(mut frame), _) => {
                owned = opens > 0;
                frame.braceless = !owned;
                if frame.braceless {
                    trace!(kind = ?frame.kind, "block opened without `{{`");
                }
                push_frame(state, frame);
                if owned {
                    state.brace_stack.push(true);
                }
            }
            (None, Some(taken)) => {
                // The continuation did not convert; the chain ends here.
                push_frame(state, taken);
                Self::finish_body(state, policy, "");
            }
            (None, None) => {}
        }

        for _ in usize::from(owned)..opens {
            state.brace_stack.push(false);
        }
        for _ in 0..closes {
            if std::mem::take(&mut state.chain_pending) {
                Self::finish_body(state, policy, "");
            }
            match state.brace_stack.pop() {
                Some(true) => Self::close_owned(state, policy, next_code(lines, idx)),
                Some(false) => {}
                None => warn!(code = %ErrorCode::StrayClosingBrace, line = lines[idx].number, "`}}` with no open block"),
            }
        }

        // A whole statement is the body of a braceless header.
        if statement && opens == closes && !state.chain_pending && top_is_braceless(state) {
            Self::finish_body(state, policy, next_code(lines, idx));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{CAMBRIDGE, IB};
    use crate::lowering::source_lines_lowering::split_logical_lines;

    /// Drive the boundaries with a stub converter that opens a frame for
    /// every header and echoes every other line.
    fn drive(source: &str, convention: SourceConvention, policy: &DialectPolicy) -> Vec<String> {
        let lines = split_logical_lines(source, convention);
        let boundaries = boundaries_for(convention);
        let mut state = ParserState::new();
        for idx in 0..lines.len() {
            if !lines[idx].is_code() {
                continue;
            }
            let entry = boundaries.enter_line(&mut state, policy, &lines, idx);
            let opened = stub_convert(&entry.code).map(|(text, kind)| {
                state.emit(format!("{}{}", policy.indent(state.depth()), text));
                BlockFrame::new(kind)
            });
            if opened.is_none() && !entry.code.is_empty() {
                state.emit(format!("{}{}", policy.indent(state.depth()), entry.code));
            }
            boundaries.leave_line(&mut state, policy, &lines, idx, entry, opened);
        }
        if convention == SourceConvention::Braces {
            let owning_braces = state.brace_stack.iter().filter(|owns| **owns).count();
            let owning_frames = state.block_stack.iter().filter(|f| !f.braceless).count();
            assert_eq!(owning_braces, owning_frames, "{:?}", state.block_stack);
        }
        crate::block_tracker::flush(&mut state, policy);
        state.output
    }

    fn stub_convert(code: &str) -> Option<(&'static str, BlockKind)> {
        let code = code.trim_end_matches('{').trim();
        let header = |kw: &str| starts_with_keyword(code, kw);
        if header("elif") || (header("else") && code.contains(" if")) {
            Some(("ELSE IF", BlockKind::Elif))
        } else if header("if") {
            Some(("IF", BlockKind::If))
        } else if header("else") {
            Some(("ELSE", BlockKind::Else))
        } else if header("while") && !code.ends_with(';') {
            Some(("WHILE", BlockKind::While))
        } else if header("do") {
            Some(("REPEAT", BlockKind::Repeat))
        } else if header("try") {
            Some(("TRY", BlockKind::Try))
        } else if header("except") || header("catch") {
            Some(("CATCH", BlockKind::Catch))
        } else if header("finally") {
            Some(("FINALLY", BlockKind::Finally))
        } else {
            None
        }
    }

    #[test]
    fn test_indentation_closes_on_dedent() {
        let out = drive("if a:\n    x\n    if b:\n        y\nz", SourceConvention::Indentation, &CAMBRIDGE);
        assert_eq!(out, vec!["IF", "   x", "   IF", "      y", "   ENDIF", "ENDIF", "z"]);
    }

    #[test]
    fn test_indentation_chain_has_one_terminator() {
        let out = drive("if a:\n    x\nelif b:\n    y\nelse:\n    z", SourceConvention::Indentation, &IB);
        assert_eq!(out, vec!["IF", "    x", "ELSE IF", "    y", "ELSE", "    z", "END IF"]);
    }

    #[test]
    fn test_indentation_else_closes_nested_block() {
        let out = drive("if a:\n    if b:\n        x\nelse:\n    y", SourceConvention::Indentation, &CAMBRIDGE);
        assert_eq!(out, vec!["IF", "   IF", "      x", "   ENDIF", "ELSE", "   y", "ENDIF"]);
    }

    #[test]
    fn test_indentation_shallower_branch_body_stays_balanced() {
        let out = drive("if a:\n        x\nelse:\n  y\nz", SourceConvention::Indentation, &CAMBRIDGE);
        assert_eq!(out, vec!["IF", "   x", "ELSE", "ENDIF", "y", "z"]);
    }

    #[test]
    fn test_indentation_bodiless_header_is_closed() {
        let out = drive("while a:\nx", SourceConvention::Indentation, &CAMBRIDGE);
        assert_eq!(out, vec!["WHILE", "ENDWHILE", "x"]);
    }

    #[test]
    fn test_indentation_try_chain() {
        let out = drive("try:\n    x\nexcept:\n    y\nfinally:\n    z", SourceConvention::Indentation, &CAMBRIDGE);
        assert_eq!(out, vec!["TRY", "   x", "CATCH", "   y", "FINALLY", "   z", "ENDTRY"]);
    }

    #[test]
    fn test_unexpected_indent_keeps_level() {
        let out = drive("x\n    y\nz", SourceConvention::Indentation, &CAMBRIDGE);
        assert_eq!(out, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_braces_same_line_else() {
        let out = drive("if (a) {\n  x;\n} else {\n  y;\n}", SourceConvention::Braces, &CAMBRIDGE);
        assert_eq!(out, vec!["IF", "   x;", "ELSE", "   y;", "ENDIF"]);
    }

    #[test]
    fn test_braces_else_on_next_line() {
        let out = drive("if (a) {\n  x;\n}\nelse {\n  y;\n}\nz;", SourceConvention::Braces, &IB);
        assert_eq!(out, vec!["IF", "    x;", "ELSE", "    y;", "END IF", "z;"]);
    }

    #[test]
    fn test_braces_non_owning_braces() {
        let out = drive("while (a) {\n  int[] v = {1, 2};\n  x; }\ny;", SourceConvention::Braces, &CAMBRIDGE);
        assert_eq!(out, vec!["WHILE", "   int[] v = {1, 2};", "   x; }", "ENDWHILE", "y;"]);
    }

    #[test]
    fn test_braces_do_while() {
        let mut state = ParserState::new();
        let lines = split_logical_lines("do {\n  x;\n} while (n < 3);", SourceConvention::Braces);
        let b = boundaries_for(SourceConvention::Braces);
        let entry = b.enter_line(&mut state, &CAMBRIDGE, &lines, 0);
        b.leave_line(&mut state, &CAMBRIDGE, &lines, 0, entry, Some(BlockFrame::new(BlockKind::Repeat)));
        let entry = b.enter_line(&mut state, &CAMBRIDGE, &lines, 1);
        b.leave_line(&mut state, &CAMBRIDGE, &lines, 1, entry, None);
        let entry = b.enter_line(&mut state, &CAMBRIDGE, &lines, 2);
        assert!(entry.code.is_empty());
        assert_eq!(state.output, vec!["UNTIL NOT (n < 3)"]);
        assert!(state.block_stack.is_empty());
        assert!(state.brace_stack.is_empty());
        assert!(!state.chain_pending);
    }

    #[test]
    fn test_braces_do_tail_on_next_line() {
        let out = drive("do {\n  x;\n}\nwhile (n < 3);\ny;", SourceConvention::Braces, &CAMBRIDGE);
        assert_eq!(out, vec!["REPEAT", "   x;", "UNTIL NOT (n < 3)", "y;"]);
    }

    #[test]
    fn test_braces_inner_empty_while_is_a_statement() {
        let out = drive("do {\n  while (busy());\n  x;\n} while (x < 3);\ny;", SourceConvention::Braces, &CAMBRIDGE);
        assert_eq!(out, vec!["REPEAT", "   while (busy());", "   x;", "UNTIL NOT (x < 3)", "y;"]);
    }

    #[test]
    fn test_braceless_body_is_one_statement() {
        let out = drive("if (a)\n  x;\ny;", SourceConvention::Braces, &CAMBRIDGE);
        assert_eq!(out, vec!["IF", "   x;", "ENDIF", "y;"]);
    }

    #[test]
    fn test_braceless_headers_nest() {
        let out = drive("while (a)\n  if (b)\n    x;\ny;", SourceConvention::Braces, &CAMBRIDGE);
        assert_eq!(out, vec!["WHILE", "   IF", "      x;", "   ENDIF", "ENDWHILE", "y;"]);
    }

    #[test]
    fn test_braceless_else_binds_to_nearest_if() {
        let out = drive("if (a)\n  if (b)\n    x;\n  else\n    y;\nz;", SourceConvention::Braces, &IB);
        assert_eq!(out, vec!["IF", "    IF", "        x;", "    ELSE", "        y;", "    END IF", "END IF", "z;"]);
    }

    #[test]
    fn test_braceless_body_may_be_a_braced_block() {
        let out = drive("if (a)\n  while (b) {\n    x;\n  }\nelse\n  y;\nz;", SourceConvention::Braces, &CAMBRIDGE);
        assert_eq!(out, vec!["IF", "   WHILE", "      x;", "   ENDWHILE", "ELSE", "   y;", "ENDIF", "z;"]);
    }

    #[test]
    fn test_braceless_header_closed_by_enclosing_brace() {
        let out = drive("while (a) {\n  if (b)\n}\ny;", SourceConvention::Braces, &CAMBRIDGE);
        assert_eq!(out, vec!["WHILE", "   IF", "   ENDIF", "ENDWHILE", "y;"]);
    }

    #[test]
    fn test_continuation_never_takes_a_frame_that_owns_a_brace() {
        let src = "} else if (b) {\ncatch (E e) {\n} else if (b) {\n}\n} catch (Exception e) {";
        let out = drive(src, SourceConvention::Braces, &CAMBRIDGE);
        assert_eq!(out, vec!["ELSE IF", "   CATCH", "   ENDTRY", "   ELSE IF", "   ENDIF", "ENDIF", "CATCH", "ENDTRY"]);
    }

    #[test]
    fn test_stray_brace_is_ignored() {
        let out = drive("}\nx;", SourceConvention::Braces, &CAMBRIDGE);
        assert_eq!(out, vec!["x;"]);
    }

    #[test]
    fn test_continuation_kinds() {
        assert_eq!(indentation_continuation("elif x:"), Some(BlockKind::Elif));
        assert_eq!(indentation_continuation("else_value = 1"), None);
        assert_eq!(indentation_continuation("except ValueError as e:"), Some(BlockKind::Catch));
        assert_eq!(brace_continuation("else if (x) {"), Some(BlockKind::Elif));
        assert_eq!(brace_continuation("else {"), Some(BlockKind::Else));
        assert_eq!(brace_continuation("catch (Exception e) {"), Some(BlockKind::Catch));
        assert_eq!(brace_continuation("elsewhere();"), None);
    }
}
