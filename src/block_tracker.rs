//! Block tracker
//!
//! The only code that pushes or pops `block_stack`. Closing a frame emits
//! its dialect terminator at the depth the frame was opened at; continuation
//! constructs swap the top frame without emitting anything.

use tracing::{error, trace, warn};

use crate::block::{BlockFrame, BlockKind};
use crate::dialect::DialectPolicy;
use crate::error_msg::ErrorCode;
use crate::parser_state::ParserState;
use crate::postprocess::finalise_routine;

/// Push a frame opened by the line just converted.
pub fn push_frame(state: &mut ParserState, frame: BlockFrame) {
    if frame.kind.is_try_chain() {
        state.pending_try_indent = Some(state.depth());
    }
    trace!(kind = ?frame.kind, depth = state.depth(), "open block");
    state.block_stack.push(frame);
}

/// Pop the innermost frame and emit its terminator.
pub fn close_frame(state: &mut ParserState, policy: &DialectPolicy) -> bool {
    let Some(frame) = state.block_stack.pop() else {
        debug_assert!(false, "close_frame with an empty block stack");
        error!(code = %ErrorCode::StackInvariant, "no open block to close");
        return false;
    };

    let mut depth = state.depth();
    let kind = match &frame.routine {
        Some(routine) => finalise_routine(state, policy, routine),
        None => frame.kind,
    };

    if frame.kind.is_try_chain() {
        depth = state.pending_try_indent.unwrap_or(depth);
        state.pending_try_indent = state.block_stack.iter().rposition(|f| f.kind.is_try_chain());
    }

    let terminator = policy.terminator(
        kind,
        frame.loop_variable.as_deref(),
        frame.exit_condition.as_deref(),
    );
    trace!(kind = ?kind, depth, "close block");
    state.emit(format!("{}{}", policy.indent(depth), terminator));
    true
}

/// Take the top frame off for a continuation line (`elif`, `else`,
/// `except`/`catch`, `finally`). Returns the frame that was set aside so the
/// caller can restore it if the line fails to convert.
pub fn take_for_continuation(state: &mut ParserState, next: BlockKind, line_number: usize) -> Option<BlockFrame> {
    match state.block_stack.last() {
        Some(top) if top.kind.accepts(next) => state.block_stack.pop(),
        top => {
            warn!(
                code = %ErrorCode::OrphanContinuation,
                line = line_number,
                continuation = ?next,
                open = ?top.map(|f| f.kind),
                "continuation without a matching block"
            );
            None
        }
    }
}

/// Close every frame still open, innermost first.
pub fn flush(state: &mut ParserState, policy: &DialectPolicy) {
    while !state.block_stack.is_empty() {
        close_frame(state, policy);
    }
}
