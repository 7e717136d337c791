//! pseudoscribe
//!
//! Line-oriented translation of Python (indentation) or Java (braces)
//! source into IB or Cambridge exam-board pseudocode.
//!
//! ```
//! use pseudoscribe::{parse, ParseOptions};
//!
//! let out = parse("if x > 0:\n    print(x)", ParseOptions::default());
//! assert_eq!(out, "IF x > 0 THEN\n   OUTPUT x\nENDIF");
//! ```

/// Process-wide compiled regex for a constant pattern.
macro_rules! lazy_regex {
    ($pattern:expr) => {
        once_cell::sync::Lazy::new(|| regex::Regex::new($pattern).expect("static pattern compiles"))
    };
}

// Core modules
pub mod error_msg;
pub mod options;
pub mod block;
pub mod dialect;
pub mod parser_state;

// Shared helpers
pub mod helpers;
pub mod type_resolution;
pub mod postprocess;

// Block nesting
pub mod block_tracker;
pub mod first_pass;
pub mod lowering;

// Converters
pub mod translate;

#[cfg(test)]
mod tests;

pub use block::{BlockFrame, BlockKind};
pub use dialect::DialectPolicy;
pub use error_msg::{ConvertError, ErrorCategory, ErrorCode, UnsupportedConstruct, UnsupportedKind};
pub use options::{Dialect, ParseOptions, SourceConvention};
pub use parser_state::ParserState;

use tracing::{debug, trace};

use block_tracker::flush;
use first_pass::prescan;
use lowering::{boundaries_for, split_logical_lines, LineKind, SourceLine};
use postprocess::attach_inline_comment;
use translate::{dispatch, fallback, Ctx};

/// Convert `source` with default reporting (unsupported lines are only
/// marked in the output).
pub fn parse(source: &str, options: ParseOptions) -> String {
    Transpiler::new(options).convert(source)
}

fn ignore_unsupported(_: &UnsupportedConstruct) {}

fn emit_blanks(state: &mut ParserState, held: &mut usize) {
    for _ in 0..std::mem::take(held) {
        state.emit(String::new());
    }
}

/// Reusable converter for one convention/dialect pair.
pub struct Transpiler<F = fn(&UnsupportedConstruct)> {
    options: ParseOptions,
    on_unsupported: F,
}

impl Transpiler {
    pub fn new(options: ParseOptions) -> Self {
        Transpiler { options, on_unsupported: ignore_unsupported }
    }
}

impl<F: FnMut(&UnsupportedConstruct)> Transpiler<F> {
    /// Observe every line that fell back to an `// Unsupported:` marker.
    /// Called once per such line, in source order.
    pub fn on_unsupported<G: FnMut(&UnsupportedConstruct)>(self, callback: G) -> Transpiler<G> {
        Transpiler { options: self.options, on_unsupported: callback }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn convert(&mut self, source: &str) -> String {
        if source.trim().is_empty() {
            return String::new();
        }

        let convention = self.options.convention;
        let policy = DialectPolicy::for_dialect(self.options.dialect);
        let boundaries = boundaries_for(convention);
        let lines = split_logical_lines(source, convention);

        let mut state = ParserState::new();
        prescan(&lines, convention, &mut state);
        debug!(
            convention = %convention,
            dialect = %self.options.dialect,
            lines = lines.len(),
            "converting"
        );

        // Blank lines before a dedent belong after the terminators it emits.
        let hold_blanks = convention == SourceConvention::Indentation;
        let mut held_blanks = 0usize;

        for (idx, line) in lines.iter().enumerate() {
            if hold_blanks && line.kind == LineKind::Blank {
                held_blanks += 1;
                continue;
            }
            if let Some(text) = line.passthrough() {
                emit_blanks(&mut state, &mut held_blanks);
                state.emit(text);
                continue;
            }

            let entry = boundaries.enter_line(&mut state, policy, &lines, idx);
            emit_blanks(&mut state, &mut held_blanks);
            let opened = if entry.code.is_empty() {
                if let Some(comment) = line.comment.as_deref().filter(|c| !c.is_empty()) {
                    state.emit(format!("{}// {}", policy.indent(state.depth()), comment));
                }
                None
            } else {
                self.convert_line(&mut state, policy, line, &entry.code)
            };
            boundaries.leave_line(&mut state, policy, &lines, idx, entry, opened);
        }

        flush(&mut state, policy);
        emit_blanks(&mut state, &mut held_blanks);
        state.output.join("\n")
    }

    /// Dispatch one line and emit what it produced. Returns the frame the
    /// line opens, if any.
    fn convert_line(
        &mut self,
        state: &mut ParserState,
        policy: &'static DialectPolicy,
        line: &SourceLine,
        code: &str,
    ) -> Option<BlockFrame> {
        let indent = policy.indent(state.depth());
        let converted = {
            let mut cx = Ctx::new(state, policy, self.options.convention);
            cx.line_number = line.number;
            dispatch(code, &indent, &mut cx)
        };

        let (mut lines, opens) = match converted {
            Some((name, conversion)) => {
                trace!(line = line.number, converter = name, "converted");
                (conversion.lines, conversion.opens)
            }
            None => {
                let report = UnsupportedConstruct {
                    kind: UnsupportedKind::classify(&line.code),
                    raw_line: line.code.clone(),
                    line_number: line.number,
                };
                debug!(code = %report.code(), kind = %report.kind, line = line.number, "no converter matched");
                (self.on_unsupported)(&report);
                (vec![fallback(code, &indent)], None)
            }
        };

        if let Some(comment) = line.comment.as_deref() {
            attach_inline_comment(&mut lines, comment);
        }
        for text in lines {
            state.emit(text);
        }
        opens
    }
}
