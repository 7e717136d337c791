//! Open-block bookkeeping
//!
//! A `BlockFrame` is pushed when a converter opens a construct and popped by
//! the tracker when the source closes it. The frame kind picks the closing
//! template from the dialect policy.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BlockKind {
    If,
    Elif,
    Else,
    For,
    While,
    Repeat,
    Function,
    Procedure,
    Class,
    Try,
    Catch,
    Finally,
}

impl BlockKind {
    /// Frames that replace the top of the stack instead of nesting under it.
    pub fn is_continuation(&self) -> bool {
        matches!(self, BlockKind::Elif | BlockKind::Else | BlockKind::Catch | BlockKind::Finally)
    }

    /// Whether a continuation of kind `next` may follow a frame of this kind.
    pub fn accepts(&self, next: BlockKind) -> bool {
        match next {
            BlockKind::Elif | BlockKind::Else => matches!(self, BlockKind::If | BlockKind::Elif),
            BlockKind::Catch => matches!(self, BlockKind::Try | BlockKind::Catch),
            BlockKind::Finally => matches!(self, BlockKind::Try | BlockKind::Catch),
            _ => false,
        }
    }

    pub fn is_try_chain(&self) -> bool {
        matches!(self, BlockKind::Try | BlockKind::Catch | BlockKind::Finally)
    }
}

/// Header of a Python routine whose final spelling waits for its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRoutine {
    /// Index into the output buffer of the placeholder header line
    pub header_index: usize,
    pub name: String,
    /// Enclosing class, for methods
    pub class: Option<String>,
    /// Parameter names as written, including `self`
    pub params: Vec<String>,
    pub is_method: bool,
    pub is_constructor: bool,
}

impl PendingRoutine {
    /// Key into `function_returns`; methods are qualified by their class.
    pub fn key(&self) -> String {
        match &self.class {
            Some(class) => format!("{}.{}", class, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockFrame {
    pub kind: BlockKind,
    pub loop_variable: Option<String>,
    /// Set on `Repeat` frames once the closing `while (...)` is seen
    pub exit_condition: Option<String>,
    /// Class name for `Class` frames
    pub name: Option<String>,
    pub routine: Option<PendingRoutine>,
    /// Brace sources: the header had no `{`, so the body is one statement
    pub braceless: bool,
}

impl BlockFrame {
    pub fn new(kind: BlockKind) -> Self {
        BlockFrame { kind, loop_variable: None, exit_condition: None, name: None, routine: None, braceless: false }
    }

    pub fn for_loop(variable: &str) -> Self {
        BlockFrame { loop_variable: Some(variable.to_string()), ..BlockFrame::new(BlockKind::For) }
    }

    pub fn class(name: &str) -> Self {
        BlockFrame { name: Some(name.to_string()), ..BlockFrame::new(BlockKind::Class) }
    }

    pub fn routine(routine: PendingRoutine) -> Self {
        BlockFrame { routine: Some(routine), ..BlockFrame::new(BlockKind::Function) }
    }
}
