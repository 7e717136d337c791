//! Parser state for one conversion
//!
//! Holds the nesting stacks owned by the tracker, the symbol tables filled by
//! the pre-scan, and the output buffer. A fresh state is built per `parse`
//! call and dropped afterwards.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::block::{BlockFrame, BlockKind};

/// Holds all parser state for a single conversion
#[derive(Debug, Clone, Serialize)]
pub struct ParserState {
    // Nesting (tracker only)
    pub block_stack: Vec<BlockFrame>,
    pub indent_stack: Vec<usize>,
    /// One entry per unmatched `{`; `true` when that brace owns a frame
    pub brace_stack: Vec<bool>,
    /// The top frame's body has ended and its chain (`else`, `catch`,
    /// `finally`, or a `do` tail) starts on the line being entered
    pub chain_pending: bool,
    /// Output depth of the innermost open try chain
    pub pending_try_indent: Option<usize>,

    // Pre-scan results
    pub declared_names: IndexSet<String>,
    pub record_fields: IndexMap<String, IndexMap<String, String>>,
    pub routines: IndexSet<String>,
    pub classes: IndexSet<String>,
    pub class_fields: IndexMap<String, IndexSet<String>>,

    // Forward-pass bookkeeping (converters)
    pub declared_types: IndexMap<String, String>,
    pub declared_records: IndexSet<String>,
    pub function_returns: IndexMap<String, bool>,
    /// Type of the first literal-typed `return` per routine
    pub return_types: IndexMap<String, String>,
    /// Names bound to lambdas, called like routines
    pub lambdas: IndexSet<String>,

    pub output: Vec<String>,
}

impl ParserState {
    pub fn new() -> Self {
        ParserState {
            block_stack: Vec::new(),
            indent_stack: vec![0],
            brace_stack: Vec::new(),
            chain_pending: false,
            pending_try_indent: None,
            declared_names: IndexSet::new(),
            record_fields: IndexMap::new(),
            routines: IndexSet::new(),
            classes: IndexSet::new(),
            class_fields: IndexMap::new(),
            declared_types: IndexMap::new(),
            declared_records: IndexSet::new(),
            function_returns: IndexMap::new(),
            return_types: IndexMap::new(),
            lambdas: IndexSet::new(),
            output: Vec::new(),
        }
    }

    /// Nesting depth used for output indentation
    pub fn depth(&self) -> usize {
        self.block_stack.len()
    }

    pub fn top_kind(&self) -> Option<BlockKind> {
        self.block_stack.last().map(|f| f.kind)
    }

    /// Name of the class whose body is directly open, if any.
    pub fn open_class(&self) -> Option<&str> {
        match self.block_stack.last() {
            Some(frame) if frame.kind == BlockKind::Class => frame.name.as_deref(),
            _ => None,
        }
    }

    /// Record that the innermost Python routine returns a value, and its
    /// type when the returned expression makes it obvious.
    pub fn mark_return(&mut self, ty: Option<&str>) {
        let key = self
            .block_stack
            .iter()
            .rev()
            .find_map(|f| f.routine.as_ref().map(|r| r.key()));
        if let Some(key) = key {
            if let Some(ty) = ty {
                self.return_types.entry(key.clone()).or_insert_with(|| ty.to_string());
            }
            self.function_returns.insert(key, true);
        }
    }

    pub fn returns_value(&self, key: &str) -> bool {
        self.function_returns.get(key).copied().unwrap_or(false)
    }

    pub fn is_routine(&self, name: &str) -> bool {
        self.routines.contains(name) || self.lambdas.contains(name)
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    /// Note a `DECLARE`; returns `false` if the name was already declared.
    pub fn declare(&mut self, name: &str, ty: &str) -> bool {
        if self.declared_types.contains_key(name) {
            return false;
        }
        self.declared_types.insert(name.to_string(), ty.to_string());
        true
    }

    /// Emit a line into the output buffer, returning its index
    pub fn emit(&mut self, line: String) -> usize {
        self.output.push(line);
        self.output.len() - 1
    }
}

impl Default for ParserState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::PendingRoutine;

    fn routine(name: &str, class: Option<&str>) -> BlockFrame {
        BlockFrame::routine(PendingRoutine {
            header_index: 0,
            name: name.to_string(),
            class: class.map(str::to_string),
            params: Vec::new(),
            is_method: class.is_some(),
            is_constructor: false,
        })
    }

    #[test]
    fn test_fresh_state_has_base_level() {
        let state = ParserState::new();
        assert_eq!(state.indent_stack, vec![0]);
        assert!(state.block_stack.is_empty());
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn test_mark_return_targets_innermost_routine() {
        let mut state = ParserState::new();
        state.block_stack.push(BlockFrame::class("Shape"));
        state.block_stack.push(routine("area", Some("Shape")));
        state.block_stack.push(BlockFrame::new(BlockKind::If));
        state.mark_return(Some("REAL"));
        assert!(state.returns_value("Shape.area"));
        assert_eq!(state.return_types.get("Shape.area").map(String::as_str), Some("REAL"));
        assert!(!state.returns_value("area"));
    }

    #[test]
    fn test_mark_return_outside_routine_is_ignored() {
        let mut state = ParserState::new();
        state.mark_return(None);
        assert!(state.function_returns.is_empty());
    }

    #[test]
    fn test_declare_once() {
        let mut state = ParserState::new();
        assert!(state.declare("x", "INTEGER"));
        assert!(!state.declare("x", "REAL"));
        assert_eq!(state.declared_types.get("x").map(String::as_str), Some("INTEGER"));
    }

    #[test]
    fn test_open_class() {
        let mut state = ParserState::new();
        assert_eq!(state.open_class(), None);
        state.block_stack.push(BlockFrame::class("Dog"));
        assert_eq!(state.open_class(), Some("Dog"));
        state.block_stack.push(routine("bark", Some("Dog")));
        assert_eq!(state.open_class(), None);
    }
}
