//! Lowering Module
//!
//! Preparation phases that run around each converted line: splitting the
//! source into logical lines, depth counting, look-ahead, and mapping the
//! source convention onto block boundaries.

// Logical lines
pub mod source_lines_lowering;

// Depth tracking
pub mod depth_tracking_lowering;

// Look-ahead utilities
pub mod lookahead_lowering;

// Block boundaries
pub mod boundary_lowering;

// Re-exports for convenience
pub use source_lines_lowering::{split_logical_lines, LineKind, SourceLine};
pub use depth_tracking_lowering::{bracket_balance, count_braces_outside_strings};
pub use lookahead_lowering::{next_code_line, starts_with_keyword};
pub use boundary_lowering::{boundaries_for, BlockBoundaries, LineEntry};
