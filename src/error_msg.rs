//! Diagnostics for the pseudocode transpiler
//!
//! Conversion itself never fails: malformed or unrecognised input degrades to
//! a comment line. What this module provides is
//!
//! - `ConvertError` for configuration problems (unknown convention/dialect names)
//! - `UnsupportedConstruct`, the report handed to the fallback callback
//! - stable codes attached to the `tracing` events emitted on recovery
//!
//! ## Error Code Format
//!
//! `PSCxxx` where `xxx` is grouped by category:
//! - 001-019: Configuration errors
//! - 020-039: Structure (nesting) recoveries
//! - 040-059: Unsupported constructs

use std::fmt;

use serde::Serialize;
use thiserror::Error;

//=============================================================================
// ERROR CATEGORIES
//=============================================================================

/// Error category for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    /// Bad option names (PSC001-019)
    Configuration,
    /// Nesting that had to be repaired (PSC020-039)
    Structure,
    /// Lines no converter recognised (PSC040-059)
    Unsupported,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Structure => write!(f, "structure"),
            ErrorCategory::Unsupported => write!(f, "unsupported"),
        }
    }
}

//=============================================================================
// ERROR CODES
//=============================================================================

/// Stable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    // Configuration (001-019)
    UnknownConvention,
    UnknownDialect,
    InvalidOptions,

    // Structure (020-039)
    /// Dedent to a column that was never opened
    UnbalancedDedent,
    /// `}` with nothing open
    StrayClosingBrace,
    /// `elif`/`else`/`except`/`finally` with no chain to continue
    OrphanContinuation,
    /// Deeper indentation where no block was opened
    UnexpectedIndent,
    /// Internal stack went out of step with the indentation levels
    StackInvariant,

    // Unsupported (040-059)
    UnsupportedConstruct,
}

impl ErrorCode {
    pub fn number(&self) -> u16 {
        match self {
            ErrorCode::UnknownConvention => 1,
            ErrorCode::UnknownDialect => 2,
            ErrorCode::InvalidOptions => 3,
            ErrorCode::UnbalancedDedent => 20,
            ErrorCode::StrayClosingBrace => 21,
            ErrorCode::OrphanContinuation => 22,
            ErrorCode::UnexpectedIndent => 23,
            ErrorCode::StackInvariant => 30,
            ErrorCode::UnsupportedConstruct => 40,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.number() {
            1..=19 => ErrorCategory::Configuration,
            20..=39 => ErrorCategory::Structure,
            _ => ErrorCategory::Unsupported,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PSC{:03}", self.number())
    }
}

//=============================================================================
// CONFIGURATION ERRORS
//=============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("unknown source convention `{0}` (expected `indentation` or `braces`)")]
    UnknownConvention(String),

    #[error("unknown dialect `{0}` (expected `ib` or `cambridge`)")]
    UnknownDialect(String),

    #[error("invalid options `{0}`: expected `<convention>:<dialect>`")]
    InvalidOptions(String),
}

impl ConvertError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConvertError::UnknownConvention(_) => ErrorCode::UnknownConvention,
            ConvertError::UnknownDialect(_) => ErrorCode::UnknownDialect,
            ConvertError::InvalidOptions(_) => ErrorCode::InvalidOptions,
        }
    }
}

//=============================================================================
// UNSUPPORTED CONSTRUCT REPORTS
//=============================================================================

/// Coarse classification of a line that fell through every converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedKind {
    Comprehension,
    Lambda,
    Decorator,
    WithStatement,
    LoopControl,
    Statement,
}

impl UnsupportedKind {
    /// Best-effort label for a raw source line.
    pub fn classify(line: &str) -> Self {
        let t = line.trim();
        if t.starts_with('@') {
            UnsupportedKind::Decorator
        } else if t.starts_with("with ") {
            UnsupportedKind::WithStatement
        } else if matches!(t.trim_end_matches(';'), "break" | "continue") {
            UnsupportedKind::LoopControl
        } else if t.contains("lambda") || t.contains("->") {
            UnsupportedKind::Lambda
        } else if (t.contains('[') || t.contains('{') || t.contains('('))
            && t.contains(" for ")
            && t.contains(" in ")
        {
            UnsupportedKind::Comprehension
        } else {
            UnsupportedKind::Statement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnsupportedKind::Comprehension => "comprehension",
            UnsupportedKind::Lambda => "lambda",
            UnsupportedKind::Decorator => "decorator",
            UnsupportedKind::WithStatement => "with statement",
            UnsupportedKind::LoopControl => "loop control",
            UnsupportedKind::Statement => "statement",
        }
    }
}

impl fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Passed to the `on_unsupported` callback once per fallback line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsupportedConstruct {
    pub kind: UnsupportedKind,
    /// The source line as written, without surrounding whitespace
    pub raw_line: String,
    /// 1-based physical line number
    pub line_number: usize,
}

impl UnsupportedConstruct {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::UnsupportedConstruct
    }
}

impl fmt::Display for UnsupportedConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: unsupported {} at line {}: {}",
            self.code(),
            self.kind,
            self.line_number,
            self.raw_line
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_grouped_by_category() {
        assert_eq!(ErrorCode::UnknownDialect.to_string(), "PSC002");
        assert_eq!(ErrorCode::UnknownDialect.category(), ErrorCategory::Configuration);
        assert_eq!(ErrorCode::StrayClosingBrace.category(), ErrorCategory::Structure);
        assert_eq!(ErrorCode::UnsupportedConstruct.category(), ErrorCategory::Unsupported);
    }

    #[test]
    fn test_convert_error_message() {
        let err = ConvertError::UnknownDialect("pascal".to_string());
        assert!(err.to_string().contains("`pascal`"));
        assert_eq!(err.code(), ErrorCode::UnknownDialect);
    }

    #[test]
    fn test_classify_unsupported() {
        assert_eq!(UnsupportedKind::classify("squares = [x*x for x in data]"), UnsupportedKind::Comprehension);
        assert_eq!(UnsupportedKind::classify("@staticmethod"), UnsupportedKind::Decorator);
        assert_eq!(UnsupportedKind::classify("with open(f) as fh:"), UnsupportedKind::WithStatement);
        assert_eq!(UnsupportedKind::classify("break"), UnsupportedKind::LoopControl);
        assert_eq!(UnsupportedKind::classify("continue;"), UnsupportedKind::LoopControl);
        assert_eq!(UnsupportedKind::classify("yield x"), UnsupportedKind::Statement);
    }

    #[test]
    fn test_report_display() {
        let report = UnsupportedConstruct {
            kind: UnsupportedKind::Statement,
            raw_line: "yield x".to_string(),
            line_number: 4,
        };
        assert_eq!(report.to_string(), "PSC040: unsupported statement at line 4: yield x");
    }
}
