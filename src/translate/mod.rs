//! Translation Module
//!
//! One converter per source construct, tried in a fixed order per source
//! convention. A converter either declines (`None`) or returns the finished
//! pseudocode lines plus at most one block it opens. Converters may update
//! the symbol tables in `ParserState` but never the nesting stacks.

// Expression rewriting shared by every converter
pub mod expression_translate;

// Indentation-delimited sources
pub mod control_flow_translate;
pub mod function_def_translate;
pub mod assignment_translate;
pub mod statement_translate;

// Brace-delimited sources
pub mod java_control_translate;
pub mod java_statement_translate;

use crate::block::BlockFrame;
use crate::dialect::{DialectPolicy, Keyword};
use crate::options::SourceConvention;
use crate::parser_state::ParserState;

pub use expression_translate::translate_expression;

/// Lines produced for one logical source line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    pub lines: Vec<String>,
    pub opens: Option<BlockFrame>,
}

impl Conversion {
    pub fn line(line: String) -> Self {
        Conversion { lines: vec![line], opens: None }
    }

    pub fn lines(lines: Vec<String>) -> Self {
        Conversion { lines, opens: None }
    }

    /// Recognised, but nothing to emit (`pass`, imports, scanner setup)
    pub fn empty() -> Self {
        Conversion::default()
    }

    pub fn open(line: String, frame: BlockFrame) -> Self {
        Conversion { lines: vec![line], opens: Some(frame) }
    }

    pub fn open_lines(lines: Vec<String>, frame: BlockFrame) -> Self {
        Conversion { lines, opens: Some(frame) }
    }
}

/// What a converter may see and touch while converting one line.
pub struct Ctx<'a> {
    pub state: &'a mut ParserState,
    pub policy: &'static DialectPolicy,
    pub convention: SourceConvention,
    pub line_number: usize,
}

impl<'a> Ctx<'a> {
    pub fn new(state: &'a mut ParserState, policy: &'static DialectPolicy, convention: SourceConvention) -> Self {
        Ctx { state, policy, convention, line_number: 0 }
    }

    pub fn expr(&self, expr: &str) -> String {
        translate_expression(expr, self.policy, self.state, self.convention)
    }

    pub fn kw(&self, k: Keyword) -> &'static str {
        self.policy.kw(k)
    }

    /// Indent one level deeper than `indent`
    pub fn body_indent(&self, indent: &str) -> String {
        format!("{}{}", indent, " ".repeat(self.policy.indent_width))
    }

    pub fn assign(&self, indent: &str, target: &str, value: &str) -> String {
        format!("{}{}", indent, self.policy.assignment(target, value))
    }
}

pub type ConvertFn = fn(&str, &str, &mut Ctx<'_>) -> Option<Conversion>;

#[derive(Clone, Copy)]
pub struct Converter {
    pub name: &'static str,
    pub convert: ConvertFn,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter").field("name", &self.name).finish()
    }
}

macro_rules! converters {
    ($($name:literal => $func:path),* $(,)?) => {
        &[$(Converter { name: $name, convert: $func }),*]
    };
}

/// Priority order for indentation sources. Specific forms come before the
/// general ones they would otherwise be swallowed by.
pub static INDENTATION_CONVERTERS: &[Converter] = converters![
    "pass" => statement_translate::convert_pass,
    "import" => statement_translate::convert_import,
    "class" => function_def_translate::convert_class,
    "def" => function_def_translate::convert_def,
    "return" => function_def_translate::convert_return,
    "elif" => control_flow_translate::convert_elif,
    "if" => control_flow_translate::convert_if,
    "else" => control_flow_translate::convert_else,
    "for_range" => control_flow_translate::convert_for_range,
    "for_each" => control_flow_translate::convert_for_each,
    "while" => control_flow_translate::convert_while,
    "try" => control_flow_translate::convert_try,
    "except" => control_flow_translate::convert_except,
    "finally" => control_flow_translate::convert_finally,
    "print" => statement_translate::convert_print,
    "lambda" => function_def_translate::convert_lambda,
    "comprehension" => assignment_translate::convert_comprehension,
    "input" => statement_translate::convert_input,
    "compound_assignment" => assignment_translate::convert_compound_assignment,
    "multiple_assignment" => assignment_translate::convert_multiple_assignment,
    "dict_literal" => assignment_translate::convert_dict_literal,
    "list_literal" => assignment_translate::convert_list_literal,
    "instantiation" => assignment_translate::convert_instantiation,
    "constant" => assignment_translate::convert_constant,
    "assignment" => assignment_translate::convert_assignment,
    "call" => statement_translate::convert_call,
];

/// Priority order for brace sources
pub static BRACE_CONVERTERS: &[Converter] = converters![
    "package_import" => java_statement_translate::convert_package_import,
    "scanner_setup" => java_statement_translate::convert_scanner_setup,
    "class" => java_control_translate::convert_class,
    "method" => java_control_translate::convert_method,
    "else_if" => java_control_translate::convert_else_if,
    "if" => java_control_translate::convert_if,
    "else" => java_control_translate::convert_else,
    "for_count" => java_control_translate::convert_for_count,
    "for_each" => java_control_translate::convert_for_each,
    "while" => java_control_translate::convert_while,
    "empty_while" => java_control_translate::convert_empty_while,
    "do" => java_control_translate::convert_do,
    "try" => java_control_translate::convert_try,
    "catch" => java_control_translate::convert_catch,
    "finally" => java_control_translate::convert_finally,
    "return" => java_statement_translate::convert_return,
    "print" => java_statement_translate::convert_print,
    "scanner_input" => java_statement_translate::convert_scanner_input,
    "array_declaration" => java_statement_translate::convert_array_declaration,
    "declaration" => java_statement_translate::convert_declaration,
    "increment" => java_statement_translate::convert_increment,
    "compound_assignment" => java_statement_translate::convert_compound_assignment,
    "assignment" => java_statement_translate::convert_assignment,
    "call" => java_statement_translate::convert_call,
];

pub fn registry(convention: SourceConvention) -> &'static [Converter] {
    match convention {
        SourceConvention::Indentation => INDENTATION_CONVERTERS,
        SourceConvention::Braces => BRACE_CONVERTERS,
    }
}

pub fn converter_names(convention: SourceConvention) -> Vec<&'static str> {
    registry(convention).iter().map(|c| c.name).collect()
}

/// First converter that accepts `code`, with its name.
pub fn dispatch(code: &str, indent: &str, cx: &mut Ctx<'_>) -> Option<(&'static str, Conversion)> {
    registry(cx.convention)
        .iter()
        .find_map(|c| (c.convert)(code, indent, cx).map(|conv| (c.name, conv)))
}

/// Marker line for a construct no converter accepted.
pub fn fallback(code: &str, indent: &str) -> String {
    format!("{}// Unsupported: {}", indent, code)
}
