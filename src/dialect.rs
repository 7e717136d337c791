//! Dialect policy tables
//!
//! Everything that differs between the IB and Cambridge spellings lives here
//! as plain data: keyword spellings, header templates, closing templates and
//! a handful of feature switches. Converters and the tracker only ever ask
//! the policy; they never match on `Dialect` themselves.

use crate::block::BlockKind;
use crate::options::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Then,
    ElseIf,
    Else,
    While,
    Do,
    Repeat,
    Until,
    Output,
    Input,
    Return,
    Try,
    Catch,
    Finally,
    Class,
    Inherits,
    New,
    Call,
    Function,
    Procedure,
    Returns,
    Declare,
    Constant,
    Public,
    Private,
    True,
    False,
    And,
    Or,
    Not,
    Div,
    Mod,
    Length,
    Upper,
    Lower,
    Substring,
}

/// How `for x in coll` is spelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionLoop {
    /// `FOR EACH x IN coll` ... `NEXT x`
    ForEach,
    /// `coll.resetNext()` / `loop while coll.hasNext()` / `x ← coll.getNext()`
    Iterator,
}

#[derive(Debug, Clone, Copy)]
pub struct DialectPolicy {
    pub dialect: Dialect,
    pub indent_width: usize,
    pub assign: &'static str,
    pub concat: &'static str,
    keywords: fn(Keyword) -> &'static str,
    terminators: fn(BlockKind) -> &'static str,
    /// `{var}`, `{start}`, `{end}`
    pub for_template: &'static str,
    /// Appended to `for_template` when a step is given; `None` drops the step
    pub step_template: Option<&'static str>,
    pub collection_loop: CollectionLoop,
    /// `{name}`, `{size}`, `{last}`, `{type}`
    pub array_template: &'static str,
    /// Typed declarations (`DECLARE x : INTEGER`) for typed sources
    pub declare_variables: bool,
    /// Dict literals become `TYPE ... ENDTYPE` records with dotted access
    pub records: bool,
    /// `input("prompt")` echoes the prompt with `OUTPUT` first
    pub prompt_input: bool,
    /// Routines without a return value are spelled `PROCEDURE`
    pub procedures: bool,
    /// Bare procedure calls get `CALL`
    pub call_keyword: bool,
    /// `UPPER_CASE = literal` becomes `CONSTANT`
    pub constants: bool,
    /// User routine names are PascalCased at definition and call sites
    pub capitalise_routines: bool,
    /// Parameters carry `: TYPE` annotations
    pub typed_parameters: bool,
    /// `NEW`, `PUBLIC`/`PRIVATE` and `DECLARE obj : Class`
    pub object_model: bool,
    /// List literals are expanded into `DECLARE` + element assignments
    pub array_declarations: bool,
    /// `s[i]` on a known string becomes `MID(s, i, 1)`
    pub substrings: bool,
}

fn common_keyword(k: Keyword) -> &'static str {
    match k {
        Keyword::If => "IF",
        Keyword::Then => "THEN",
        Keyword::ElseIf => "ELSE IF",
        Keyword::Else => "ELSE",
        Keyword::While => "WHILE",
        Keyword::Do => "DO",
        Keyword::Repeat => "REPEAT",
        Keyword::Until => "UNTIL",
        Keyword::Output => "OUTPUT",
        Keyword::Input => "INPUT",
        Keyword::Return => "RETURN",
        Keyword::Try => "TRY",
        Keyword::Catch => "CATCH",
        Keyword::Finally => "FINALLY",
        Keyword::Class => "CLASS",
        Keyword::Inherits => "INHERITS",
        Keyword::New => "NEW",
        Keyword::Call => "CALL",
        Keyword::Function => "FUNCTION",
        Keyword::Procedure => "PROCEDURE",
        Keyword::Returns => "RETURNS",
        Keyword::Declare => "DECLARE",
        Keyword::Constant => "CONSTANT",
        Keyword::Public => "PUBLIC",
        Keyword::Private => "PRIVATE",
        Keyword::True => "TRUE",
        Keyword::False => "FALSE",
        Keyword::And => "AND",
        Keyword::Or => "OR",
        Keyword::Not => "NOT",
        Keyword::Div => "DIV",
        Keyword::Mod => "MOD",
        Keyword::Length => "LENGTH",
        Keyword::Upper => "UPPER",
        Keyword::Lower => "LOWER",
        Keyword::Substring => "MID",
    }
}

fn ib_keyword(k: Keyword) -> &'static str {
    match k {
        Keyword::Div => "div",
        Keyword::Mod => "mod",
        other => common_keyword(other),
    }
}

fn ib_terminator(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::If | BlockKind::Elif | BlockKind::Else => "END IF",
        BlockKind::For => "end loop",
        BlockKind::While => "END WHILE",
        BlockKind::Repeat => "UNTIL {cond}",
        BlockKind::Function => "END FUNCTION",
        BlockKind::Procedure => "END PROCEDURE",
        BlockKind::Class => "END CLASS",
        BlockKind::Try | BlockKind::Catch | BlockKind::Finally => "END TRY",
    }
}

fn cambridge_terminator(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::If | BlockKind::Elif | BlockKind::Else => "ENDIF",
        BlockKind::For => "NEXT {var}",
        BlockKind::While => "ENDWHILE",
        BlockKind::Repeat => "UNTIL {cond}",
        BlockKind::Function => "ENDFUNCTION",
        BlockKind::Procedure => "ENDPROCEDURE",
        BlockKind::Class => "ENDCLASS",
        BlockKind::Try | BlockKind::Catch | BlockKind::Finally => "ENDTRY",
    }
}

pub const IB: DialectPolicy = DialectPolicy {
    dialect: Dialect::Ib,
    indent_width: 4,
    assign: "←",
    concat: "+",
    keywords: ib_keyword,
    terminators: ib_terminator,
    for_template: "loop {var} from {start} to {end}",
    step_template: None,
    collection_loop: CollectionLoop::Iterator,
    array_template: "DECLARE {name} : ARRAY[{size}] OF {type}",
    declare_variables: false,
    records: false,
    prompt_input: false,
    procedures: false,
    call_keyword: false,
    constants: false,
    capitalise_routines: false,
    typed_parameters: false,
    object_model: false,
    array_declarations: false,
    substrings: false,
};

pub const CAMBRIDGE: DialectPolicy = DialectPolicy {
    dialect: Dialect::Cambridge,
    indent_width: 3,
    assign: "←",
    concat: "&",
    keywords: common_keyword,
    terminators: cambridge_terminator,
    for_template: "FOR {var} ← {start} TO {end}",
    step_template: Some(" STEP {step}"),
    collection_loop: CollectionLoop::ForEach,
    array_template: "DECLARE {name} : ARRAY[0:{last}] OF {type}",
    declare_variables: true,
    records: true,
    prompt_input: true,
    procedures: true,
    call_keyword: true,
    constants: true,
    capitalise_routines: true,
    typed_parameters: true,
    object_model: true,
    array_declarations: true,
    substrings: true,
};

/// Placeholder echoed by a `For` terminator when the header had no variable.
pub const MISSING_LOOP_VARIABLE: &str = "<var>";
/// Placeholder for a `Repeat` terminator that never saw its condition.
pub const MISSING_CONDITION: &str = "<condition>";

impl DialectPolicy {
    pub fn for_dialect(dialect: Dialect) -> &'static DialectPolicy {
        match dialect {
            Dialect::Ib => &IB,
            Dialect::Cambridge => &CAMBRIDGE,
        }
    }

    pub fn kw(&self, k: Keyword) -> &'static str {
        (self.keywords)(k)
    }

    /// Closing line for a frame, with `{var}`/`{cond}` filled in.
    pub fn terminator(&self, kind: BlockKind, var: Option<&str>, cond: Option<&str>) -> String {
        fill(
            (self.terminators)(kind),
            &[
                ("var", var.unwrap_or(MISSING_LOOP_VARIABLE)),
                ("cond", cond.unwrap_or(MISSING_CONDITION)),
            ],
        )
    }

    pub fn for_header(&self, var: &str, start: &str, end: &str, step: Option<&str>) -> String {
        let mut header = fill(self.for_template, &[("var", var), ("start", start), ("end", end)]);
        if let (Some(step), Some(template)) = (step, self.step_template) {
            header.push_str(&fill(template, &[("step", step)]));
        }
        header
    }

    /// Fixed-size array declaration. `size` is the element count as written,
    /// so the last index is only computed when it is a plain number.
    pub fn array_declaration(&self, name: &str, size: &str, ty: &str) -> String {
        let size = size.trim();
        let last = match size.parse::<usize>() {
            Ok(n) => n.saturating_sub(1).to_string(),
            Err(_) => format!("{} - 1", size),
        };
        fill(self.array_template, &[("name", name), ("size", size), ("last", &last), ("type", ty)])
    }

    pub fn indent(&self, depth: usize) -> String {
        " ".repeat(depth * self.indent_width)
    }

    pub fn assignment(&self, target: &str, value: &str) -> String {
        format!("{} {} {}", target, self.assign, value)
    }
}

/// Replace `{name}` slots in a template.
pub fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in slots {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}
