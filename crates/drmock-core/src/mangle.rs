//! Identifier mangling for method names.
//!
//! Generated accessors and storage members are named after the mocked
//! method. Operator functions cannot be used verbatim, so `operator<=`
//! becomes `operatorLesserOrEqual` and so on.

use crate::error::{Error, Result};

/// Every operator-function-id of the C++ grammar and its identifier suffix.
///
/// Keys are the operator token sequence with all whitespace removed.
pub const OPERATOR_SUFFIXES: &[(&str, &str)] = &[
    ("new", "New"),
    ("delete", "Delete"),
    ("new[]", "NewArray"),
    ("delete[]", "DeleteArray"),
    ("co_await", "CoAwait"),
    ("+", "Plus"),
    ("-", "Minus"),
    ("*", "Ast"),
    ("/", "Div"),
    ("%", "Modulo"),
    ("^", "Caret"),
    ("&", "Ampersand"),
    ("|", "Pipe"),
    ("~", "Tilde"),
    ("!", "Not"),
    ("=", "Assign"),
    ("<", "Lesser"),
    (">", "Greater"),
    ("+=", "PlusAssign"),
    ("-=", "MinusAssign"),
    ("*=", "AstAssign"),
    ("/=", "DivAssign"),
    ("%=", "ModuloAssign"),
    ("^=", "CaretAssign"),
    ("&=", "AmpersandAssign"),
    ("|=", "PipeAssign"),
    ("<<", "StreamLeft"),
    (">>", "StreamRight"),
    ("<<=", "StreamLeftAssign"),
    (">>=", "StreamRightAssign"),
    ("==", "Equal"),
    ("!=", "NotEqual"),
    ("<=", "LesserOrEqual"),
    (">=", "GreaterOrEqual"),
    ("<=>", "Spaceship"),
    ("&&", "And"),
    ("||", "Or"),
    ("++", "Increment"),
    ("--", "Decrement"),
    (",", "Comma"),
    ("->*", "ArrowAst"),
    ("->", "Arrow"),
    ("()", "Call"),
    ("[]", "Brackets"),
];

const OPERATOR_KEYWORD: &str = "operator";

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(is_identifier_char),
        _ => false,
    }
}

/// Look up the suffix for an operator token sequence such as `<=` or `new []`.
pub fn operator_suffix(op: &str) -> Option<&'static str> {
    let key: String = op.chars().filter(|c| !c.is_whitespace()).collect();
    OPERATOR_SUFFIXES
        .iter()
        .find(|(spelling, _)| *spelling == key)
        .map(|(_, suffix)| *suffix)
}

/// Map a method name to an identifier usable in generated code.
///
/// Identifiers are returned unchanged (`operator_count` is an identifier,
/// not an operator). `operator<op>` maps to `operator<Suffix>`.
pub fn mangle(name: &str) -> Result<String> {
    let name = name.trim();
    if let Some(rest) = name.strip_prefix(OPERATOR_KEYWORD) {
        if !rest.starts_with(is_identifier_char) {
            return operator_suffix(rest)
                .map(|suffix| format!("{}{}", OPERATOR_KEYWORD, suffix))
                .ok_or_else(|| Error::UnknownOperator {
                    spelling: name.to_string(),
                });
        }
    }

    if is_identifier(name) {
        Ok(name.to_string())
    } else {
        Err(Error::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}
