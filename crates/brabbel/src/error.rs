use crate::ast::{BinOp, Builtin, UnaryOp};

/// An expression that could not be parsed.
///
/// Parse failures are authoring bugs in the configuration and are reported
/// at construction time, never deferred to evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid expression {input:?} at offset {offset}: {message}")]
pub struct ParseError {
    /// The full expression text that failed to parse.
    pub input: String,
    /// Byte offset in `input` where parsing stopped.
    pub offset: usize,
    /// Human-readable description of what was expected.
    pub message: String,
}

impl ParseError {
    pub fn new(input: impl Into<String>, offset: usize, message: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            offset,
            message: message.into(),
        }
    }
}

/// A failure while evaluating a parsed expression against a context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum EvalError {
    #[error("unknown variable ${0}")]
    UnknownVariable(String),
    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: BinOp,
        left: &'static str,
        right: &'static str,
    },
    #[error("cannot apply unary '{op}' to {found}")]
    InvalidOperand { op: UnaryOp, found: &'static str },
    #[error("{func}() does not accept {found}")]
    InvalidArgument { func: Builtin, found: &'static str },
    #[error("{func}() takes {expected} argument(s), got {got}")]
    Arity {
        func: Builtin,
        expected: usize,
        got: usize,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in '{0}'")]
    Overflow(&'static str),
    #[error("'{0}' produced a non-finite result")]
    NonFinite(&'static str),
    #[error("expression evaluated to {0}, expected a boolean")]
    NotBoolean(&'static str),
}
