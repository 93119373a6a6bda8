//! Rule expression engine for form validation and visibility conditionals.
//!
//! ```
//! use brabbel::{Context, Rule};
//!
//! let rule = Rule::new("bool($age) and $age >= 18").unwrap();
//! assert!(rule.evaluate(&Context::new().with("age", 21)));
//! assert!(!rule.evaluate(&Context::new().with("age", 12)));
//! ```

#[macro_use]
mod log_macros;

pub mod ast;
pub mod error;
pub mod eval;
pub mod parse_utils;
mod parser;
pub mod rule;
pub mod value;

pub use ast::{BinOp, Builtin, Expr, UnaryOp};
pub use error::{EvalError, ParseError};
pub use eval::{evaluate, evaluate_value};
pub use parser::parse;
pub use rule::{Phase, Rule, Severity};
pub use value::{Context, Lookup, Value};
