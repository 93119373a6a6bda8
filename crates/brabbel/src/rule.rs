use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::ast::{Builtin, Expr};
use crate::error::{EvalError, ParseError};
use crate::eval::evaluate;
use crate::parse_utils::is_variable_name;
use crate::parser::parse;
use crate::value::Lookup;

// ---------------------------------------------------------------------------
// Phase / Severity
// ---------------------------------------------------------------------------

/// When a rule runs: before (`pre`) or after (`post`) submitted values are
/// converted to their field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pre,
    #[default]
    Post,
}

/// Whether a failing rule blocks submission (`error`) or only warns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Pre => "pre",
            Phase::Post => "post",
        })
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" => Ok(Phase::Pre),
            "post" => Ok(Phase::Post),
            other => Err(format!("unknown phase {other:?}, expected pre or post")),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            other => Err(format!(
                "unknown severity {other:?}, expected error or warning"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

const REQUIRED_MSG: &str = "This field is required. You must provide a value";
const DESIRED_MSG: &str = "This field is desired. Please provide a value";

/// A parsed expression with the metadata a form attaches to it.
///
/// Built once when the configuration is loaded and shared read-only
/// afterwards. Phase and severity are carried for the caller; the rule
/// itself never branches on them.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    source: String,
    expr: Expr,
    message: String,
    phase: Phase,
    severity: Severity,
    required: bool,
    desired: bool,
}

impl Rule {
    /// Parse `source` into a rule with the default message, phase `post`
    /// and severity `error`.
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let expr = parse(source)?;
        Ok(Self {
            message: format!("Expression \"{source}\" failed"),
            source: source.to_string(),
            expr,
            phase: Phase::default(),
            severity: Severity::default(),
            required: false,
            desired: false,
        })
    }

    /// The implicit `bool($field)` rule of a required field.
    pub fn required(field: &str, translate: &dyn Fn(&str) -> String) -> Result<Self, ParseError> {
        let mut rule = Self::presence(field, translate(REQUIRED_MSG))?;
        rule.required = true;
        Ok(rule)
    }

    /// The implicit `bool($field)` rule of a desired field; fails as a warning.
    pub fn desired(field: &str, translate: &dyn Fn(&str) -> String) -> Result<Self, ParseError> {
        let mut rule = Self::presence(field, translate(DESIRED_MSG))?
            .with_severity(Severity::Warning);
        rule.desired = true;
        Ok(rule)
    }

    /// `bool($field)`. `field` must be a plain dotted name.
    fn presence(field: &str, message: String) -> Result<Self, ParseError> {
        if !is_variable_name(field) {
            return Err(ParseError::new(field, 0, "invalid field name"));
        }
        let expr = Expr::FuncCall {
            func: Builtin::Bool,
            args: vec![Expr::var(field)],
        };
        Ok(Self {
            source: expr.to_string(),
            expr,
            message,
            phase: Phase::Pre,
            severity: Severity::Error,
            required: false,
            desired: false,
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Evaluate against `ctx`. A rule that cannot be evaluated (missing
    /// variable, type mismatch, non-boolean result) counts as failed.
    pub fn evaluate(&self, ctx: &dyn Lookup) -> bool {
        match self.try_evaluate(ctx) {
            Ok(result) => {
                bb_trace!(eval, rule = %self.source, result, "rule evaluated");
                result
            }
            Err(e) => {
                bb_warn!(eval, rule = %self.source, error = %e, "rule evaluation failed");
                false
            }
        }
    }

    /// Evaluate against `ctx`, keeping the reason for a failed evaluation.
    pub fn try_evaluate(&self, ctx: &dyn Lookup) -> Result<bool, EvalError> {
        evaluate(&self.expr, ctx)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_desired(&self) -> bool {
        self.desired
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {}]", self.source, self.phase, self.severity)
    }
}
