use winnow::prelude::*;

mod expr;

use crate::ast::Expr;
use crate::error::ParseError;
use crate::parse_utils::ws_skip;


// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Parse a rule expression such as `bool($age) and $age >= 18`.
///
/// The whole input must form one expression; leading and trailing
/// whitespace is ignored. Empty input, unbalanced grouping, unknown tokens
/// and operators without an operand are all reported as [`ParseError`].
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    if text.trim().is_empty() {
        bb_debug!(parse, "rejected empty expression");
        return Err(ParseError::new(text, 0, "empty expression"));
    }
    match root.parse(text) {
        Ok(expr) => {
            bb_trace!(parse, expr = text, "expression parsed");
            Ok(expr)
        }
        Err(e) => {
            let message = match e.inner().to_string() {
                m if m.is_empty() => "unexpected input".to_string(),
                m => m,
            };
            let err = ParseError::new(text, e.offset(), message);
            bb_debug!(parse, error = %err, "expression rejected");
            Err(err)
        }
    }
}

fn root(input: &mut &str) -> ModalResult<Expr> {
    ws_skip.parse_next(input)?;
    let expr = expr::parse_expr.parse_next(input)?;
    ws_skip.parse_next(input)?;
    Ok(expr)
}
