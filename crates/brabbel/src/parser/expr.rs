use winnow::combinator::{alt, cut_err, opt, separated};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::literal;

use crate::ast::{BinOp, Builtin, Expr, UnaryOp};
use crate::parse_utils::{
    Number, dotted_name, ident, kw, number_literal, quoted_string, ws_skip,
};

// ---------------------------------------------------------------------------
// Public entry: full expression
// ---------------------------------------------------------------------------

pub(crate) fn parse_expr(input: &mut &str) -> ModalResult<Expr> {
    additive.parse_next(input)
}

// ---------------------------------------------------------------------------
// Precedence levels (loosest to tightest)
//
// Additive binds looser than the boolean operators. Existing rule documents
// depend on this ordering, so `$a and $b + 1` is `($a and $b) + 1`. `and`
// binds tighter than `or`.
// ---------------------------------------------------------------------------

const ADDITIVE: &[BinOp] = &[BinOp::Add, BinOp::Sub];
const DISJUNCTION: &[BinOp] = &[BinOp::Or];
const CONJUNCTION: &[BinOp] = &[BinOp::And];
const COMPARISON: &[BinOp] = &[
    BinOp::Eq,
    BinOp::Ne,
    BinOp::Lt,
    BinOp::Gt,
    BinOp::Le,
    BinOp::Ge,
    BinOp::In,
];
const MULTIPLICATIVE: &[BinOp] = &[BinOp::Mul, BinOp::Div];

/// `additive = disjunction { ("+" | "-") disjunction }`
fn additive(input: &mut &str) -> ModalResult<Expr> {
    left_assoc(input, ADDITIVE, disjunction)
}

/// `disjunction = conjunction { "or" conjunction }`
fn disjunction(input: &mut &str) -> ModalResult<Expr> {
    left_assoc(input, DISJUNCTION, conjunction)
}

/// `conjunction = comparison { "and" comparison }`
fn conjunction(input: &mut &str) -> ModalResult<Expr> {
    left_assoc(input, CONJUNCTION, comparison)
}

/// `comparison = multiplicative { cmp_op multiplicative }`
fn comparison(input: &mut &str) -> ModalResult<Expr> {
    left_assoc(input, COMPARISON, multiplicative)
}

/// `multiplicative = negation { ("*" | "/") negation }`
fn multiplicative(input: &mut &str) -> ModalResult<Expr> {
    left_assoc(input, MULTIPLICATIVE, negation)
}

/// Shared loop for the left-associative binary levels. An operator that
/// belongs to a looser level ends this level and is left for the caller.
fn left_assoc(
    input: &mut &str,
    ops: &[BinOp],
    operand: fn(&mut &str) -> ModalResult<Expr>,
) -> ModalResult<Expr> {
    let mut left = operand(input)?;
    loop {
        let saved = *input;
        ws_skip.parse_next(input)?;
        match opt(binop).parse_next(input)? {
            Some(op) if ops.contains(&op) => {
                ws_skip.parse_next(input)?;
                let right = cut_err(operand)
                    .context(expected("operand after operator"))
                    .parse_next(input)?;
                left = Expr::binary(op, left, right);
            }
            _ => {
                *input = saved;
                break;
            }
        }
    }
    Ok(left)
}

/// `negation = "not" negation | sign`
fn negation(input: &mut &str) -> ModalResult<Expr> {
    if opt(kw("not")).parse_next(input)?.is_some() {
        ws_skip.parse_next(input)?;
        let operand = cut_err(negation)
            .context(expected("operand after 'not'"))
            .parse_next(input)?;
        return Ok(Expr::unary(UnaryOp::Not, operand));
    }
    sign.parse_next(input)
}

/// `sign = ("+" | "-") sign | power`
///
/// A sign directly followed by a digit belongs to the number literal.
fn sign(input: &mut &str) -> ModalResult<Expr> {
    if starts_with_sign_operator(input) {
        let op = alt((
            literal("+").value(UnaryOp::Plus),
            literal("-").value(UnaryOp::Neg),
        ))
        .parse_next(input)?;
        ws_skip.parse_next(input)?;
        let operand = cut_err(sign)
            .context(expected("operand after sign"))
            .parse_next(input)?;
        return Ok(Expr::unary(op, operand));
    }
    power.parse_next(input)
}

fn starts_with_sign_operator(input: &str) -> bool {
    let mut chars = input.chars();
    matches!(chars.next(), Some('+' | '-')) && !chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// `power = primary [ "^" power ]` (right-associative)
fn power(input: &mut &str) -> ModalResult<Expr> {
    let base = primary.parse_next(input)?;
    let saved = *input;
    ws_skip.parse_next(input)?;
    if opt(literal("^")).parse_next(input)?.is_some() {
        ws_skip.parse_next(input)?;
        let exponent = cut_err(power)
            .context(expected("exponent"))
            .parse_next(input)?;
        return Ok(Expr::binary(BinOp::Pow, base, exponent));
    }
    *input = saved;
    Ok(base)
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Any binary operator in symbolic or word spelling, normalized to [`BinOp`].
fn binop(input: &mut &str) -> ModalResult<BinOp> {
    alt((
        literal("==").value(BinOp::Eq),
        literal("!=").value(BinOp::Ne),
        literal("<=").value(BinOp::Le),
        literal(">=").value(BinOp::Ge),
        literal("<").value(BinOp::Lt),
        literal(">").value(BinOp::Gt),
        literal("+").value(BinOp::Add),
        literal("-").value(BinOp::Sub),
        literal("*").value(BinOp::Mul),
        literal("/").value(BinOp::Div),
        literal("^").value(BinOp::Pow),
        word_op,
    ))
    .parse_next(input)
}

fn word_op(input: &mut &str) -> ModalResult<BinOp> {
    let saved = *input;
    let word = ident.parse_next(input)?;
    match BinOp::from_word(word) {
        Some(op) => Ok(op),
        None => {
            *input = saved;
            Err(ErrMode::Backtrack(ContextError::new()))
        }
    }
}

// ---------------------------------------------------------------------------
// Primary
// ---------------------------------------------------------------------------

fn primary(input: &mut &str) -> ModalResult<Expr> {
    alt((paren_expr, operand))
        .context(expected("expression"))
        .parse_next(input)
}

/// A single value: literal, variable, list or function call. List elements
/// are restricted to operands.
fn operand(input: &mut &str) -> ModalResult<Expr> {
    alt((
        number_literal.map(number_expr),
        quoted_string.map(Expr::StringLit),
        variable,
        list_literal,
        func_call,
    ))
    .parse_next(input)
}

fn number_expr(n: Number) -> Expr {
    match n {
        Number::Int(i) => Expr::Int(i),
        Number::Float(f) => Expr::Float(f),
    }
}

fn paren_expr(input: &mut &str) -> ModalResult<Expr> {
    literal("(").parse_next(input)?;
    ws_skip.parse_next(input)?;
    let inner = cut_err(parse_expr).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")"))
        .context(expected("')'"))
        .parse_next(input)?;
    Ok(inner)
}

/// `$segment{.segment}`, kept as one dotted name.
fn variable(input: &mut &str) -> ModalResult<Expr> {
    literal("$").parse_next(input)?;
    cut_err(dotted_name)
        .context(expected("variable name after '$'"))
        .parse_next(input)
        .map(Expr::Var)
}

fn list_literal(input: &mut &str) -> ModalResult<Expr> {
    literal("[").parse_next(input)?;
    let items: Vec<Expr> = separated(
        0..,
        (ws_skip, operand, ws_skip).map(|(_, e, _)| e),
        literal(","),
    )
    .parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal("]"))
        .context(expected("']'"))
        .parse_next(input)?;
    Ok(Expr::List(items))
}

fn func_call(input: &mut &str) -> ModalResult<Expr> {
    let saved = *input;
    let name = ident.parse_next(input)?;
    let Some(func) = Builtin::from_name(name) else {
        *input = saved;
        return Err(ErrMode::Backtrack(ContextError::new()));
    };
    ws_skip.parse_next(input)?;
    cut_err(literal("("))
        .context(expected("'(' after function name"))
        .parse_next(input)?;
    let args: Vec<Expr> = separated(
        0..,
        (ws_skip, parse_expr, ws_skip).map(|(_, e, _)| e),
        literal(","),
    )
    .parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")"))
        .context(expected("')' after arguments"))
        .parse_next(input)?;
    Ok(Expr::FuncCall { func, args })
}

fn expected(what: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(what))
}
