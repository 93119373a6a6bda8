use std::cmp::Ordering;

use crate::ast::{BinOp, Builtin, Expr, UnaryOp};
use crate::error::EvalError;
use crate::value::{Lookup, Value};

#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// Expression evaluator
// ---------------------------------------------------------------------------

/// Evaluate an expression to a boolean.
///
/// The final value must be a [`Value::Bool`]; anything else (a bare string,
/// a count) is reported as [`EvalError::NotBoolean`].
pub fn evaluate(expr: &Expr, ctx: &dyn Lookup) -> Result<bool, EvalError> {
    match evaluate_value(expr, ctx)? {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::NotBoolean(other.type_name())),
    }
}

/// Evaluate an expression to whatever value it produces.
///
/// Used for sub-expressions and for computed default values, where the
/// result is not necessarily a boolean.
pub fn evaluate_value(expr: &Expr, ctx: &dyn Lookup) -> Result<Value, EvalError> {
    match expr {
        Expr::Var(name) => ctx
            .lookup(name)
            .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
        Expr::StringLit(s) => Ok(Value::Str(s.clone())),
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Float(n) => Ok(Value::Float(*n)),
        Expr::List(items) => items
            .iter()
            .map(|item| evaluate_value(item, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Expr::FuncCall { func, args } => eval_func_call(*func, args, ctx),
        Expr::Unary { op, operand } => eval_unary(*op, operand, ctx),
        Expr::BinOp { op, left, right } => eval_binop(*op, left, right, ctx),
    }
}

fn eval_func_call(func: Builtin, args: &[Expr], ctx: &dyn Lookup) -> Result<Value, EvalError> {
    let [arg] = args else {
        return Err(EvalError::Arity {
            func,
            expected: 1,
            got: args.len(),
        });
    };
    let value = evaluate_value(arg, ctx)?;
    match func {
        Builtin::Len => match &value {
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            Value::List(items) => Ok(Value::Int(items.len() as i64)),
            other => Err(EvalError::InvalidArgument {
                func,
                found: other.type_name(),
            }),
        },
        Builtin::Bool => Ok(Value::Bool(value.is_truthy())),
    }
}

fn eval_unary(op: UnaryOp, operand: &Expr, ctx: &dyn Lookup) -> Result<Value, EvalError> {
    let value = evaluate_value(operand, ctx)?;
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::Plus, v @ (Value::Int(_) | Value::Float(_))) => Ok(v),
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or(EvalError::Overflow("-")),
        (UnaryOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
        (op, v) => Err(EvalError::InvalidOperand {
            op,
            found: v.type_name(),
        }),
    }
}

fn eval_binop(
    op: BinOp,
    left: &Expr,
    right: &Expr,
    ctx: &dyn Lookup,
) -> Result<Value, EvalError> {
    match op {
        // Short-circuit: the right side is not evaluated (and cannot fail)
        // once the left side decides the result.
        BinOp::And => {
            if !evaluate_value(left, ctx)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(evaluate_value(right, ctx)?.is_truthy()))
        }
        BinOp::Or => {
            if evaluate_value(left, ctx)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(evaluate_value(right, ctx)?.is_truthy()))
        }
        BinOp::Eq | BinOp::Ne => {
            let (lv, rv) = operands(left, right, ctx)?;
            Ok(Value::Bool(values_equal(&lv, &rv) == (op == BinOp::Eq)))
        }
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            let (lv, rv) = operands(left, right, ctx)?;
            compare_values(op, &lv, &rv).map(Value::Bool)
        }
        BinOp::In => {
            let (lv, rv) = operands(left, right, ctx)?;
            contains(&lv, &rv).map(Value::Bool)
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Pow => {
            let (lv, rv) = operands(left, right, ctx)?;
            eval_arithmetic(op, &lv, &rv)
        }
    }
}

fn operands(left: &Expr, right: &Expr, ctx: &dyn Lookup) -> Result<(Value, Value), EvalError> {
    Ok((evaluate_value(left, ctx)?, evaluate_value(right, ctx)?))
}

fn mismatch(op: BinOp, lv: &Value, rv: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op,
        left: lv.type_name(),
        right: rv.type_name(),
    }
}

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(f) => f,
        }
    }
}

fn as_num(v: &Value) -> Option<Num> {
    match v {
        Value::Int(n) => Some(Num::Int(*n)),
        Value::Float(f) => Some(Num::Float(*f)),
        _ => None,
    }
}

/// Read a raw submitted string as a number, e.g. `"5"` or `" 2.5 "`.
fn parse_numeric_str(v: &Value) -> Option<Num> {
    let s = v.as_str()?.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Some(Num::Int(n));
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Num::Float)
}

/// Both operands as numbers. A numeric string is coerced only when the
/// other side is already a number; two strings stay strings.
fn numeric_pair(lv: &Value, rv: &Value) -> Option<(Num, Num)> {
    match (as_num(lv), as_num(rv)) {
        (Some(a), Some(b)) => Some((a, b)),
        (Some(a), None) => parse_numeric_str(rv).map(|b| (a, b)),
        (None, Some(b)) => parse_numeric_str(lv).map(|a| (a, b)),
        (None, None) => None,
    }
}

fn num_cmp(a: Num, b: Num) -> Option<Ordering> {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
        _ => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

// ---------------------------------------------------------------------------
// Comparison and membership
// ---------------------------------------------------------------------------

/// Equality used by `==`, `!=` and `in`. Values of unrelated types are
/// simply unequal.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| values_equal(p, q))
        }
        _ => numeric_pair(a, b).and_then(|(x, y)| num_cmp(x, y)) == Some(Ordering::Equal),
    }
}

fn compare_values(op: BinOp, lv: &Value, rv: &Value) -> Result<bool, EvalError> {
    let ord = match (lv, rv) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => numeric_pair(lv, rv).and_then(|(a, b)| num_cmp(a, b)),
    };
    let ord = ord.ok_or_else(|| mismatch(op, lv, rv))?;
    Ok(match op {
        BinOp::Lt => ord.is_lt(),
        BinOp::Gt => ord.is_gt(),
        BinOp::Le => ord.is_le(),
        BinOp::Ge => ord.is_ge(),
        _ => return Err(mismatch(op, lv, rv)),
    })
}

fn contains(needle: &Value, haystack: &Value) -> Result<bool, EvalError> {
    match (needle, haystack) {
        (_, Value::List(items)) => Ok(items.iter().any(|item| values_equal(needle, item))),
        (Value::Str(n), Value::Str(h)) => Ok(h.contains(n.as_str())),
        _ => Err(mismatch(BinOp::In, needle, haystack)),
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

fn eval_arithmetic(op: BinOp, lv: &Value, rv: &Value) -> Result<Value, EvalError> {
    let (a, b) = numeric_pair(lv, rv).ok_or_else(|| mismatch(op, lv, rv))?;
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => int_arithmetic(op, x, y),
        _ => float_arithmetic(op, a.as_f64(), b.as_f64()),
    }
}

/// Integer arithmetic stays integral except for `/` and negative powers.
fn int_arithmetic(op: BinOp, x: i64, y: i64) -> Result<Value, EvalError> {
    let out = match op {
        BinOp::Add => x.checked_add(y),
        BinOp::Sub => x.checked_sub(y),
        BinOp::Mul => x.checked_mul(y),
        BinOp::Pow if y >= 0 => match (x, u32::try_from(y)) {
            (_, Ok(e)) => x.checked_pow(e),
            // Exponents past u32 only stay finite for these bases.
            (0 | 1, Err(_)) => Some(x),
            (-1, Err(_)) => Some(if y % 2 == 0 { 1 } else { -1 }),
            _ => None,
        },
        _ => return float_arithmetic(op, x as f64, y as f64),
    };
    out.map(Value::Int)
        .ok_or(EvalError::Overflow(op.symbol()))
}

fn float_arithmetic(op: BinOp, x: f64, y: f64) -> Result<Value, EvalError> {
    let out = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => {
            if y == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            x / y
        }
        BinOp::Pow => x.powf(y),
        _ => {
            return Err(EvalError::TypeMismatch {
                op,
                left: "float",
                right: "float",
            });
        }
    };
    if out.is_finite() {
        Ok(Value::Float(out))
    } else {
        Err(EvalError::NonFinite(op.symbol()))
    }
}
