use super::*;
use crate::parser::parse;
use crate::value::Context;

fn eval_with(src: &str, ctx: &Context) -> Result<bool, EvalError> {
    let expr = parse(src).unwrap();
    evaluate(&expr, ctx)
}

fn value_of(src: &str, ctx: &Context) -> Value {
    let expr = parse(src).unwrap();
    evaluate_value(&expr, ctx).unwrap()
}

fn field(v: impl Into<Value>) -> Context {
    Context::new().with("field", v)
}

// -----------------------------------------------------------------------
// Comparison
// -----------------------------------------------------------------------

#[test]
fn comparisons_against_five() {
    let ctx = field(5);
    assert!(eval_with("$field == 5", &ctx).unwrap());
    assert!(!eval_with("$field != 5", &ctx).unwrap());
    assert!(eval_with("$field >= 5", &ctx).unwrap());
    assert!(eval_with("$field <= 5", &ctx).unwrap());
    assert!(!eval_with("$field < 5", &ctx).unwrap());
    assert!(!eval_with("$field > 5", &ctx).unwrap());
    assert!(eval_with("$field gt 4", &ctx).unwrap());
    assert!(eval_with("$field lt 6", &ctx).unwrap());
}

#[test]
fn int_and_float_compare_numerically() {
    let ctx = field(5);
    assert!(eval_with("$field == 5.0", &ctx).unwrap());
    assert!(eval_with("$field < 5.5", &ctx).unwrap());
}

#[test]
fn numeric_string_is_coerced_against_number() {
    let ctx = field("5");
    assert!(eval_with("$field == 5", &ctx).unwrap());
    assert!(eval_with("$field > 4", &ctx).unwrap());
    assert!(eval_with("$field < 5.5", &ctx).unwrap());
    // Two strings stay strings.
    assert!(!eval_with("$field == '5.0'", &ctx).unwrap());
}

#[test]
fn strings_compare_lexicographically() {
    let ctx = field("apple");
    assert!(eval_with("$field < 'banana'", &ctx).unwrap());
    assert!(eval_with("$field == 'apple'", &ctx).unwrap());
}

#[test]
fn equality_across_types_is_false() {
    let ctx = field("abc");
    assert!(!eval_with("$field == 1", &ctx).unwrap());
    assert!(eval_with("$field != 1", &ctx).unwrap());
}

#[test]
fn ordering_across_types_is_an_error() {
    let err = eval_with("$field < 1", &field("abc")).unwrap_err();
    assert_eq!(
        err,
        EvalError::TypeMismatch {
            op: BinOp::Lt,
            left: "string",
            right: "int",
        }
    );
}

// -----------------------------------------------------------------------
// Membership
// -----------------------------------------------------------------------

#[test]
fn membership_in_list() {
    let ctx = field(9);
    assert!(eval_with("$field in [1, 9, 3]", &ctx).unwrap());
    assert!(!eval_with("$field in [1, 2, 3]", &ctx).unwrap());
    assert!(!eval_with("$field in []", &ctx).unwrap());
}

#[test]
fn membership_in_list_variable() {
    let ctx = Context::new()
        .with("choice", "b")
        .with("allowed", vec!["a", "b"]);
    assert!(eval_with("$choice in $allowed", &ctx).unwrap());
}

#[test]
fn membership_substring() {
    let ctx = field("hello world");
    assert!(eval_with("'lo w' in $field", &ctx).unwrap());
    assert!(!eval_with("'xyz' in $field", &ctx).unwrap());
}

#[test]
fn membership_needs_container() {
    let err = eval_with("1 in $field", &field(5)).unwrap_err();
    assert!(matches!(err, EvalError::TypeMismatch { op: BinOp::In, .. }));
}

// -----------------------------------------------------------------------
// Builtins
// -----------------------------------------------------------------------

#[test]
fn bool_of_empty_and_filled() {
    assert!(!eval_with("bool($field)", &field("")).unwrap());
    assert!(eval_with("bool($field)", &field("x")).unwrap());
    assert!(!eval_with("bool($field)", &field(Value::Null)).unwrap());
    assert!(!eval_with("bool($field)", &field(0)).unwrap());
    assert!(!eval_with("bool($field)", &field(Vec::<Value>::new())).unwrap());
}

#[test]
fn len_of_string_and_list() {
    assert!(eval_with("len($field) <= 5", &field("abcde")).unwrap());
    assert!(!eval_with("len($field) <= 5", &field("abcdef")).unwrap());
    assert_eq!(value_of("len($field)", &field(vec![1, 2, 3])), Value::Int(3));
    // Characters, not bytes.
    assert_eq!(value_of("len($field)", &field("äöü")), Value::Int(3));
}

#[test]
fn len_rejects_numbers() {
    let err = eval_with("len($field) > 1", &field(12)).unwrap_err();
    assert_eq!(
        err,
        EvalError::InvalidArgument {
            func: Builtin::Len,
            found: "int",
        }
    );
}

#[test]
fn builtin_arity() {
    let ctx = field("x");
    let err = eval_with("bool($field, $field)", &ctx).unwrap_err();
    assert_eq!(
        err,
        EvalError::Arity {
            func: Builtin::Bool,
            expected: 1,
            got: 2,
        }
    );
    assert!(matches!(
        eval_with("len()", &ctx).unwrap_err(),
        EvalError::Arity { got: 0, .. }
    ));
}

// -----------------------------------------------------------------------
// Logic
// -----------------------------------------------------------------------

#[test]
fn not_and_or() {
    let ctx = Context::new().with("a", true).with("b", false);
    assert!(eval_with("not $b", &ctx).unwrap());
    assert!(!eval_with("$a and $b", &ctx).unwrap());
    assert!(eval_with("$a or $b", &ctx).unwrap());
    assert!(eval_with("not $a or not $b", &ctx).unwrap());
}

#[test]
fn and_or_short_circuit_skips_missing_variable() {
    let ctx = Context::new().with("a", false);
    assert!(!eval_with("$a and $missing", &ctx).unwrap());
    assert!(eval_with("not $a or $missing", &ctx).unwrap());
}

#[test]
fn missing_variable_is_an_error() {
    let err = eval_with("$missing == 1", &Context::new()).unwrap_err();
    assert_eq!(err, EvalError::UnknownVariable("missing".into()));
}

#[test]
fn non_boolean_result_is_reported() {
    let err = eval_with("$field", &field("x")).unwrap_err();
    assert_eq!(err, EvalError::NotBoolean("string"));
    assert_eq!(value_of("$field", &field("x")), Value::Str("x".into()));
}

// -----------------------------------------------------------------------
// Arithmetic
// -----------------------------------------------------------------------

#[test]
fn integer_arithmetic_stays_integral() {
    let ctx = Context::new();
    assert_eq!(value_of("(2 + 3) * 4", &ctx), Value::Int(20));
    assert_eq!(value_of("2 ^ 10", &ctx), Value::Int(1024));
    assert_eq!(value_of("-(3)", &ctx), Value::Int(-3));
}

#[test]
fn division_yields_float() {
    let ctx = Context::new();
    assert_eq!(value_of("7 / 2", &ctx), Value::Float(3.5));
    assert_eq!(value_of("4 / 2", &ctx), Value::Float(2.0));
    assert_eq!(value_of("2 ^ -1", &ctx), Value::Float(0.5));
}

#[test]
fn arithmetic_with_numeric_string() {
    assert_eq!(value_of("$field * 2", &field("21")), Value::Int(42));
    assert_eq!(value_of("$field + 0.5", &field("1")), Value::Float(1.5));
}

#[test]
fn division_by_zero() {
    let err = eval_with("1 / $field > 0", &field(0)).unwrap_err();
    assert_eq!(err, EvalError::DivisionByZero);
}

#[test]
fn overflow_is_reported() {
    let ctx = field(i64::MAX);
    assert_eq!(
        eval_with("($field + 1) > 0", &ctx).unwrap_err(),
        EvalError::Overflow("+")
    );
    assert_eq!(
        eval_with("2 ^ 64 > 0", &ctx).unwrap_err(),
        EvalError::Overflow("^")
    );
}

#[test]
fn arithmetic_on_text_is_a_mismatch() {
    let err = eval_with("($field + 1) > 0", &field("abc")).unwrap_err();
    assert!(matches!(err, EvalError::TypeMismatch { op: BinOp::Add, .. }));
    let err = eval_with("-$field > 0", &field("abc")).unwrap_err();
    assert_eq!(
        err,
        EvalError::InvalidOperand {
            op: UnaryOp::Neg,
            found: "string",
        }
    );
}

// -----------------------------------------------------------------------
// Shared use
// -----------------------------------------------------------------------

#[test]
fn one_expression_many_threads() {
    let expr = parse("$n > 10 and len($name) > 0").unwrap();
    std::thread::scope(|s| {
        for n in 0..8_i64 {
            let expr = &expr;
            s.spawn(move || {
                let ctx = Context::new().with("n", n * 3).with("name", "x");
                assert_eq!(evaluate(expr, &ctx).unwrap(), n * 3 > 10);
            });
        }
    });
}

#[test]
fn huge_exponent_on_unit_bases() {
    let ctx = Context::new();
    assert_eq!(value_of("1 ^ 5000000000", &ctx), Value::Int(1));
    assert_eq!(value_of("0 ^ 5000000000", &ctx), Value::Int(0));
    assert_eq!(value_of("-1 ^ 5000000000", &ctx), Value::Int(1));
    assert_eq!(value_of("-1 ^ 5000000001", &ctx), Value::Int(-1));
    assert_eq!(
        eval_with("(2 ^ 5000000000) > 0", &ctx).unwrap_err(),
        EvalError::Overflow("^")
    );
}

#[test]
fn and_binds_tighter_than_or() {
    let ctx = Context::new().with("a", true).with("b", false).with("c", false);
    assert!(eval_with("$a or $b and $c", &ctx).unwrap());
    assert!(!eval_with("($a or $b) and $c", &ctx).unwrap());
}
