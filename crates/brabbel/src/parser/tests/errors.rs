use super::parse;

// -----------------------------------------------------------------------
// Error cases
// -----------------------------------------------------------------------

#[test]
fn reject_empty() {
    let err = parse("").unwrap_err();
    assert_eq!(err.input, "");
    assert_eq!(err.message, "empty expression");
    assert!(parse("   ").is_err());
}

#[test]
fn reject_unbalanced_parentheses() {
    assert!(parse("($a > 1").is_err());
    assert!(parse("$a > 1)").is_err());
    assert!(parse("len($a").is_err());
}

#[test]
fn reject_unbalanced_brackets() {
    assert!(parse("$a in [1, 2").is_err());
    assert!(parse("$a in 1, 2]").is_err());
}

#[test]
fn reject_trailing_operator() {
    for input in ["$a >", "$a and", "$a +", "not", "-", "$a ^"] {
        assert!(parse(input).is_err(), "{input:?} should not parse");
    }
}

#[test]
fn reject_leading_binary_operator() {
    assert!(parse("> 5").is_err());
    assert!(parse("and $a").is_err());
}

#[test]
fn reject_missing_operator() {
    assert!(parse("$a $b").is_err());
    assert!(parse("1 2").is_err());
}

#[test]
fn reject_unknown_tokens() {
    assert!(parse("$a = 1").is_err());
    assert!(parse("$a & $b").is_err());
    assert!(parse("field > 1").is_err());
    assert!(parse("$").is_err());
    assert!(parse("$1abc").is_err());
    assert!(parse("$a.").is_err());
}

#[test]
fn reject_unknown_function() {
    assert!(parse("upper($a)").is_err());
    assert!(parse("length($a)").is_err());
    assert!(parse("len $a").is_err());
}

#[test]
fn reject_operator_in_list_element() {
    assert!(parse("$a in [1 + 1]").is_err());
}

#[test]
fn reject_unterminated_string() {
    assert!(parse("$a == 'abc").is_err());
    assert!(parse("$a == \"abc'").is_err());
}

#[test]
fn error_carries_input_and_offset() {
    let err = parse("$a > 1 )").unwrap_err();
    assert_eq!(err.input, "$a > 1 )");
    assert_eq!(err.offset, 7);
    assert!(err.to_string().contains("$a > 1 )"));
}
