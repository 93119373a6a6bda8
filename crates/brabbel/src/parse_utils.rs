use winnow::ascii::multispace0;
use winnow::combinator::{alt, cut_err, opt, separated};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{literal, take_while};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

pub fn ident<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    // First character must be alphabetic or underscore (not digit).
    if !input.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

/// A dotted variable path such as `user.address.zip`, without the `$`.
pub fn dotted_name(input: &mut &str) -> ModalResult<String> {
    let segments: Vec<&str> = separated(1.., ident, literal(".")).parse_next(input)?;
    Ok(segments.join("."))
}

/// Whether `name` can be referenced as `$name` in an expression.
pub fn is_variable_name(name: &str) -> bool {
    dotted_name.parse(name).is_ok()
}

/// Match an exact keyword string, ensuring it's not a prefix of a longer
/// identifier (i.e. the next character is not alphanumeric or `_`).
pub fn kw<'a>(keyword: &'static str) -> impl FnMut(&mut &'a str) -> ModalResult<()> {
    move |input: &mut &'a str| {
        let saved = *input;
        literal(keyword).parse_next(input)?;
        if input.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_') {
            *input = saved;
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Parse a single- or double-quoted string. There are no escape sequences;
/// the literal ends at the first matching quote.
pub fn quoted_string(input: &mut &str) -> ModalResult<String> {
    let quote = alt((literal("'"), literal("\""))).parse_next(input)?;
    let quote_char = if quote == "'" { '\'' } else { '"' };
    let content = take_while(0.., |c: char| c != quote_char).parse_next(input)?;
    cut_err(literal(quote))
        .context(StrContext::Expected(StrContextValue::Description(
            "closing quote",
        )))
        .parse_next(input)?;
    Ok(content.to_string())
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// A parsed numeric literal, keeping the integer/float distinction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Parse a number literal: optional sign, digits, optional fraction and
/// optional exponent. Integer forms that overflow `i64` are rejected.
pub fn number_literal(input: &mut &str) -> ModalResult<Number> {
    let start = *input;
    let _ = opt(alt((literal("+"), literal("-")))).parse_next(input)?;
    let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;

    let mut is_float = false;
    if opt(literal(".")).parse_next(input)?.is_some() {
        is_float = true;
        let _ = cut_err(take_while(1.., |c: char| c.is_ascii_digit()))
            .context(StrContext::Expected(StrContextValue::Description(
                "digits after decimal point",
            )))
            .parse_next(input)?;
    }
    let after_e = input.get(1..).unwrap_or_default();
    let after_e = after_e.strip_prefix(['+', '-']).unwrap_or(after_e);
    if input.starts_with(['e', 'E']) && after_e.starts_with(|c: char| c.is_ascii_digit()) {
        is_float = true;
        let _ = alt((literal("e"), literal("E"))).parse_next(input)?;
        let _ = opt(alt((literal("+"), literal("-")))).parse_next(input)?;
        let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    }

    let text = &start[..start.len() - input.len()];
    let text = text.strip_prefix('+').unwrap_or(text);
    if is_float {
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Number::Float(v)),
            _ => Err(ErrMode::Cut(ContextError::new())),
        }
    } else {
        text.parse::<i64>()
            .map(Number::Int)
            .map_err(|_| ErrMode::Cut(ContextError::new()))
    }
}

// ---------------------------------------------------------------------------
// Whitespace
// ---------------------------------------------------------------------------

pub fn ws_skip(input: &mut &str) -> ModalResult<()> {
    let _ = multispace0.parse_next(input)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_forms() {
        assert_eq!(number_literal.parse("42").unwrap(), Number::Int(42));
        assert_eq!(number_literal.parse("-7").unwrap(), Number::Int(-7));
        assert_eq!(number_literal.parse("+7").unwrap(), Number::Int(7));
        assert_eq!(number_literal.parse("3.25").unwrap(), Number::Float(3.25));
        assert_eq!(number_literal.parse("1e3").unwrap(), Number::Float(1000.0));
        assert_eq!(number_literal.parse("2.5E-1").unwrap(), Number::Float(0.25));
    }

    #[test]
    fn number_rejects_dangling_dot_and_overflow() {
        assert!(number_literal.parse("5.").is_err());
        assert!(number_literal.parse("99999999999999999999").is_err());
        assert!(number_literal.parse("1e999").is_err());
    }

    #[test]
    fn exponent_needs_digits() {
        // `e` without digits is left unconsumed, so the full parse fails.
        assert!(number_literal.parse("1e").is_err());
        let mut input = "1eq 2";
        assert_eq!(number_literal.parse_next(&mut input).unwrap(), Number::Int(1));
        assert_eq!(input, "eq 2");
    }

    #[test]
    fn quoted_both_styles() {
        assert_eq!(quoted_string.parse("'abc'").unwrap(), "abc");
        assert_eq!(quoted_string.parse("\"it's\"").unwrap(), "it's");
        assert!(quoted_string.parse("'open").is_err());
    }

    #[test]
    fn variable_names() {
        assert!(is_variable_name("age"));
        assert!(is_variable_name("user.address.zip"));
        assert!(is_variable_name("_private"));
        assert!(!is_variable_name(""));
        assert!(!is_variable_name("1st"));
        assert!(!is_variable_name("a."));
        assert!(!is_variable_name("x) or bool(1"));
        assert!(!is_variable_name("first name"));
    }

    #[test]
    fn keyword_boundary() {
        let mut input = "andy";
        assert!(kw("and").parse_next(&mut input).is_err());
        assert_eq!(input, "andy");
        let mut input = "and $x";
        assert!(kw("and").parse_next(&mut input).is_ok());
        assert_eq!(input, " $x");
    }
}
