use nom::bytes::complete::{tag, take_while, take_while_m_n};
use nom::character::complete::char;
use nom::combinator::{map, map_res, value, verify};
use nom::error::context;
use nom::multi::fold_many0;
use nom::sequence::{delimited, preceded};
use nom::branch::alt;

use crate::parser::error::ParserError;
use crate::parser::utils::expect;
use crate::parser::PResult;

#[derive(Debug, Copy, Clone)]
enum Quotes {
    Single,
    Double,
}

fn is_hex_digit(chr: char) -> bool {
    chr.is_ascii_hexdigit()
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_hex4(input: &str) -> PResult<u16> {
    map_res(take_while_m_n(4, 4, is_hex_digit), |hex| {
        u16::from_str_radix(hex, 16)
    })(input)
}

fn is_high_surrogate(code: u16) -> bool {
    (0xD800..=0xDBFF).contains(&code)
}

fn is_low_surrogate(code: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&code)
}

/// Parse the code units following `\u`
///
/// A high surrogate must be followed by `\u` and a low surrogate; an isolated low surrogate is
/// an error.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_unicode_sequence(input: &str) -> PResult<String> {
    let (rest, first) = parse_hex4(input)?;
    if is_high_surrogate(first) {
        let (rest, _) = expect(tag("\\u"), "expected a low surrogate to complete the pair")(rest)?;
        let (rest, low) = parse_hex4(rest)?;
        if !is_low_surrogate(low) {
            return Err(nom::Err::Failure(ParserError::with_message(
                input,
                "expected a low surrogate to complete the pair",
            )));
        }
        match String::from_utf16(&[first, low]) {
            Ok(s) => Ok((rest, s)),
            Err(_) => Err(nom::Err::Failure(ParserError::with_message(
                input,
                "invalid surrogate pair",
            ))),
        }
    } else if is_low_surrogate(first) {
        Err(nom::Err::Error(ParserError::with_message(
            input,
            "unexpected isolated low surrogate",
        )))
    } else {
        match char::from_u32(u32::from(first)) {
            Some(c) => Ok((rest, String::from(c))),
            None => Err(nom::Err::Error(ParserError::with_message(
                input,
                "invalid unicode escape",
            ))),
        }
    }
}

fn parse_escaped_quote(quoted_with: Quotes) -> impl Fn(&str) -> PResult<char> {
    move |input: &str| match quoted_with {
        Quotes::Single => value('\u{0027}', char('\''))(input),
        Quotes::Double => value('\u{0022}', char('"'))(input),
    }
}

fn parse_escaped_char(quoted_with: Quotes) -> impl Fn(&str) -> PResult<String> {
    move |input: &str| {
        context(
            "escaped character",
            preceded(
                char('\\'),
                alt((
                    map(
                        alt((
                            value('\u{0008}', char('b')),
                            value('\u{0009}', char('t')),
                            value('\u{000A}', char('n')),
                            value('\u{000C}', char('f')),
                            value('\u{000D}', char('r')),
                            value('\u{002F}', char('/')),
                            value('\u{005C}', char('\\')),
                            parse_escaped_quote(quoted_with),
                        )),
                        String::from,
                    ),
                    preceded(char('u'), parse_unicode_sequence),
                )),
            ),
        )(input)
    }
}

fn is_valid_unescaped_char(chr: char, quoted_with: Quotes) -> bool {
    let invalid_quote_char = match quoted_with {
        Quotes::Single => '\'',
        Quotes::Double => '"',
    };
    if chr == invalid_quote_char {
        return false;
    }
    // control characters and `\` must be escaped
    matches!(chr, '\u{20}'..='\u{5B}' | '\u{5D}'..='\u{10FFFF}')
}

fn parse_unescaped(quoted_with: Quotes) -> impl Fn(&str) -> PResult<&str> {
    move |input: &str| {
        verify(
            take_while(|chr| is_valid_unescaped_char(chr, quoted_with)),
            |s: &str| !s.is_empty(),
        )(input)
    }
}

fn parse_fragment(quoted_with: Quotes) -> impl Fn(&str) -> PResult<String> {
    move |input: &str| {
        alt((
            map(parse_unescaped(quoted_with), String::from),
            parse_escaped_char(quoted_with),
        ))(input)
    }
}

fn parse_internal(quoted_with: Quotes) -> impl Fn(&str) -> PResult<String> {
    move |input: &str| {
        fold_many0(
            parse_fragment(quoted_with),
            String::new,
            |mut string, fragment| {
                string.push_str(fragment.as_str());
                string
            },
        )(input)
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_single_quoted(input: &str) -> PResult<String> {
    delimited(
        char('\''),
        parse_internal(Quotes::Single),
        expect(char('\''), "expected an ending quote"),
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_double_quoted(input: &str) -> PResult<String> {
    delimited(
        char('"'),
        parse_internal(Quotes::Double),
        expect(char('"'), "expected an ending quote"),
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_string_literal(input: &str) -> PResult<String> {
    alt((parse_single_quoted, parse_double_quoted))(input)
}

#[cfg(test)]
mod tests {
    use super::{parse_escaped_char, parse_string_literal, Quotes};

    #[test]
    fn valid_double_quoted_strings() {
        assert_eq!(
            parse_string_literal("\"test\""),
            Ok(("", String::from("test")))
        );
        assert_eq!(
            parse_string_literal("\"test\\ntest\""),
            Ok(("", String::from("test\ntest")))
        );
        assert_eq!(
            parse_string_literal("\"test\\\"\""),
            Ok(("", String::from("test\"")))
        );
        assert_eq!(
            parse_string_literal("\"tes't\""),
            Ok(("", String::from("tes't")))
        );
    }

    #[test]
    fn valid_single_quoted_strings() {
        assert_eq!(
            parse_string_literal("'test'"),
            Ok(("", String::from("test")))
        );
        assert_eq!(
            parse_string_literal(r#"'te"st'"#),
            Ok(("", String::from("te\"st")))
        );
        assert_eq!(
            parse_string_literal(r"'te\'st'"),
            Ok(("", String::from("te'st")))
        );
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(
            parse_string_literal(r"'\u0041'"),
            Ok(("", String::from("A")))
        );
        // surrogate pair for U+1D11E MUSICAL SYMBOL G CLEF
        assert_eq!(
            parse_string_literal(r"'\uD834\uDD1E'"),
            Ok(("", String::from("\u{1D11E}")))
        );
        // a high surrogate must be followed by a low surrogate
        assert!(parse_string_literal(r"'\uD834'").is_err());
        assert!(parse_string_literal(r"'\uD834A'").is_err());
        // an isolated low surrogate is an error
        assert!(parse_string_literal(r"'\uDD1E'").is_err());
    }

    #[test]
    fn control_characters_must_be_escaped() {
        for c in '\u{00}'..'\u{20}' {
            let input = format!("{c}");
            assert!(parse_escaped_char(Quotes::Double)(&input).is_err());
        }
        assert!(parse_string_literal("'a\tb'").is_err());
    }

    #[test]
    fn unterminated_strings() {
        assert!(parse_string_literal("'test").is_err());
        assert!(parse_string_literal("\"test'").is_err());
    }
}
