use nom::Parser;

use super::error::ParserError;
use super::PResult;

/// Prevent a `cut` parser from poisoning an alt branch
pub(crate) fn uncut<'a, O, F>(mut parser: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: Parser<&'a str, O, ParserError<'a>>,
{
    move |input| match parser.parse(input) {
        Err(nom::Err::Failure(e)) => Err(nom::Err::Error(e)),
        rest => rest,
    }
}

/// Require the inner parser to succeed, failing hard with `message` when it does not
pub(crate) fn expect<'a, O, F>(
    mut parser: F,
    message: &'static str,
) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: Parser<&'a str, O, ParserError<'a>>,
{
    move |input| {
        parser
            .parse(input)
            .map_err(|_| nom::Err::Failure(ParserError::with_message(input, message)))
    }
}
