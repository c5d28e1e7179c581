//! The internal error type threaded through the nom parsers
//!
//! Tracks the unconsumed remainder, from which the public error recovers the byte offset, and an
//! optional message contributed by `context` or by validation failures surfaced through
//! `map_res`.

use nom::error::{ContextError, ErrorKind, FromExternalError};

#[derive(Debug, PartialEq)]
pub(crate) struct ParserError<'a> {
    pub(crate) remainder: &'a str,
    pub(crate) message: Option<Box<str>>,
}

impl<'a> ParserError<'a> {
    pub(crate) fn with_message(remainder: &'a str, message: impl Into<Box<str>>) -> Self {
        Self {
            remainder,
            message: Some(message.into()),
        }
    }
}

impl<'a> nom::error::ParseError<&'a str> for ParserError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Self {
            remainder: input,
            message: None,
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        // keep whichever alternative carries a message, otherwise whichever got farther
        match (&self.message, &other.message) {
            (Some(_), None) => self,
            (None, Some(_)) => other,
            _ => {
                if other.remainder.len() < self.remainder.len() {
                    other
                } else {
                    self
                }
            }
        }
    }
}

impl<'a> ContextError<&'a str> for ParserError<'a> {
    fn add_context(_input: &'a str, context: &'static str, mut other: Self) -> Self {
        if other.message.is_none() {
            other.message = Some(format!("expected {context}").into());
        }
        other
    }
}

impl<'a, E: std::fmt::Display> FromExternalError<&'a str, E> for ParserError<'a> {
    fn from_external_error(input: &'a str, _kind: ErrorKind, e: E) -> Self {
        Self::with_message(input, e.to_string())
    }
}
