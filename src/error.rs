use crate::parser::error::ParserError;

/// Error type for JSONPath query string parsing errors
///
/// Carries the original input, a human-readable message, and the byte offset at which parsing
/// failed.
#[derive(Debug, thiserror::Error)]
#[error("{err}")]
pub struct ParseError {
    err: Box<ErrorImpl>,
}

impl ParseError {
    /// Get the byte offset at which the error occurred
    pub fn position(&self) -> usize {
        self.err.position
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.err.message
    }

    /// Get the input that failed to parse
    pub fn input(&self) -> &str {
        &self.err.input
    }

    pub(crate) fn new(input: &str, position: usize, message: impl Into<Box<str>>) -> Self {
        Self {
            err: Box::new(ErrorImpl {
                position,
                message: message.into(),
                input: input.into(),
            }),
        }
    }

    pub(crate) fn from_internal(input: &str, err: ParserError<'_>) -> Self {
        let position = input.len().saturating_sub(err.remainder.len());
        let message = err
            .message
            .unwrap_or_else(|| "invalid JSONPath query syntax".into());
        Self::new(input, position, message)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("at position {position}, {message}")]
struct ErrorImpl {
    position: usize,
    message: Box<str>,
    input: Box<str>,
}
