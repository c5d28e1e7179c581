//! The JSONPath query parser
//!
//! Recursive-descent parsers built from nom combinators, one per production of the RFC 9535
//! grammar. Each takes the query environment so that function-expression names resolve against
//! the context's registry during the parse.

use nom::branch::alt;
use nom::character::complete::{char, multispace0};
use nom::combinator::{map, opt};
use nom::multi::many0;
use nom::sequence::preceded;
use nom::IResult;

use crate::env::QueryEnv;
use crate::error::ParseError;
use crate::spec::query::{Query, QueryKind};
use crate::spec::segment::QuerySegment;
use crate::spec::selector::filter::LogicalExpr;
use crate::spec::selector::{Name, Selector};

use self::error::ParserError;
use self::segment::{parse_segment, parse_shorthand_name};
use self::selector::filter::{parse_logical_expr, ArgScope};
use self::selector::parse_selector;

pub(crate) mod error;
pub(crate) mod primitive;
pub(crate) mod segment;
pub(crate) mod selector;
mod utils;

pub(crate) type PResult<'a, O> = IResult<&'a str, O, ParserError<'a>>;

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_segments<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, Vec<QuerySegment>> {
    many0(preceded(multispace0, |i| parse_segment(i, env)))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_root_query<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, Query> {
    map(
        preceded(char('$'), |i| parse_segments(i, env)),
        |segments| Query {
            kind: QueryKind::Root,
            segments,
        },
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_current_query<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, Query> {
    map(
        preceded(char('@'), |i| parse_segments(i, env)),
        |segments| Query {
            kind: QueryKind::Current,
            segments,
        },
    )(input)
}

/// Parse a filter sub-query, rooted at either `$` or `@`
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
pub(crate) fn parse_query_node<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, Query> {
    alt((|i| parse_root_query(i, env), |i| parse_current_query(i, env)))(input)
}

/// Parse a query whose leading `$` is optional
///
/// Without the `$`, a leading shorthand name or `*` is promoted to the first child segment.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_implicit_query<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, Query> {
    if input.starts_with('$') {
        return parse_root_query(input, env);
    }
    let (rest, first) = opt(alt((
        map(char('*'), |_| QuerySegment::child(vec![Selector::Wildcard])),
        map(parse_shorthand_name, |name| {
            QuerySegment::child(vec![Selector::Name(Name::from(name))])
        }),
    )))(input)?;
    let (rest, mut segments) = parse_segments(rest, env)?;
    if let Some(first) = first {
        segments.insert(0, first);
    }
    Ok((
        rest,
        Query {
            kind: QueryKind::Root,
            segments,
        },
    ))
}

/// Run a parser over the whole input, turning leftovers and failures into a [`ParseError`]
fn complete<'a, O>(input: &'a str, result: PResult<'a, O>) -> Result<O, ParseError> {
    match result {
        Ok((rest, value)) => {
            if rest.is_empty() {
                Ok(value)
            } else {
                Err(ParseError::new(
                    input,
                    input.len() - rest.len(),
                    "unexpected trailing characters",
                ))
            }
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(ParseError::from_internal(input, e))
        }
        Err(nom::Err::Incomplete(_)) => unreachable!("we do not use streaming parsers"),
    }
}

pub(crate) fn parse_query_str(input: &str, env: &QueryEnv) -> Result<Query, ParseError> {
    complete(input, parse_root_query(input, env))
}

pub(crate) fn parse_implicit_query_str(input: &str, env: &QueryEnv) -> Result<Query, ParseError> {
    complete(input, parse_implicit_query(input, env))
}

pub(crate) fn parse_segment_str(input: &str, env: &QueryEnv) -> Result<QuerySegment, ParseError> {
    complete(input, parse_segment(input, env))
}

pub(crate) fn parse_selector_str(input: &str, env: &QueryEnv) -> Result<Selector, ParseError> {
    complete(input, parse_selector(input, env))
}

pub(crate) fn parse_expr_str(input: &str, env: &QueryEnv) -> Result<LogicalExpr, ParseError> {
    complete(input, parse_logical_expr(input, env, ArgScope::Expression))
}
