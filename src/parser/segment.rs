use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, multispace0, satisfy};
use nom::combinator::{cut, map, recognize};
use nom::error::context;
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded, terminated};

use crate::env::QueryEnv;
use crate::spec::segment::QuerySegment;
use crate::spec::selector::{is_name_char, is_name_first, Name, Selector};

use super::selector::parse_selector;
use super::PResult;

/// Parse a member-name shorthand, i.e., `name-first *name-char`
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_shorthand_name(input: &str) -> PResult<String> {
    map(
        recognize(pair(satisfy(is_name_first), take_while(is_name_char))),
        String::from,
    )(input)
}

/// Parse a bracketed selector list, i.e., `"[" S selector *(S "," S selector) S "]"`
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_bracketed_selectors<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, Vec<Selector>> {
    context(
        "bracketed selectors",
        preceded(
            pair(char('['), multispace0),
            cut(terminated(
                separated_list1(
                    delimited(multispace0, char(','), multispace0),
                    |i| parse_selector(i, env),
                ),
                pair(multispace0, char(']')),
            )),
        ),
    )(input)
}

fn shorthand_selectors(input: &str) -> PResult<Vec<Selector>> {
    alt((
        map(char('*'), |_| vec![Selector::Wildcard]),
        map(parse_shorthand_name, |name| {
            vec![Selector::Name(Name::from(name))]
        }),
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_child_segment<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, QuerySegment> {
    map(
        alt((
            preceded(char('.'), shorthand_selectors),
            |i| parse_bracketed_selectors(i, env),
        )),
        QuerySegment::child,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_descendant_segment<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, QuerySegment> {
    map(
        preceded(
            tag(".."),
            alt((shorthand_selectors, |i| parse_bracketed_selectors(i, env))),
        ),
        QuerySegment::descendant,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
pub(crate) fn parse_segment<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, QuerySegment> {
    alt((
        |i| parse_descendant_segment(i, env),
        |i| parse_child_segment(i, env),
    ))(input)
}
