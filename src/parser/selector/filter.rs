use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, multispace0};
use nom::combinator::{map, map_res, value};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded, separated_pair, tuple};

use crate::env::QueryEnv;
use crate::parser::error::ParserError;
use crate::parser::utils::uncut;
use crate::spec::functions::FunctionType;
use crate::spec::selector::filter::{
    Comparable, ComparisonExpr, ComparisonOperator, Filter, Literal, LogicalExpr, SingularQuery,
};

use super::function::parse_function_expr;
use crate::parser::primitive::number::parse_number;
use crate::parser::primitive::string::parse_string_literal;
use crate::parser::primitive::{parse_bool, parse_null};
use crate::parser::{parse_query_node, PResult};

/// Tracks whether a logical expression is the body of a filter or one argument of a function
/// call
///
/// Inside an argument, the requirement that a standalone function call return `LogicalType` or
/// `NodesType` is suspended; the per-parameter checks of the enclosing call re-assert the
/// correct rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgScope {
    Expression,
    Argument,
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
pub(crate) fn parse_filter<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, Filter> {
    map(
        preceded(pair(char('?'), multispace0), |i| {
            parse_logical_expr(i, env, ArgScope::Expression)
        }),
        Filter,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
pub(crate) fn parse_logical_expr<'a>(
    input: &'a str,
    env: &QueryEnv,
    scope: ArgScope,
) -> PResult<'a, LogicalExpr> {
    let (rest, mut ops) = separated_list1(tuple((multispace0, tag("||"), multispace0)), |i| {
        parse_logical_and(i, env, scope)
    })(input)?;
    let expr = if ops.len() == 1 {
        ops.swap_remove(0)
    } else {
        LogicalExpr::Or(ops)
    };
    Ok((rest, expr))
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_logical_and<'a>(
    input: &'a str,
    env: &QueryEnv,
    scope: ArgScope,
) -> PResult<'a, LogicalExpr> {
    let (rest, mut ops) = separated_list1(tuple((multispace0, tag("&&"), multispace0)), |i| {
        parse_basic_expr(i, env, scope)
    })(input)?;
    let expr = if ops.len() == 1 {
        ops.swap_remove(0)
    } else {
        LogicalExpr::And(ops)
    };
    Ok((rest, expr))
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_basic_expr<'a>(
    input: &'a str,
    env: &QueryEnv,
    scope: ArgScope,
) -> PResult<'a, LogicalExpr> {
    alt((
        |i| parse_not_expr(i, env, scope),
        |i| parse_paren_expr(i, env, scope),
        map(|i| parse_comp_expr(i, env), LogicalExpr::Comparison),
        map(|i| parse_query_node(i, env), LogicalExpr::Exist),
        |i| parse_function_test(i, env, scope),
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_not_expr<'a>(
    input: &'a str,
    env: &QueryEnv,
    scope: ArgScope,
) -> PResult<'a, LogicalExpr> {
    map(
        preceded(pair(char('!'), multispace0), |i| {
            parse_negatable_expr(i, env, scope)
        }),
        |expr| LogicalExpr::Not(Box::new(expr)),
    )(input)
}

fn parse_negatable_expr<'a>(
    input: &'a str,
    env: &QueryEnv,
    scope: ArgScope,
) -> PResult<'a, LogicalExpr> {
    alt((
        |i| parse_paren_expr(i, env, scope),
        map(|i| parse_query_node(i, env), LogicalExpr::Exist),
        |i| parse_function_test(i, env, scope),
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_paren_expr<'a>(
    input: &'a str,
    env: &QueryEnv,
    scope: ArgScope,
) -> PResult<'a, LogicalExpr> {
    delimited(
        pair(char('('), multispace0),
        |i| parse_logical_expr(i, env, scope),
        pair(multispace0, char(')')),
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_function_test<'a>(
    input: &'a str,
    env: &QueryEnv,
    scope: ArgScope,
) -> PResult<'a, LogicalExpr> {
    let (rest, func) = parse_function_expr(input, env)?;
    if scope == ArgScope::Expression && func.result_type() == FunctionType::Value {
        return Err(nom::Err::Failure(ParserError::with_message(
            input,
            "function with a ValueType result cannot be used as a test expression",
        )));
    }
    Ok((rest, LogicalExpr::Function(func)))
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_comp_expr<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, ComparisonExpr> {
    map(
        separated_pair(
            |i| parse_comparable(i, env),
            multispace0,
            separated_pair(parse_comparison_operator, multispace0, |i| {
                parse_comparable(i, env)
            }),
        ),
        |(left, (op, right))| ComparisonExpr { left, op, right },
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_comparison_operator(input: &str) -> PResult<ComparisonOperator> {
    alt((
        value(ComparisonOperator::EqualTo, tag("==")),
        value(ComparisonOperator::NotEqualTo, tag("!=")),
        value(ComparisonOperator::LessThanEqualTo, tag("<=")),
        value(ComparisonOperator::GreaterThanEqualTo, tag(">=")),
        value(ComparisonOperator::LessThan, char('<')),
        value(ComparisonOperator::GreaterThan, char('>')),
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_literal(input: &str) -> PResult<Literal> {
    alt((
        map(parse_string_literal, Literal::String),
        map(parse_number, Literal::Number),
        map(parse_bool, Literal::Bool),
        value(Literal::Null, parse_null),
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_singular_query_comparable<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, Comparable> {
    map_res(
        |i| parse_query_node(i, env),
        |q| SingularQuery::try_from(&q).map(Comparable::SingularQuery),
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_function_comparable<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, Comparable> {
    let (rest, func) = parse_function_expr(input, env)?;
    if func.result_type() != FunctionType::Value {
        return Err(nom::Err::Failure(ParserError::with_message(
            input,
            "only functions with a ValueType result can be compared",
        )));
    }
    Ok((rest, Comparable::FunctionExpr(func)))
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
pub(crate) fn parse_comparable<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, Comparable> {
    uncut(alt((
        map(parse_literal, Comparable::Literal),
        |i| parse_singular_query_comparable(i, env),
        |i| parse_function_comparable(i, env),
    )))(input)
}

#[cfg(test)]
mod tests {
    use serde_json::Number;

    use crate::env::QueryEnv;
    use crate::spec::selector::filter::{
        Comparable, ComparisonOperator, Literal, LogicalExpr, SingularSegment,
    };

    use super::{parse_basic_expr, parse_comp_expr, parse_comparable, parse_literal, ArgScope};

    fn env() -> QueryEnv {
        QueryEnv::new()
    }

    #[test]
    fn literals() {
        assert!(matches!(parse_literal("null"), Ok(("", Literal::Null))));
        assert!(matches!(
            parse_literal("true"),
            Ok(("", Literal::Bool(true)))
        ));
        assert!(matches!(
            parse_literal("false"),
            Ok(("", Literal::Bool(false)))
        ));
        assert!(matches!(parse_literal("\"test\""), Ok(("", Literal::String(s))) if s == "test"));
        assert!(matches!(parse_literal("'test'"), Ok(("", Literal::String(s))) if s == "test"));
        assert!(
            matches!(parse_literal("123"), Ok(("", Literal::Number(n))) if n == Number::from(123))
        );
    }

    #[test]
    fn comp_expr() {
        let (_, cxp) = parse_comp_expr("true != false", &env()).expect("parses");
        assert!(matches!(cxp.left, Comparable::Literal(Literal::Bool(true))));
        assert!(matches!(cxp.op, ComparisonOperator::NotEqualTo));
        assert!(matches!(
            cxp.right,
            Comparable::Literal(Literal::Bool(false))
        ));
    }

    #[test]
    fn basic_expr() {
        let (_, bxp) = parse_basic_expr("@.foo", &env(), ArgScope::Expression).expect("parses");
        assert!(matches!(bxp, LogicalExpr::Exist(_)));
        let (_, bxp) =
            parse_basic_expr("!(@.foo || @.bar)", &env(), ArgScope::Expression).expect("parses");
        let LogicalExpr::Not(inner) = bxp else {
            panic!("expected a negation");
        };
        assert!(matches!(*inner, LogicalExpr::Or(_)));
    }

    #[test]
    fn or_and_chains_collapse_singletons() {
        let (_, expr) =
            super::parse_logical_expr("@.a", &env(), ArgScope::Expression).expect("parses");
        assert!(matches!(expr, LogicalExpr::Exist(_)));
        let (_, expr) = super::parse_logical_expr("@.a && @.b || @.c", &env(), ArgScope::Expression)
            .expect("parses");
        let LogicalExpr::Or(ops) = expr else {
            panic!("expected an or chain");
        };
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], LogicalExpr::And(ands) if ands.len() == 2));
    }

    #[test]
    fn singular_query_comparables() {
        {
            let (_, cmp) = parse_comparable("@.name", &env()).expect("parses");
            let sq = &cmp.as_singular_query().expect("is singular query").segments;
            assert!(matches!(&sq[0], SingularSegment::Name(n) if n.as_str() == "name"));
        }
        {
            let (_, cmp) = parse_comparable("$.data[0].id", &env()).expect("parses");
            let sq = &cmp.as_singular_query().expect("is singular query").segments;
            assert!(matches!(&sq[0], SingularSegment::Name(n) if n.as_str() == "data"));
            assert!(matches!(&sq[1], SingularSegment::Index(i) if i64::from(i.0) == 0));
            assert!(matches!(&sq[2], SingularSegment::Name(n) if n.as_str() == "id"));
        }
    }

    #[test]
    fn non_singular_queries_are_not_comparable() {
        assert!(parse_comparable("@.a.*", &env()).is_err());
        assert!(parse_comparable("@..a", &env()).is_err());
        assert!(parse_comparable("@.a['b', 'c']", &env()).is_err());
    }
}
