use std::sync::Arc;

use nom::branch::alt;
use nom::bytes::complete::take_while;
use nom::character::complete::{char, multispace0, satisfy};
use nom::combinator::{cut, map, recognize};
use nom::multi::separated_list0;
use nom::sequence::{delimited, pair, preceded, terminated};

use crate::env::QueryEnv;
use crate::parser::error::ParserError;
use crate::spec::functions::{FunctionArg, FunctionExpr, FunctionValidationError};
use crate::spec::selector::filter::{LogicalExpr, SingularQuery};

use super::filter::{parse_literal, parse_logical_expr, ArgScope};
use crate::parser::PResult;

fn is_function_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_function_name(input: &str) -> PResult<String> {
    map(
        recognize(pair(
            satisfy(|c| c.is_ascii_lowercase()),
            take_while(is_function_name_char),
        )),
        String::from,
    )(input)
}

/// Parse one function argument
///
/// Expressions are tried first so that comparisons and logical combinations whose left side is a
/// literal are not cut short; a bare literal is the fallback. Expression results collapse to the
/// most specific argument form: an existence test becomes a (singular) query argument and a lone
/// function call becomes a function argument.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
fn parse_function_argument<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, FunctionArg> {
    alt((
        |i| parse_expression_argument(i, env),
        map(parse_literal, FunctionArg::Literal),
    ))(input)
}

fn parse_expression_argument<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, FunctionArg> {
    let (rest, expr) = parse_logical_expr(input, env, ArgScope::Argument)?;
    let arg = match expr {
        LogicalExpr::Exist(query) => match SingularQuery::try_from(&query) {
            Ok(sq) => FunctionArg::SingularQuery(sq),
            Err(_) => FunctionArg::Query(query),
        },
        LogicalExpr::Function(func) => FunctionArg::FunctionExpr(func),
        other => FunctionArg::LogicalExpr(other),
    };
    Ok((rest, arg))
}

/// Parse a function call and validate it against the environment's registry
///
/// Resolution, arity, and per-parameter typing are all enforced here, at parse time.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err, skip(env)))]
pub(crate) fn parse_function_expr<'a>(input: &'a str, env: &QueryEnv) -> PResult<'a, FunctionExpr> {
    let (rest, name) = parse_function_name(input)?;
    let (rest, args) = preceded(
        pair(char('('), multispace0),
        cut(terminated(
            separated_list0(delimited(multispace0, char(','), multispace0), |i| {
                parse_function_argument(i, env)
            }),
            preceded(multispace0, char(')')),
        )),
    )(rest)?;
    let Some(ext) = env.function(&name) else {
        return Err(validation_failure(
            input,
            FunctionValidationError::Undefined { name },
        ));
    };
    if args.len() != ext.parameter_types().len() {
        return Err(validation_failure(
            input,
            FunctionValidationError::NumberOfArgsMismatch {
                expected: ext.parameter_types().len(),
                received: args.len(),
            },
        ));
    }
    for (position, (arg, kind)) in args.iter().zip(ext.parameter_types()).enumerate() {
        if !arg.matches_type(*kind) {
            return Err(validation_failure(
                input,
                FunctionValidationError::MismatchTypeKind {
                    expected: *kind,
                    received: arg.describe_type(),
                    position: position + 1,
                },
            ));
        }
    }
    Ok((rest, FunctionExpr::new(Arc::clone(ext), args)))
}

fn validation_failure<'a>(
    input: &'a str,
    error: FunctionValidationError,
) -> nom::Err<ParserError<'a>> {
    nom::Err::Failure(ParserError::with_message(input, error.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::env::QueryEnv;
    use crate::spec::functions::FunctionArg;

    use super::parse_function_expr;

    fn env() -> QueryEnv {
        QueryEnv::new()
    }

    #[test]
    fn intrinsic_function_calls() {
        let (_, func) = parse_function_expr("length(@.name)", &env()).expect("parses");
        assert_eq!(func.name(), "length");
        assert!(matches!(func.args(), [FunctionArg::SingularQuery(_)]));

        let (_, func) = parse_function_expr("count(@.*)", &env()).expect("parses");
        assert_eq!(func.name(), "count");
        assert!(matches!(func.args(), [FunctionArg::Query(_)]));

        let (_, func) = parse_function_expr("match(@.date, '1974-05-..')", &env()).expect("parses");
        assert_eq!(func.name(), "match");
        assert!(matches!(
            func.args(),
            [FunctionArg::SingularQuery(_), FunctionArg::Literal(_)],
        ));
    }

    #[test]
    fn unknown_functions_fail() {
        assert!(parse_function_expr("frobnicate(@.a)", &env()).is_err());
    }

    #[test]
    fn arity_is_checked() {
        assert!(parse_function_expr("length()", &env()).is_err());
        assert!(parse_function_expr("length(@.a, @.b)", &env()).is_err());
        assert!(parse_function_expr("match(@.a)", &env()).is_err());
    }

    #[test]
    fn parameter_types_are_checked() {
        // length takes a ValueType; a non-singular query is not convertible
        assert!(parse_function_expr("length(@.*)", &env()).is_err());
        // count takes a NodesType; a literal is not convertible
        assert!(parse_function_expr("count(5)", &env()).is_err());
        // match takes ValueType arguments; a logical expression is not convertible
        assert!(parse_function_expr("match(@.a > 2, 'x')", &env()).is_err());
        // nested functions must produce the declared parameter type
        assert!(parse_function_expr("count(length(@.a))", &env()).is_err());
        assert!(parse_function_expr("length(count(@.*))", &env()).is_ok());
    }
}
