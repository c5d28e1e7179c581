//! Types representing filter selectors in JSONPath
use std::fmt::Write;

use serde_json::{Number, Value};

use crate::spec::functions::{FunctionExpr, ValueType};
use crate::spec::query::{Query, QueryKind, Queryable};
use crate::spec::segment::{QuerySegment, SegmentKind};

use super::{write_string_literal, Index, Name, Selector};

mod sealed {
    use crate::spec::functions::FunctionExpr;

    use super::{ComparisonExpr, LogicalExpr};

    pub trait Sealed {}
    impl Sealed for LogicalExpr {}
    impl Sealed for ComparisonExpr {}
    impl Sealed for FunctionExpr {}
}

/// Trait for testing a filter type
pub trait TestFilter: sealed::Sealed {
    /// Test self using the current and root nodes
    fn test_filter<'b>(&self, current: &'b Value, root: &'b Value) -> bool;
}

/// The main filter type for JSONPath
#[derive(Debug, PartialEq, Clone)]
pub struct Filter(pub LogicalExpr);

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{expr}", expr = self.0)
    }
}

impl Queryable for Filter {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Filter", level = "trace", parent = None, ret))]
    fn query<'b>(&self, current: &'b Value, root: &'b Value) -> Vec<&'b Value> {
        if let Some(list) = current.as_array() {
            list.iter()
                .filter(|v| self.0.test_filter(v, root))
                .collect()
        } else if let Some(obj) = current.as_object() {
            obj.iter()
                .map(|(_, v)| v)
                .filter(|v| self.0.test_filter(v, root))
                .collect()
        } else {
            vec![]
        }
    }
}

/// A logical expression in a filter
///
/// Parentheses are not represented: the printer re-derives the minimum set required by operator
/// precedence, so `Display` output always round-trips through the parser.
#[derive(Debug, PartialEq, Clone)]
pub enum LogicalExpr {
    /// A chain of expressions combined with `||`
    ///
    /// Holds at least two operands when produced by the parser.
    Or(Vec<LogicalExpr>),
    /// A chain of expressions combined with `&&`
    ///
    /// Holds at least two operands when produced by the parser.
    And(Vec<LogicalExpr>),
    /// An expression preceded by `!`
    Not(Box<LogicalExpr>),
    /// A comparison of two values
    Comparison(ComparisonExpr),
    /// An existence test on an embedded query
    Exist(Query),
    /// A function expression producing `LogicalType` or `NodesType`
    Function(FunctionExpr),
}

/// Operator precedence, from `||` at the bottom to atoms at the top
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_COMPARISON: u8 = 3;
const PREC_NOT: u8 = 4;
const PREC_ATOM: u8 = 5;

impl LogicalExpr {
    /// Parse a standalone logical expression, using the default query environment
    ///
    /// The entire input must be consumed.
    pub fn parse(input: &str) -> Result<Self, crate::error::ParseError> {
        crate::parser::parse_expr_str(input, &crate::env::DEFAULT_ENV)
    }

    /// Parse a standalone logical expression with a custom query environment
    pub fn parse_with(
        input: &str,
        env: &crate::env::QueryEnv,
    ) -> Result<Self, crate::error::ParseError> {
        crate::parser::parse_expr_str(input, env)
    }

    /// Like [`parse`][Self::parse], but maps failure to `None`
    pub fn try_parse(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    /// Like [`parse_with`][Self::parse_with], but maps failure to `None`
    pub fn try_parse_with(input: &str, env: &crate::env::QueryEnv) -> Option<Self> {
        Self::parse_with(input, env).ok()
    }

    fn precedence(&self) -> u8 {
        match self {
            LogicalExpr::Or(_) => PREC_OR,
            LogicalExpr::And(_) => PREC_AND,
            LogicalExpr::Comparison(_) => PREC_COMPARISON,
            LogicalExpr::Not(_) => PREC_NOT,
            LogicalExpr::Exist(_) | LogicalExpr::Function(_) => PREC_ATOM,
        }
    }

    fn fmt_at(&self, f: &mut std::fmt::Formatter<'_>, min_precedence: u8) -> std::fmt::Result {
        let parenthesize = self.precedence() < min_precedence;
        if parenthesize {
            f.write_char('(')?;
        }
        match self {
            LogicalExpr::Or(ops) => {
                for (i, op) in ops.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" || ")?;
                    }
                    op.fmt_at(f, PREC_AND)?;
                }
            }
            LogicalExpr::And(ops) => {
                for (i, op) in ops.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" && ")?;
                    }
                    op.fmt_at(f, PREC_COMPARISON)?;
                }
            }
            LogicalExpr::Not(op) => {
                f.write_char('!')?;
                op.fmt_at(f, PREC_ATOM)?;
            }
            LogicalExpr::Comparison(cmp) => write!(f, "{cmp}")?,
            LogicalExpr::Exist(query) => write!(f, "{query}")?,
            LogicalExpr::Function(func) => write!(f, "{func}")?,
        }
        if parenthesize {
            f.write_char(')')?;
        }
        Ok(())
    }
}

impl std::fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_at(f, PREC_OR)
    }
}

impl TestFilter for LogicalExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Logical Expr", level = "trace", parent = None, ret))]
    fn test_filter<'b>(&self, current: &'b Value, root: &'b Value) -> bool {
        match self {
            LogicalExpr::Or(ops) => ops.iter().any(|expr| expr.test_filter(current, root)),
            LogicalExpr::And(ops) => ops.iter().all(|expr| expr.test_filter(current, root)),
            LogicalExpr::Not(op) => !op.test_filter(current, root),
            LogicalExpr::Comparison(cmp) => cmp.test_filter(current, root),
            LogicalExpr::Exist(query) => !query.query(current, root).is_empty(),
            LogicalExpr::Function(func) => func.test_filter(current, root),
        }
    }
}

/// A comparison expression comparing two JSON values
#[derive(Debug, PartialEq, Clone)]
pub struct ComparisonExpr {
    /// The value on the left of the comparison
    pub left: Comparable,
    /// The operator of comparison
    pub op: ComparisonOperator,
    /// The value on the right of the comparison
    pub right: Comparable,
}

impl std::fmt::Display for ComparisonExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{left} {op} {right}",
            left = self.left,
            op = self.op,
            right = self.right
        )
    }
}

fn check_equal_to(left: &ValueType, right: &ValueType) -> bool {
    match (left.as_value(), right.as_value()) {
        (Some(l), Some(r)) => value_equal_to(l, r),
        (None, None) => true,
        _ => false,
    }
}

fn value_equal_to(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => number_equal_to(l, r),
        _ => left == right,
    }
}

fn number_equal_to(left: &Number, right: &Number) -> bool {
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        l == r
    } else if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        l == r
    } else if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
        l == r
    } else {
        false
    }
}

/// Strict ordering over the orderable subset of JSON values
///
/// Numbers order with numbers, strings with strings by Unicode scalar value. Every other pairing,
/// and any side that is Nothing, is unordered and yields `false`.
fn check_less_than(left: &ValueType, right: &ValueType) -> bool {
    let (Some(left), Some(right)) = (left.as_value(), right.as_value()) else {
        return false;
    };
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => number_less_than(l, r),
        (Value::String(l), Value::String(r)) => l < r,
        _ => false,
    }
}

fn number_less_than(n1: &Number, n2: &Number) -> bool {
    if let (Some(a), Some(b)) = (n1.as_f64(), n2.as_f64()) {
        a < b
    } else if let (Some(a), Some(b)) = (n1.as_i64(), n2.as_i64()) {
        a < b
    } else if let (Some(a), Some(b)) = (n1.as_u64(), n2.as_u64()) {
        a < b
    } else {
        false
    }
}

impl TestFilter for ComparisonExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Comparison Expr", level = "trace", parent = None, ret))]
    fn test_filter<'b>(&self, current: &'b Value, root: &'b Value) -> bool {
        let left = self.left.evaluate(current, root);
        let right = self.right.evaluate(current, root);
        match self.op {
            ComparisonOperator::EqualTo => check_equal_to(&left, &right),
            ComparisonOperator::NotEqualTo => !check_equal_to(&left, &right),
            ComparisonOperator::LessThan => check_less_than(&left, &right),
            ComparisonOperator::GreaterThan => check_less_than(&right, &left),
            ComparisonOperator::LessThanEqualTo => {
                check_less_than(&left, &right) || check_equal_to(&left, &right)
            }
            ComparisonOperator::GreaterThanEqualTo => {
                check_less_than(&right, &left) || check_equal_to(&left, &right)
            }
        }
    }
}

/// The comparison operator
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// `==`
    EqualTo,
    /// `!=`
    NotEqualTo,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessThanEqualTo,
    /// `>=`
    GreaterThanEqualTo,
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonOperator::EqualTo => write!(f, "=="),
            ComparisonOperator::NotEqualTo => write!(f, "!="),
            ComparisonOperator::LessThan => write!(f, "<"),
            ComparisonOperator::GreaterThan => write!(f, ">"),
            ComparisonOperator::LessThanEqualTo => write!(f, "<="),
            ComparisonOperator::GreaterThanEqualTo => write!(f, ">="),
        }
    }
}

/// A type that is comparable
#[derive(Debug, PartialEq, Clone)]
pub enum Comparable {
    /// A literal JSON value, excluding objects and arrays
    Literal(Literal),
    /// A singular query
    ///
    /// This will only produce a single node, i.e., JSON value, or nothing
    SingularQuery(SingularQuery),
    /// A function expression that can only produce a `ValueType`
    FunctionExpr(FunctionExpr),
}

impl std::fmt::Display for Comparable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparable::Literal(lit) => write!(f, "{lit}"),
            Comparable::SingularQuery(query) => write!(f, "{query}"),
            Comparable::FunctionExpr(expr) => write!(f, "{expr}"),
        }
    }
}

impl Comparable {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Evaluate Comparable", level = "trace", parent = None, ret))]
    pub(crate) fn evaluate<'a, 'b: 'a>(
        &'a self,
        current: &'b Value,
        root: &'b Value,
    ) -> ValueType<'a> {
        match self {
            Comparable::Literal(lit) => ValueType::Value(lit.into()),
            Comparable::SingularQuery(query) => match query.eval_query(current, root) {
                Some(v) => ValueType::Node(v),
                None => ValueType::Nothing,
            },
            Comparable::FunctionExpr(expr) => expr
                .evaluate(current, root)
                .try_into()
                .unwrap_or(ValueType::Nothing),
        }
    }

    #[doc(hidden)]
    pub fn as_singular_query(&self) -> Option<&SingularQuery> {
        match self {
            Comparable::SingularQuery(query) => Some(query),
            _ => None,
        }
    }
}

/// A literal JSON value that can be represented in a JSONPath query
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Literal {
    /// A valid JSON number
    Number(Number),
    /// A string
    String(String),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Number(n) => n.to_owned().into(),
            Literal::String(s) => s.to_owned().into(),
            Literal::Bool(b) => Value::from(*b),
            Literal::Null => Value::Null,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => write_string_literal(f, s),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// A segment in a singular query
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SingularSegment {
    /// A single name segment
    Name(Name),
    /// A single index segment
    Index(Index),
}

impl std::fmt::Display for SingularSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SingularSegment::Name(name) if name.has_shorthand_form() => {
                write!(f, ".{name}", name = name.as_str())
            }
            SingularSegment::Name(name) => write!(f, "[{name}]"),
            SingularSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl TryFrom<&QuerySegment> for SingularSegment {
    type Error = NonSingularQueryError;

    fn try_from(segment: &QuerySegment) -> Result<Self, Self::Error> {
        if matches!(segment.kind, SegmentKind::Descendant) {
            return Err(NonSingularQueryError::Descendant);
        }
        match segment.selectors.as_slice() {
            [selector] => selector.try_into(),
            [] => Err(NonSingularQueryError::NoSelectors),
            _ => Err(NonSingularQueryError::TooManySelectors),
        }
    }
}

impl TryFrom<&Selector> for SingularSegment {
    type Error = NonSingularQueryError;

    fn try_from(selector: &Selector) -> Result<Self, Self::Error> {
        match selector {
            Selector::Name(n) => Ok(Self::Name(n.clone())),
            Selector::Index(i) => Ok(Self::Index(*i)),
            Selector::Wildcard => Err(NonSingularQueryError::Wildcard),
            Selector::Slice(_) => Err(NonSingularQueryError::Slice),
            Selector::Filter(_) => Err(NonSingularQueryError::Filter),
        }
    }
}

/// Represents a singular query in JSONPath
///
/// Singular queries are statically guaranteed to produce at most one node; they are the only
/// queries permitted on either side of a comparison.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SingularQuery {
    /// The kind of singular query, relative (`@`) or absolute (`$`)
    pub kind: QueryKind,
    /// The segments making up the query
    pub segments: Vec<SingularSegment>,
}

impl SingularQuery {
    /// Evaluate the singular query
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Evaluate Singular Query", level = "trace", parent = None, ret))]
    pub fn eval_query<'b>(&self, current: &'b Value, root: &'b Value) -> Option<&'b Value> {
        let mut target = match self.kind {
            QueryKind::Root => root,
            QueryKind::Current => current,
        };
        for segment in &self.segments {
            match segment {
                SingularSegment::Name(name) => {
                    target = target.as_object().and_then(|o| o.get(name.as_str()))?;
                }
                SingularSegment::Index(index) => {
                    let i = i64::from(index.0);
                    target = target
                        .as_array()
                        .and_then(|l| usize::try_from(i).ok().and_then(|i| l.get(i)))?;
                }
            }
        }
        Some(target)
    }
}

impl TryFrom<&Query> for SingularQuery {
    type Error = NonSingularQueryError;

    fn try_from(query: &Query) -> Result<Self, Self::Error> {
        let segments = query
            .segments
            .iter()
            .map(TryFrom::try_from)
            .collect::<Result<Vec<SingularSegment>, Self::Error>>()?;
        Ok(Self {
            kind: query.kind.clone(),
            segments,
        })
    }
}

impl TryFrom<Query> for SingularQuery {
    type Error = NonSingularQueryError;

    fn try_from(query: Query) -> Result<Self, Self::Error> {
        Self::try_from(&query)
    }
}

impl Queryable for SingularQuery {
    fn query<'b>(&self, current: &'b Value, root: &'b Value) -> Vec<&'b Value> {
        match self.eval_query(current, root) {
            Some(v) => vec![v],
            None => vec![],
        }
    }
}

impl std::fmt::Display for SingularQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            QueryKind::Root => write!(f, "$")?,
            QueryKind::Current => write!(f, "@")?,
        }
        for s in &self.segments {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

/// Produced when attempting to use a non-singular query where a singular query is required
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NonSingularQueryError {
    /// Descendant segment
    #[error("descendant segments are not singular")]
    Descendant,
    /// Segment with more than one selector
    #[error("segments with multiple selectors are not singular")]
    TooManySelectors,
    /// Segment with no selectors
    #[error("segments with no selectors are not singular")]
    NoSelectors,
    /// A wildcard selector
    #[error("wildcard selectors are not singular")]
    Wildcard,
    /// A slice selector
    #[error("slice selectors are not singular")]
    Slice,
    /// A filter selector
    #[error("filter selectors are not singular")]
    Filter,
}
