//! Types representing queries in JSONPath
use serde_json::Value;

use crate::env::QueryEnv;
use crate::error::ParseError;
use crate::node::NodeList;

use super::segment::QuerySegment;

mod sealed {
    use crate::spec::selector::{
        filter::{Filter, SingularQuery},
        slice::Slice,
        Index, Name, Selector,
    };

    use super::Query;

    pub trait Sealed {}
    impl Sealed for Query {}
    impl Sealed for Selector {}
    impl Sealed for Name {}
    impl Sealed for Index {}
    impl Sealed for Slice {}
    impl Sealed for Filter {}
    impl Sealed for SingularQuery {}
}

/// A type that is query-able
pub trait Queryable: sealed::Sealed {
    /// Query `self` using a current node, and the root node
    fn query<'b>(&self, current: &'b Value, root: &'b Value) -> Vec<&'b Value>;
}

/// Represents a JSONPath expression
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Query {
    /// The kind of query, root (`$`), or current (`@`)
    pub kind: QueryKind,
    /// The segments constituting the query
    pub segments: Vec<QuerySegment>,
}

/// The kind of query
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub enum QueryKind {
    /// A query rooted at the query argument, i.e., starting with `$`
    #[default]
    Root,
    /// A query rooted at the current node within a filter, i.e., starting with `@`
    Current,
}

impl Query {
    /// Is this query singular, i.e., guaranteed to produce at most one node
    ///
    /// A query is singular when every segment is a child segment whose single selector is a name
    /// or an index.
    pub fn is_singular(&self) -> bool {
        self.segments.iter().all(QuerySegment::is_singular)
    }

    /// Parse a JSONPath query string, using the default query environment
    ///
    /// The query must start with `$` and the entire input must be consumed.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        crate::parser::parse_query_str(input, &crate::env::DEFAULT_ENV)
    }

    /// Parse a JSONPath query string with a custom query environment
    ///
    /// Function extensions registered on `env` are available to the parsed query.
    pub fn parse_with(input: &str, env: &QueryEnv) -> Result<Self, ParseError> {
        crate::parser::parse_query_str(input, env)
    }

    /// Like [`parse`][Self::parse], but maps failure to `None`
    pub fn try_parse(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    /// Like [`parse_with`][Self::parse_with], but maps failure to `None`
    pub fn try_parse_with(input: &str, env: &QueryEnv) -> Option<Self> {
        Self::parse_with(input, env).ok()
    }

    /// Parse a JSONPath query string whose leading `$` is optional
    ///
    /// When the `$` is absent, a leading shorthand name or `*` becomes the query's first child
    /// segment, so `foo.bar` parses as `$.foo.bar`.
    pub fn parse_implicit(input: &str) -> Result<Self, ParseError> {
        crate::parser::parse_implicit_query_str(input, &crate::env::DEFAULT_ENV)
    }

    /// Like [`parse_implicit`][Self::parse_implicit], with a custom query environment
    pub fn parse_implicit_with(input: &str, env: &QueryEnv) -> Result<Self, ParseError> {
        crate::parser::parse_implicit_query_str(input, env)
    }

    /// Like [`parse_implicit`][Self::parse_implicit], but maps failure to `None`
    pub fn try_parse_implicit(input: &str) -> Option<Self> {
        Self::parse_implicit(input).ok()
    }

    /// Like [`parse_implicit_with`][Self::parse_implicit_with], but maps failure to `None`
    pub fn try_parse_implicit_with(input: &str, env: &QueryEnv) -> Option<Self> {
        Self::parse_implicit_with(input, env).ok()
    }

    /// Evaluate the query against a JSON value
    ///
    /// The value serves both as the starting node and as the query argument that embedded `$`
    /// sub-queries refer to.
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use jsonpath_query::spec::query::Query;
    /// # fn main() -> Result<(), jsonpath_query::ParseError> {
    /// let query = Query::parse("$.foo[0]")?;
    /// let value = json!({"foo": ["bar", "baz"]});
    /// assert_eq!(query.evaluate(&value).all(), vec!["bar"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn evaluate<'b>(&self, value: &'b Value) -> NodeList<'b> {
        self.evaluate_rooted(value, value)
    }

    /// Evaluate the query against a JSON value, with a distinct query argument
    ///
    /// Segments are applied starting from `value`, while embedded `$` sub-queries within filter
    /// expressions resolve against `argument`.
    pub fn evaluate_rooted<'b>(&self, value: &'b Value, argument: &'b Value) -> NodeList<'b> {
        let mut nodes = vec![value];
        for segment in &self.segments {
            nodes = segment.evaluate(&nodes, argument);
        }
        nodes.into()
    }
}

impl std::fmt::Display for Query {
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

impl Queryable for Query {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query", level = "trace", parent = None, ret))]
    fn query<'b>(&self, current: &'b Value, root: &'b Value) -> Vec<&'b Value> {
        let mut nodes = vec![match self.kind {
            QueryKind::Root => root,
            QueryKind::Current => current,
        }];
        for segment in &self.segments {
            nodes = segment.evaluate(&nodes, root);
        }
        nodes
    }
}
