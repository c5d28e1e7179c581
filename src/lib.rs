//! This crate allows you to use JSONPath queries to extract nodelists from a
//! [`serde_json::Value`].
//!
//! The crate intends to adhere to the IETF JSONPath standard ([RFC 9535][rfc]). Check out the
//! specification to read more about JSONPath query syntax and to find many examples of its
//! usage.
//!
//! [rfc]: https://www.rfc-editor.org/rfc/rfc9535.html
//!
//! # Features
//!
//! This crate provides three surface operations over one shared AST:
//!
//! * Parsing: [`JsonPath::parse`], or [`Query::parse`][spec::query::Query::parse] and the other
//!   subform parsers ([`QuerySegment::parse`][spec::segment::QuerySegment::parse],
//!   [`Selector::parse`][spec::selector::Selector::parse],
//!   [`LogicalExpr::parse`][spec::selector::filter::LogicalExpr::parse]), each with `try_` and
//!   `_with` variants.
//! * Formatting: every AST type implements [`Display`][std::fmt::Display], producing the
//!   canonical spelling of the query, which always re-parses to the same AST.
//! * Evaluation: [`JsonPath::query`] or [`evaluate_query`], producing a [`NodeList`] — an
//!   ordered, duplicate-preserving sequence of borrowed nodes.
//!
//! Filter expressions can call function extensions; the five defined by RFC 9535 (`length`,
//! `count`, `match`, `search`, and `value`) are always available, and custom
//! [`FunctionExtension`]s can be registered on a [`QueryEnv`] passed to the `_with` parsing
//! entry points.
//!
//! # Usage
//!
//! ## Parsing
//!
//! JSONPath query strings can be parsed using the [`JsonPath`] type:
//!
//! ```rust
//! use jsonpath_query::JsonPath;
//!
//! # fn main() -> Result<(), jsonpath_query::ParseError> {
//! let path = JsonPath::parse("$.foo.bar")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Querying for single nodes
//!
//! For queries that are expected to return a single node, use either the
//! [`exactly_one`][NodeList::exactly_one] or the [`at_most_one`][NodeList::at_most_one] method:
//!
//! ```rust
//! use serde_json::json;
//! # use jsonpath_query::JsonPath;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!({ "foo": { "bar": ["baz", 42] } });
//! let path = JsonPath::parse("$.foo.bar[0]")?;
//! let node = path.query(&value).exactly_one()?;
//! assert_eq!(node, "baz");
//! # Ok(())
//! # }
//! ```
//!
//! ## Querying for multiple nodes
//!
//! For queries that are expected to return zero or many nodes, use the [`all`][NodeList::all]
//! method:
//!
//! ```rust
//! # use serde_json::json;
//! # use jsonpath_query::JsonPath;
//! # fn main() -> Result<(), jsonpath_query::ParseError> {
//! let value = json!({ "foo": { "bar": ["baz", "bop"] } });
//! let path = JsonPath::parse("$.foo.bar[*]")?;
//! let nodes = path.query(&value).all();
//! assert_eq!(nodes, vec!["baz", "bop"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Object member order
//!
//! RFC 9535 does not constrain the order in which object members enumerate. This crate uses
//! `serde_json` with its `preserve_order` feature, so members are visited in insertion order.

pub mod env;
mod error;
pub mod node;
mod parser;
mod path;
pub mod spec;

use serde_json::Value;

pub use env::{intrinsic_functions, QueryEnv};
pub use error::ParseError;
pub use node::{NodeList, SingleNodeError};
pub use path::JsonPath;
pub use spec::functions::{FunctionExtension, FunctionType};

/// Parse and evaluate a JSONPath query string against a value in one step
///
/// # Example
/// ```rust
/// # use serde_json::json;
/// # fn main() -> Result<(), jsonpath_query::ParseError> {
/// let value = json!({"foo": [1, 2, 3]});
/// let nodes = jsonpath_query::evaluate_query("$.foo[0, 0]", &value)?;
/// assert_eq!(nodes.all(), vec![1, 1]);
/// # Ok(())
/// # }
/// ```
pub fn evaluate_query<'b>(query: &str, value: &'b Value) -> Result<NodeList<'b>, ParseError> {
    Ok(spec::query::Query::parse(query)?.evaluate(value))
}

/// Like [`evaluate_query`], with a custom [`QueryEnv`]
pub fn evaluate_query_with<'b>(
    query: &str,
    value: &'b Value,
    env: &QueryEnv,
) -> Result<NodeList<'b>, ParseError> {
    Ok(spec::query::Query::parse_with(query, env)?.evaluate(value))
}

/// Extension trait that allows JSONPath queries to be run directly on a [`serde_json::Value`]
///
/// ## Usage
/// ```rust
/// # use serde_json::json;
/// use jsonpath_query::JsonPathExt;
///
/// # fn main() -> Result<(), jsonpath_query::ParseError> {
/// let value = json!({"foo": ["bar", "baz"]});
/// let nodes = value.json_path("$.foo[*]")?.all();
/// assert_eq!(nodes, vec!["bar", "baz"]);
/// # Ok(())
/// # }
/// ```
pub trait JsonPathExt {
    /// Parse `path` and evaluate it against `self`
    fn json_path<'a>(&'a self, path: &str) -> Result<NodeList<'a>, ParseError>;
}

impl JsonPathExt for Value {
    fn json_path<'a>(&'a self, path: &str) -> Result<NodeList<'a>, ParseError> {
        evaluate_query(path, self)
    }
}
