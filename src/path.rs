use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::{env::QueryEnv, error::ParseError, node::NodeList, spec::query::Query};

/// A compiled JSONPath query
///
/// `JsonPath` pairs the parsed [`Query`] AST with the surface most callers want: compile a query
/// string once, run it against many documents, and print it back canonically. Compilation
/// resolves function extensions against a [`QueryEnv`] — [`parse`][JsonPath::parse] uses the
/// default environment, which registers the RFC 9535 intrinsics, while
/// [`parse_with`][JsonPath::parse_with] compiles against an environment carrying custom
/// extensions.
///
/// ```rust
/// use jsonpath_query::JsonPath;
/// use serde_json::json;
///
/// # fn main() -> Result<(), jsonpath_query::ParseError> {
/// let path = JsonPath::parse("$.machines[?@.cores >= 8].host")?;
/// let fleet = json!({"machines": [
///     {"host": "small-1", "cores": 2},
///     {"host": "big-1", "cores": 16}
/// ]});
/// assert_eq!(path.query(&fleet).all(), vec!["big-1"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct JsonPath(Query);

impl JsonPath {
    /// Compile a query string against the default environment
    ///
    /// Only the intrinsic functions (`length`, `count`, `match`, `search`, `value`) are callable
    /// from filters; a query naming any other function fails to compile here and needs
    /// [`parse_with`][Self::parse_with].
    pub fn parse(path_str: &str) -> Result<Self, ParseError> {
        Query::parse(path_str).map(Self)
    }

    /// Compile a query string against a [`QueryEnv`]
    ///
    /// Filter expressions may call any extension registered on `env`; names, arity, and
    /// parameter types are checked during compilation, and the compiled path keeps shared
    /// references to the extensions it uses, so the environment is not needed again at query
    /// time.
    ///
    /// # Example
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use jsonpath_query::spec::functions::PathType;
    /// use jsonpath_query::{FunctionExtension, FunctionType, JsonPath, QueryEnv};
    ///
    /// fn last<'a>(args: Vec<PathType<'a>>) -> PathType<'a> {
    ///     match args.into_iter().next() {
    ///         Some(PathType::Nodes(nodes)) => match nodes.last().copied() {
    ///             Some(node) => PathType::Node(node),
    ///             None => PathType::Nothing,
    ///         },
    ///         _ => PathType::Nothing,
    ///     }
    /// }
    ///
    /// # fn main() -> Result<(), jsonpath_query::ParseError> {
    /// let env = QueryEnv::new().with_function(FunctionExtension::new(
    ///     "last",
    ///     vec![FunctionType::Nodes],
    ///     FunctionType::Value,
    ///     Arc::new(last),
    /// ));
    /// let path = JsonPath::parse_with("$[?last(@.runs.*) == 'pass']", &env)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse_with(path_str: &str, env: &QueryEnv) -> Result<Self, ParseError> {
        Query::parse_with(path_str, env).map(Self)
    }

    /// Select nodes from `value`
    ///
    /// The returned [`NodeList`] borrows from `value`; embedded `$` sub-queries in filters
    /// resolve against `value` as well.
    pub fn query<'b>(&self, value: &'b Value) -> NodeList<'b> {
        self.0.evaluate(value)
    }

    /// Select nodes from `value` while binding embedded `$` sub-queries to `argument`
    ///
    /// This is the wrapper over [`Query::evaluate_rooted`] for running a path against a
    /// sub-document while filters still reference the enclosing document.
    pub fn query_rooted<'b>(&self, value: &'b Value, argument: &'b Value) -> NodeList<'b> {
        self.0.evaluate_rooted(value, argument)
    }

    /// Borrow the underlying [`Query`] AST
    pub fn as_query(&self) -> &Query {
        &self.0
    }

    /// Unwrap into the underlying [`Query`] AST
    pub fn into_query(self) -> Query {
        self.0
    }
}

impl From<Query> for JsonPath {
    fn from(query: Query) -> Self {
        Self(query)
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for JsonPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::parse(s)
    }
}

/// Deserializes from a query string, so a `JsonPath` can sit directly in configuration structs
///
/// Compilation uses the default environment; configuration formats that need custom function
/// extensions should deserialize the string and call [`JsonPath::parse_with`] themselves.
impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        JsonPath::parse(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::JsonPath;

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<JsonPath>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<JsonPath>();
    }

    #[test]
    fn round_trips_through_display() {
        let path = JsonPath::parse("$.foo[1:10:2].baz").expect("parses");
        let reparsed = JsonPath::parse(&path.to_string()).expect("reparses");
        assert_eq!(path, reparsed);
    }

    #[test]
    fn rooted_queries_see_the_outer_document() {
        let document = json!({"threshold": 10, "items": [{"v": 5}, {"v": 15}]});
        let items = document.pointer("/items").expect("fixture has items");
        let path = JsonPath::parse("$[?@.v > $.threshold]").expect("parses");
        let nodes = path.query_rooted(items, &document);
        assert_eq!(nodes.all(), vec![&json!({"v": 15})]);
    }
}
