//! Function extensions in JSONPath
//!
//! Function extensions are a way to extend the capability of filter expressions beyond what the
//! standard query syntax can support. All of them conform to a type system with three declared
//! types: [`ValueType`], [`LogicalType`], and [`NodesType`]. The five functions defined by RFC
//! 9535 (`length`, `count`, `match`, `search`, and `value`) are pre-registered on every default
//! [`QueryEnv`][crate::env::QueryEnv]; additional [`FunctionExtension`]s can be registered there
//! and become available to both the parser and the evaluator.

use std::sync::Arc;

use serde_json::Value;

use crate::node::NodeList;
use crate::spec::query::Queryable;
use crate::spec::selector::filter::{Literal, LogicalExpr, SingularQuery, TestFilter};

use super::query::Query;

/// The declared type of a function parameter or result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionType {
    /// A JSON value or Nothing, i.e., [`ValueType`]
    Value,
    /// A logical true or false, i.e., [`LogicalType`]
    Logical,
    /// A nodelist, i.e., [`NodesType`]
    Nodes,
}

impl std::fmt::Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionType::Value => write!(f, "ValueType"),
            FunctionType::Logical => write!(f, "LogicalType"),
            FunctionType::Nodes => write!(f, "NodesType"),
        }
    }
}

/// JSONPath type representing a nodelist
///
/// This is a thin wrapper around a [`NodeList`], and generally represents the result of an
/// embedded JSONPath query. It may also be produced by a function.
#[derive(Debug)]
pub struct NodesType<'a>(NodeList<'a>);

impl<'a> NodesType<'a> {
    /// Extract the inner [`NodeList`]
    pub fn into_inner(self) -> NodeList<'a> {
        self.0
    }
}

impl<'a> From<NodeList<'a>> for NodesType<'a> {
    fn from(value: NodeList<'a>) -> Self {
        Self(value)
    }
}

impl<'a> From<Vec<&'a Value>> for NodesType<'a> {
    fn from(values: Vec<&'a Value>) -> Self {
        Self(values.into())
    }
}

impl<'a> TryFrom<PathType<'a>> for NodesType<'a> {
    type Error = ConversionError;

    fn try_from(value: PathType<'a>) -> Result<Self, Self::Error> {
        match value {
            PathType::Nodes(nl) => Ok(nl.into()),
            PathType::Node(n) => Ok(vec![n].into()),
            PathType::Nothing => Ok(Vec::new().into()),
            PathType::Value(_) => Err(ConversionError::LiteralToNodes),
            PathType::Logical(_) => Err(ConversionError::IncompatibleTypes {
                from: FunctionType::Logical,
                to: FunctionType::Nodes,
            }),
        }
    }
}

/// JSONPath type representing `LogicalTrue` or `LogicalFalse`
///
/// Distinct from JSON `true` and `false`, though coercible for display.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    /// True
    True,
    /// False
    #[default]
    False,
}

impl<'a> TryFrom<PathType<'a>> for LogicalType {
    type Error = ConversionError;

    fn try_from(value: PathType<'a>) -> Result<Self, Self::Error> {
        match value {
            PathType::Nodes(nl) => Ok((!nl.is_empty()).into()),
            PathType::Node(_) => Ok(Self::True),
            PathType::Nothing => Ok(Self::False),
            PathType::Logical(l) => Ok(l),
            PathType::Value(_) => Err(ConversionError::IncompatibleTypes {
                from: FunctionType::Value,
                to: FunctionType::Logical,
            }),
        }
    }
}

impl From<LogicalType> for bool {
    fn from(value: LogicalType) -> Self {
        matches!(value, LogicalType::True)
    }
}

impl From<bool> for LogicalType {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

/// JSONPath type representing a JSON value or Nothing
///
/// *Nothing* denotes the absence of a value and is distinct from JSON `null` and from every other
/// JSON value.
#[derive(Debug)]
pub enum ValueType<'a> {
    /// A value produced by a literal in the query, or constructed by a function
    Value(Value),
    /// A reference to a location in the JSON object being queried, i.e., the result of a singular
    /// query
    Node(&'a Value),
    /// The absence of a value
    Nothing,
}

impl<'a> ValueType<'a> {
    /// Convert to a reference of a [`serde_json::Value`] if possible
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ValueType::Value(v) => Some(v),
            ValueType::Node(v) => Some(v),
            ValueType::Nothing => None,
        }
    }

    /// Check if this `ValueType` is Nothing
    pub fn is_nothing(&self) -> bool {
        matches!(self, ValueType::Nothing)
    }
}

impl<'a> TryFrom<PathType<'a>> for ValueType<'a> {
    type Error = ConversionError;

    fn try_from(value: PathType<'a>) -> Result<Self, Self::Error> {
        match value {
            PathType::Value(v) => Ok(Self::Value(v)),
            PathType::Node(n) => Ok(Self::Node(n)),
            PathType::Nothing => Ok(Self::Nothing),
            PathType::Nodes(_) => Err(ConversionError::IncompatibleTypes {
                from: FunctionType::Nodes,
                to: FunctionType::Value,
            }),
            PathType::Logical(_) => Err(ConversionError::IncompatibleTypes {
                from: FunctionType::Logical,
                to: FunctionType::Value,
            }),
        }
    }
}

impl<'a, T> From<T> for ValueType<'a>
where
    T: Into<Value>,
{
    fn from(value: T) -> Self {
        Self::Value(value.into())
    }
}

/// The runtime union of the JSONPath function type system
///
/// Function evaluators receive their arguments and produce their result through this type. The
/// parser guarantees, through its static type checks, that every conversion a well-formed query
/// performs on it succeeds.
#[derive(Debug)]
pub enum PathType<'a> {
    /// A nodelist
    Nodes(NodeList<'a>),
    /// A logical true or false
    Logical(LogicalType),
    /// A node borrowed from the queried document
    Node(&'a Value),
    /// An owned JSON value
    Value(Value),
    /// The absence of a value
    Nothing,
}

impl<'a> From<NodesType<'a>> for PathType<'a> {
    fn from(value: NodesType<'a>) -> Self {
        Self::Nodes(value.0)
    }
}

impl<'a> From<ValueType<'a>> for PathType<'a> {
    fn from(value: ValueType<'a>) -> Self {
        match value {
            ValueType::Value(v) => Self::Value(v),
            ValueType::Node(n) => Self::Node(n),
            ValueType::Nothing => Self::Nothing,
        }
    }
}

impl<'a> From<LogicalType> for PathType<'a> {
    fn from(value: LogicalType) -> Self {
        Self::Logical(value)
    }
}

/// Error used to convey conversions between incompatible JSONPath types
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Cannot convert `from` into `to`
    #[error("attempted to convert {from} to {to}")]
    IncompatibleTypes {
        /// The type being converted from
        from: FunctionType,
        /// The type being converted to
        to: FunctionType,
    },
    /// Literal values can not be considered nodes
    #[error("cannot use a literal value in place of NodesType")]
    LiteralToNodes,
}

/// The evaluation callback of a [`FunctionExtension`]
///
/// Receives one runtime value per declared parameter, in order.
pub type FunctionEvaluator =
    Arc<dyn for<'a> Fn(Vec<PathType<'a>>) -> PathType<'a> + Send + Sync>;

/// A function extension usable in JSONPath filter expressions
///
/// Extensions are registered on a [`QueryEnv`][crate::env::QueryEnv] and resolved by name when a
/// query is parsed. The evaluator must return a value whose runtime kind matches the declared
/// `result_type`; results of any other kind degrade to `false`/Nothing during evaluation.
#[derive(Clone)]
pub struct FunctionExtension {
    name: String,
    parameter_types: Vec<FunctionType>,
    result_type: FunctionType,
    evaluator: FunctionEvaluator,
}

impl FunctionExtension {
    /// Create a new function extension
    pub fn new(
        name: impl Into<String>,
        parameter_types: Vec<FunctionType>,
        result_type: FunctionType,
        evaluator: FunctionEvaluator,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_types,
            result_type,
            evaluator,
        }
    }

    /// The name the function is invoked with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parameter types, in order
    pub fn parameter_types(&self) -> &[FunctionType] {
        &self.parameter_types
    }

    /// The declared result type
    pub fn result_type(&self) -> FunctionType {
        self.result_type
    }

    pub(crate) fn call<'a>(&self, args: Vec<PathType<'a>>) -> PathType<'a> {
        (self.evaluator)(args)
    }
}

impl std::fmt::Debug for FunctionExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionExtension")
            .field("name", &self.name)
            .field("parameter_types", &self.parameter_types)
            .field("result_type", &self.result_type)
            .finish_non_exhaustive()
    }
}

impl PartialEq for FunctionExtension {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.parameter_types == other.parameter_types
            && self.result_type == other.result_type
    }
}

/// A function call in a filter expression
///
/// Holds a shared, read-only reference to the registered extension it resolved to.
#[derive(Debug, Clone)]
pub struct FunctionExpr {
    ext: Arc<FunctionExtension>,
    args: Vec<FunctionArg>,
}

impl FunctionExpr {
    /// Create a function expression from a resolved extension and its arguments
    ///
    /// The arguments are not type-checked here; the parser performs those checks for query
    /// strings, and direct construction leaves them to the caller.
    pub fn new(ext: Arc<FunctionExtension>, args: Vec<FunctionArg>) -> Self {
        Self { ext, args }
    }

    /// The extension this call resolved to
    pub fn extension(&self) -> &Arc<FunctionExtension> {
        &self.ext
    }

    /// The call's arguments
    pub fn args(&self) -> &[FunctionArg] {
        &self.args
    }

    /// The name of the called function
    pub fn name(&self) -> &str {
        self.ext.name()
    }

    /// The declared result type of the called function
    pub fn result_type(&self) -> FunctionType {
        self.ext.result_type()
    }

    /// Evaluate the function call against the current and root nodes
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Evaluate Function Expr", level = "trace", parent = None, ret))]
    pub fn evaluate<'a, 'b: 'a>(&'a self, current: &'b Value, root: &'b Value) -> PathType<'a> {
        let args = self
            .args
            .iter()
            .map(|a| a.evaluate(current, root))
            .collect();
        self.ext.call(args)
    }
}

impl PartialEq for FunctionExpr {
    fn eq(&self, other: &Self) -> bool {
        *self.ext == *other.ext && self.args == other.args
    }
}

impl std::fmt::Display for FunctionExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{name}(", name = self.name())?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

impl TestFilter for FunctionExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Function Expr", level = "trace", parent = None, ret))]
    fn test_filter<'b>(&self, current: &'b Value, root: &'b Value) -> bool {
        match self.ext.result_type() {
            FunctionType::Logical => {
                matches!(
                    self.evaluate(current, root),
                    PathType::Logical(LogicalType::True)
                )
            }
            FunctionType::Nodes => match self.evaluate(current, root) {
                PathType::Nodes(nl) => !nl.is_empty(),
                _ => false,
            },
            // The parser rejects Value-typed functions in test position.
            FunctionType::Value => false,
        }
    }
}

/// An argument to a function call
#[derive(Debug, PartialEq, Clone)]
pub enum FunctionArg {
    /// A literal JSON value
    Literal(Literal),
    /// A singular query
    SingularQuery(SingularQuery),
    /// An embedded, non-singular query
    Query(Query),
    /// A logical expression
    LogicalExpr(LogicalExpr),
    /// A nested function call
    FunctionExpr(FunctionExpr),
}

impl std::fmt::Display for FunctionArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionArg::Literal(lit) => write!(f, "{lit}"),
            FunctionArg::SingularQuery(query) => write!(f, "{query}"),
            FunctionArg::Query(query) => write!(f, "{query}"),
            FunctionArg::LogicalExpr(expr) => write!(f, "{expr}"),
            FunctionArg::FunctionExpr(func) => write!(f, "{func}"),
        }
    }
}

impl FunctionArg {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Evaluate Function Arg", level = "trace", parent = None, ret))]
    pub(crate) fn evaluate<'a, 'b: 'a>(&'a self, current: &'b Value, root: &'b Value) -> PathType<'a> {
        match self {
            FunctionArg::Literal(lit) => PathType::Value(lit.into()),
            FunctionArg::SingularQuery(q) => match q.eval_query(current, root) {
                Some(n) => PathType::Node(n),
                None => PathType::Nothing,
            },
            FunctionArg::Query(q) => PathType::Nodes(q.query(current, root).into()),
            FunctionArg::LogicalExpr(l) => {
                PathType::Logical(l.test_filter(current, root).into())
            }
            FunctionArg::FunctionExpr(f) => f.evaluate(current, root),
        }
    }

    /// Does this argument satisfy a parameter declared with the given type
    pub(crate) fn matches_type(&self, parameter: FunctionType) -> bool {
        match (self, parameter) {
            // A singular query produces a single optional node, which converts to all three
            // declared types.
            (FunctionArg::SingularQuery(_), _) => true,
            (FunctionArg::Literal(_), FunctionType::Value) => true,
            (FunctionArg::Query(_), FunctionType::Logical | FunctionType::Nodes) => true,
            (FunctionArg::LogicalExpr(_), FunctionType::Logical) => true,
            (FunctionArg::FunctionExpr(f), FunctionType::Value) => {
                f.result_type() == FunctionType::Value
            }
            (FunctionArg::FunctionExpr(f), FunctionType::Logical) => {
                matches!(f.result_type(), FunctionType::Logical | FunctionType::Nodes)
            }
            (FunctionArg::FunctionExpr(f), FunctionType::Nodes) => {
                f.result_type() == FunctionType::Nodes
            }
            _ => false,
        }
    }

    /// A short description of the argument's own type, for diagnostics
    pub(crate) fn describe_type(&self) -> String {
        match self {
            FunctionArg::Literal(_) => "a literal".to_owned(),
            FunctionArg::SingularQuery(_) => "a singular query".to_owned(),
            FunctionArg::Query(_) => "a non-singular query".to_owned(),
            FunctionArg::LogicalExpr(_) => "a logical expression".to_owned(),
            FunctionArg::FunctionExpr(f) => {
                format!("a function returning {}", f.result_type())
            }
        }
    }
}

/// An error produced when validating a function call at parse time
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FunctionValidationError {
    /// Function name not registered on the query context
    #[error("function name '{name}' is not defined")]
    Undefined {
        /// The name of the function
        name: String,
    },
    /// Mismatch in number of function arguments
    #[error("expected {expected} args, but received {received}")]
    NumberOfArgsMismatch {
        /// Expected number of arguments
        expected: usize,
        /// Received number of arguments
        received: usize,
    },
    /// The type of a received argument does not match the function definition
    #[error("in argument position {position}, expected a type that converts to {expected}, received {received}")]
    MismatchTypeKind {
        /// Expected type
        expected: FunctionType,
        /// Received type
        received: String,
        /// Argument position, starting from 1
        position: usize,
    },
    /// A function with an unsuitable return type was used
    #[error("function with incorrect return type used")]
    IncorrectFunctionReturnType,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{LogicalType, NodesType, PathType, ValueType};

    #[test]
    fn logical_conversions() {
        let v = json!(1);
        let empty: PathType = PathType::Nodes(Vec::new().into());
        let nodes: PathType = PathType::Nodes(vec![&v].into());
        assert_eq!(LogicalType::try_from(empty).unwrap(), LogicalType::False);
        assert_eq!(LogicalType::try_from(nodes).unwrap(), LogicalType::True);
        assert_eq!(
            LogicalType::try_from(PathType::Nothing).unwrap(),
            LogicalType::False,
        );
        assert!(LogicalType::try_from(PathType::Value(json!(true))).is_err());
    }

    #[test]
    fn nodes_conversions() {
        let v = json!(1);
        let node: PathType = PathType::Node(&v);
        assert_eq!(NodesType::try_from(node).unwrap().into_inner().len(), 1);
        assert!(NodesType::try_from(PathType::Nothing)
            .unwrap()
            .into_inner()
            .is_empty());
        assert!(NodesType::try_from(PathType::Value(json!(1))).is_err());
    }

    #[test]
    fn value_conversions() {
        let v = json!("s");
        assert!(ValueType::try_from(PathType::Node(&v)).unwrap().as_value().is_some());
        assert!(ValueType::try_from(PathType::Nothing).unwrap().is_nothing());
        assert!(ValueType::try_from(PathType::Logical(LogicalType::True)).is_err());
    }
}
