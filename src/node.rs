//! Nodelists: the results of JSONPath queries

use serde::Serialize;
use serde_json::Value;

use crate::spec::functions::ValueType;

/// The ordered sequence of nodes a query selected
///
/// Nodes are borrowed from the [`serde_json::Value`] the query ran against, appear in the order
/// the selectors produced them, and are never deduplicated — `$[0, 0]` over a one-element array
/// selects that element twice, and `count()` sees both.
///
/// A `NodeList` dereferences to a slice of nodes, so the usual slice API (`len`, `is_empty`,
/// `iter`, indexing) applies directly:
///
/// ```rust
/// # use serde_json::json;
/// # use jsonpath_query::JsonPath;
/// # fn main() -> Result<(), jsonpath_query::ParseError> {
/// let readings = json!({"sensors": [{"t": 21.0}, {"t": 22.5}]});
/// let nodes = JsonPath::parse("$.sensors[*].t")?.query(&readings);
/// assert_eq!(nodes.len(), 2);
/// assert_eq!(nodes[1], &json!(22.5));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Eq, PartialEq, Serialize, Clone)]
#[serde(transparent)]
pub struct NodeList<'a> {
    pub(crate) nodes: Vec<&'a Value>,
}

impl<'a> NodeList<'a> {
    /// Take ownership of the selected nodes as a `Vec`
    pub fn all(self) -> Vec<&'a Value> {
        self.nodes
    }

    /// Collapse to a single value, or *Nothing*
    ///
    /// This is the conversion the `value()` function extension applies to its argument: a
    /// one-node list yields its node, any other length yields [`ValueType::Nothing`].
    pub fn as_value(&self) -> ValueType<'a> {
        match self.nodes.as_slice() {
            [node] => ValueType::Node(*node),
            _ => ValueType::Nothing,
        }
    }

    /// The selected node, when the query selected exactly one
    ///
    /// Use this for queries that must resolve to one location, such as singular queries or
    /// lookups of a required field.
    ///
    /// ```rust
    /// # use serde_json::json;
    /// # use jsonpath_query::{JsonPath, SingleNodeError};
    /// # fn main() -> Result<(), jsonpath_query::ParseError> {
    /// let inventory = json!({"bikes": [{"id": "b1"}, {"id": "b2"}]});
    /// let first = JsonPath::parse("$.bikes[0].id")?;
    /// assert_eq!(first.query(&inventory).exactly_one(), Ok(&json!("b1")));
    /// let every = JsonPath::parse("$.bikes[*].id")?;
    /// assert_eq!(
    ///     every.query(&inventory).exactly_one(),
    ///     Err(SingleNodeError::TooMany(2)),
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn exactly_one(&self) -> Result<&'a Value, SingleNodeError> {
        match self.nodes.as_slice() {
            [node] => Ok(*node),
            [] => Err(SingleNodeError::Empty),
            more => Err(SingleNodeError::TooMany(more.len())),
        }
    }

    /// The selected node, when the query selected one or none
    ///
    /// An empty selection is an expected outcome here (`Ok(None)`); selecting several nodes is
    /// not.
    ///
    /// ```rust
    /// # use serde_json::json;
    /// # use jsonpath_query::JsonPath;
    /// # fn main() -> Result<(), jsonpath_query::ParseError> {
    /// let inventory = json!({"bikes": [{"id": "b1"}]});
    /// let path = JsonPath::parse("$.bikes[1].id")?;
    /// assert_eq!(path.query(&inventory).at_most_one(), Ok(None));
    /// # Ok(())
    /// # }
    /// ```
    pub fn at_most_one(&self) -> Result<Option<&'a Value>, SingleNodeError> {
        match self.nodes.as_slice() {
            [] => Ok(None),
            [node] => Ok(Some(*node)),
            more => Err(SingleNodeError::TooMany(more.len())),
        }
    }
}

/// Produced when a selection expected to hold a single node holds none, or several
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SingleNodeError {
    /// The query selected no nodes
    #[error("the query selected no nodes")]
    Empty,
    /// The query selected more nodes than expected
    #[error("the query selected {0} nodes where one was expected")]
    TooMany(usize),
}

impl<'a> std::ops::Deref for NodeList<'a> {
    type Target = [&'a Value];

    fn deref(&self) -> &Self::Target {
        &self.nodes
    }
}

impl<'a> From<Vec<&'a Value>> for NodeList<'a> {
    fn from(nodes: Vec<&'a Value>) -> Self {
        Self { nodes }
    }
}

impl<'a> IntoIterator for NodeList<'a> {
    type Item = &'a Value;

    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::spec::functions::ValueType;

    use super::{NodeList, SingleNodeError};

    fn list(nodes: Vec<&Value>) -> NodeList<'_> {
        NodeList::from(nodes)
    }

    #[test]
    fn single_node_extraction() {
        let a = json!("a");
        let b = json!("b");
        assert_eq!(list(vec![&a]).exactly_one(), Ok(&a));
        assert_eq!(list(vec![]).exactly_one(), Err(SingleNodeError::Empty));
        assert_eq!(
            list(vec![&a, &b]).exactly_one(),
            Err(SingleNodeError::TooMany(2)),
        );
        assert_eq!(list(vec![&a]).at_most_one(), Ok(Some(&a)));
        assert_eq!(list(vec![]).at_most_one(), Ok(None));
        assert_eq!(
            list(vec![&a, &b]).at_most_one(),
            Err(SingleNodeError::TooMany(2)),
        );
    }

    #[test]
    fn value_collapse() {
        let a = json!("a");
        assert!(matches!(list(vec![&a]).as_value(), ValueType::Node(_)));
        assert!(list(vec![]).as_value().is_nothing());
        assert!(list(vec![&a, &a]).as_value().is_nothing());
    }

    #[test]
    fn slice_access_through_deref() {
        let a = json!(1);
        let b = json!(2);
        let nodes = list(vec![&a, &b, &a]);
        assert_eq!(nodes.len(), 3);
        assert!(!nodes.is_empty());
        assert_eq!(nodes[2], &a);
        assert_eq!(nodes.iter().filter(|v| ***v == a).count(), 2);
    }
}
