//! Types representing segments in JSONPath
use serde_json::Value;

use crate::env::QueryEnv;
use crate::error::ParseError;
use crate::spec::query::Queryable;
use crate::spec::selector::Selector;

/// A segment of a JSONPath query
///
/// Shorthand spellings (`.name`, `.*`, `..name`, `..*`) are normalized at parse time into a
/// segment holding a single [`Name`][crate::spec::selector::Name] or wildcard selector; the
/// `Display` implementation re-derives the shorthand form when one exists.
#[derive(Debug, PartialEq, Clone)]
pub struct QuerySegment {
    /// The kind of segment
    pub kind: SegmentKind,
    /// The selectors applied by this segment
    pub selectors: Vec<Selector>,
}

/// The kind of query segment
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SegmentKind {
    /// A child segment, addressing the direct children of the preceding segment's nodes
    Child,
    /// A descendant segment, addressing those nodes and all of their descendants
    Descendant,
}

impl QuerySegment {
    /// Make a child segment from selectors
    pub fn child(selectors: Vec<Selector>) -> Self {
        Self {
            kind: SegmentKind::Child,
            selectors,
        }
    }

    /// Make a descendant segment from selectors
    pub fn descendant(selectors: Vec<Selector>) -> Self {
        Self {
            kind: SegmentKind::Descendant,
            selectors,
        }
    }

    /// Is this a normal child segment
    pub fn is_child(&self) -> bool {
        matches!(self.kind, SegmentKind::Child)
    }

    /// Is this a recursive descent segment
    pub fn is_descendant(&self) -> bool {
        !self.is_child()
    }

    /// Does this segment extract at most a single node
    pub fn is_singular(&self) -> bool {
        self.is_child()
            && matches!(self.selectors.as_slice(), [s] if s.is_singular())
    }

    /// Parse a standalone segment, using the default query environment
    ///
    /// The entire input must be consumed.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        crate::parser::parse_segment_str(input, &crate::env::DEFAULT_ENV)
    }

    /// Parse a standalone segment with a custom query environment
    pub fn parse_with(input: &str, env: &QueryEnv) -> Result<Self, ParseError> {
        crate::parser::parse_segment_str(input, env)
    }

    /// Like [`parse`][Self::parse], but maps failure to `None`
    pub fn try_parse(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    /// Like [`parse_with`][Self::parse_with], but maps failure to `None`
    pub fn try_parse_with(input: &str, env: &QueryEnv) -> Option<Self> {
        Self::parse_with(input, env).ok()
    }

    /// Evaluate this segment against an input nodelist
    ///
    /// Child segments apply selectors in source order across the whole input list (selectors
    /// outer, nodes inner); descendant segments visit each input node and its descendants
    /// pre-order, applying every selector to each visited node.
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Evaluate Segment", level = "trace", parent = None, ret))]
    pub fn evaluate<'b>(&self, nodes: &[&'b Value], root: &'b Value) -> Vec<&'b Value> {
        let mut result = Vec::new();
        match self.kind {
            SegmentKind::Child => {
                for selector in &self.selectors {
                    for node in nodes {
                        result.append(&mut selector.query(node, root));
                    }
                }
            }
            SegmentKind::Descendant => {
                for node in nodes {
                    descend(&self.selectors, node, root, &mut result);
                }
            }
        }
        result
    }
}

/// Apply every selector to `node`, then to each of its descendants in pre-order
fn descend<'b>(
    selectors: &[Selector],
    node: &'b Value,
    root: &'b Value,
    result: &mut Vec<&'b Value>,
) {
    for selector in selectors {
        result.append(&mut selector.query(node, root));
    }
    if let Some(list) = node.as_array() {
        for v in list {
            descend(selectors, v, root, result);
        }
    } else if let Some(obj) = node.as_object() {
        for (_, v) in obj {
            descend(selectors, v, root, result);
        }
    }
}

impl std::fmt::Display for QuerySegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shorthand_prefix = match self.kind {
            SegmentKind::Child => ".",
            SegmentKind::Descendant => "..",
        };
        match self.selectors.as_slice() {
            [Selector::Name(name)] if name.has_shorthand_form() => {
                return write!(f, "{shorthand_prefix}{name}", name = name.as_str());
            }
            [Selector::Wildcard] => return write!(f, "{shorthand_prefix}*"),
            _ => {}
        }
        if self.is_descendant() {
            write!(f, "..")?;
        }
        write!(f, "[")?;
        for (i, s) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{s}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::spec::selector::{Index, Name, Selector};

    use super::QuerySegment;

    #[test]
    fn child_segments_apply_selectors_outer() {
        let a = json!({"x": 1});
        let b = json!({"x": 2});
        let root = json!(null);
        let segment = QuerySegment::child(vec![
            Selector::Name(Name::from("x")),
            Selector::Name(Name::from("x")),
        ]);
        // selector-major ordering: first selector over all nodes, then the second
        let nodes = segment.evaluate(&[&a, &b], &root);
        assert_eq!(nodes, vec![&json!(1), &json!(2), &json!(1), &json!(2)]);
    }

    #[test]
    fn descendant_segment_visits_preorder() {
        let value = json!({"a": [1, 2], "b": 3});
        let segment = QuerySegment::descendant(vec![Selector::Wildcard]);
        let nodes = segment.evaluate(&[&value], &value);
        assert_eq!(
            nodes,
            vec![&json!([1, 2]), &json!(3), &json!(1), &json!(2)],
        );
    }

    #[test]
    fn descendant_segment_with_no_selectors_is_a_no_op() {
        let value = json!({"a": [1, 2], "b": 3});
        let segment = QuerySegment::descendant(vec![]);
        assert!(segment.evaluate(&[&value], &value).is_empty());
    }

    #[test]
    fn singular_segments() {
        assert!(QuerySegment::child(vec![Selector::Name(Name::from("a"))]).is_singular());
        assert!(QuerySegment::child(vec![Selector::Index(Index::from(0))]).is_singular());
        assert!(!QuerySegment::child(vec![Selector::Wildcard]).is_singular());
        assert!(!QuerySegment::descendant(vec![Selector::Name(Name::from("a"))]).is_singular());
        assert!(!QuerySegment::child(vec![
            Selector::Name(Name::from("a")),
            Selector::Name(Name::from("b")),
        ])
        .is_singular());
    }

    #[test]
    fn display_shorthand() {
        assert_eq!(
            QuerySegment::child(vec![Selector::Name(Name::from("name"))]).to_string(),
            ".name",
        );
        assert_eq!(
            QuerySegment::descendant(vec![Selector::Wildcard]).to_string(),
            "..*",
        );
        assert_eq!(
            QuerySegment::child(vec![Selector::Name(Name::from("two words"))]).to_string(),
            "['two words']",
        );
        assert_eq!(
            QuerySegment::descendant(vec![
                Selector::Index(Index::from(0)),
                Selector::Wildcard,
            ])
            .to_string(),
            "..[0, *]",
        );
    }
}
