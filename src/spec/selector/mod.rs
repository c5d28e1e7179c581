//! Types representing the different selectors in JSONPath
use std::fmt::Write;

use serde_json::Value;

use crate::spec::integer::Integer;
use crate::spec::query::Queryable;

use self::filter::Filter;
use self::slice::Slice;

pub mod filter;
pub mod slice;

/// A JSONPath selector
#[derive(Debug, PartialEq, Clone)]
pub enum Selector {
    /// Select an object key
    Name(Name),
    /// Select all nodes
    ///
    /// For an object, this produces all member values, for an array, all elements.
    Wildcard,
    /// Select an array element by its index
    Index(Index),
    /// Select a slice from an array
    Slice(Slice),
    /// Use a filter expression to select nodes
    Filter(Filter),
}

impl Selector {
    /// Will this selector select at most only a single node
    pub fn is_singular(&self) -> bool {
        matches!(self, Selector::Name(_) | Selector::Index(_))
    }

    /// Parse a standalone selector, using the default query environment
    ///
    /// The entire input must be consumed.
    pub fn parse(input: &str) -> Result<Self, crate::error::ParseError> {
        crate::parser::parse_selector_str(input, &crate::env::DEFAULT_ENV)
    }

    /// Parse a standalone selector with a custom query environment
    pub fn parse_with(
        input: &str,
        env: &crate::env::QueryEnv,
    ) -> Result<Self, crate::error::ParseError> {
        crate::parser::parse_selector_str(input, env)
    }

    /// Like [`parse`][Self::parse], but maps failure to `None`
    pub fn try_parse(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    /// Like [`parse_with`][Self::parse_with], but maps failure to `None`
    pub fn try_parse_with(input: &str, env: &crate::env::QueryEnv) -> Option<Self> {
        Self::parse_with(input, env).ok()
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Name(name) => write!(f, "{name}"),
            Selector::Wildcard => write!(f, "*"),
            Selector::Index(index) => write!(f, "{index}"),
            Selector::Slice(slice) => write!(f, "{slice}"),
            Selector::Filter(filter) => write!(f, "?{filter}"),
        }
    }
}

impl Queryable for Selector {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Selector", level = "trace", parent = None, ret))]
    fn query<'b>(&self, current: &'b Value, root: &'b Value) -> Vec<&'b Value> {
        match self {
            Selector::Name(name) => name.query(current, root),
            Selector::Wildcard => {
                let mut query = Vec::new();
                if let Some(list) = current.as_array() {
                    for v in list {
                        query.push(v);
                    }
                } else if let Some(obj) = current.as_object() {
                    for (_, v) in obj {
                        query.push(v);
                    }
                }
                query
            }
            Selector::Index(index) => index.query(current, root),
            Selector::Slice(slice) => slice.query(current, root),
            Selector::Filter(filter) => filter.query(current, root),
        }
    }
}

/// Select a single JSON object key
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Name(pub String);

impl Name {
    /// Get as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Can this name be spelled with the dot shorthand, i.e., `.name`
    pub fn has_shorthand_form(&self) -> bool {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) if is_name_first(first) => chars.all(is_name_char),
            _ => false,
        }
    }
}

/// Check for `name-first` per RFC 9535, i.e., ALPHA, `_`, or a non-ASCII code point
pub(crate) fn is_name_first(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c >= '\u{80}'
}

/// Check for `name-char` per RFC 9535, i.e., `name-first` plus DIGIT
pub(crate) fn is_name_char(c: char) -> bool {
    is_name_first(c) || c.is_ascii_digit()
}

/// Write `s` as a single-quoted JSONPath string literal
///
/// Escapes use the short forms the grammar defines; remaining control characters fall back to
/// `\uXXXX`.
pub(crate) fn write_string_literal(f: &mut std::fmt::Formatter<'_>, s: &str) -> std::fmt::Result {
    f.write_char('\'')?;
    for c in s.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\u{0008}' => f.write_str("\\b")?,
            '\u{0009}' => f.write_str("\\t")?,
            '\u{000A}' => f.write_str("\\n")?,
            '\u{000C}' => f.write_str("\\f")?,
            '\u{000D}' => f.write_str("\\r")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('\'')
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_string_literal(f, &self.0)
    }
}

impl Queryable for Name {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Name", level = "trace", parent = None, ret))]
    fn query<'b>(&self, current: &'b Value, _root: &'b Value) -> Vec<&'b Value> {
        if let Some(obj) = current.as_object() {
            obj.get(&self.0).into_iter().collect()
        } else {
            vec![]
        }
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// For selecting array elements by their index
///
/// Can use negative indices to index from the end of an array
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Index(pub Integer);

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{index}", index = self.0)
    }
}

impl Queryable for Index {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Index", level = "trace", parent = None, ret))]
    fn query<'b>(&self, current: &'b Value, _root: &'b Value) -> Vec<&'b Value> {
        let Some(list) = current.as_array() else {
            return vec![];
        };
        let Ok(len) = i64::try_from(list.len()) else {
            return vec![];
        };
        let index = i64::from(self.0);
        let index = if index < 0 { index + len } else { index };
        if (0..len).contains(&index) {
            usize::try_from(index)
                .ok()
                .and_then(|i| list.get(i))
                .into_iter()
                .collect()
        } else {
            vec![]
        }
    }
}

impl From<i32> for Index {
    fn from(i: i32) -> Self {
        Self(Integer::from(i))
    }
}

impl From<Integer> for Index {
    fn from(i: Integer) -> Self {
        Self(i)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::spec::query::Queryable;

    use super::{Index, Name, Selector};

    #[test]
    fn name_selects_object_member() {
        let value = json!({"a": 1, "b": 2});
        let nodes = Name::from("b").query(&value, &value);
        assert_eq!(nodes, vec![&json!(2)]);
        assert!(Name::from("c").query(&value, &value).is_empty());
        assert!(Name::from("a").query(&json!([1, 2]), &value).is_empty());
    }

    #[test]
    fn index_selects_array_element() {
        let value = json!(["a", "b", "c"]);
        assert_eq!(Index::from(1).query(&value, &value), vec![&json!("b")]);
        assert_eq!(Index::from(-1).query(&value, &value), vec![&json!("c")]);
        assert!(Index::from(3).query(&value, &value).is_empty());
        assert!(Index::from(-4).query(&value, &value).is_empty());
        assert!(Index::from(0).query(&json!({"0": 1}), &value).is_empty());
    }

    #[test]
    fn shorthand_form() {
        assert!(Name::from("thing").has_shorthand_form());
        assert!(Name::from("_thing1").has_shorthand_form());
        assert!(!Name::from("1thing").has_shorthand_form());
        assert!(!Name::from("thing space").has_shorthand_form());
        assert!(!Name::from("").has_shorthand_form());
        assert!(Name::from("Ûñïçôdé").has_shorthand_form());
    }

    #[test]
    fn wildcard_enumerates_children() {
        let value = json!({"a": [1, 2], "b": 3});
        let nodes = Selector::Wildcard.query(&value, &value);
        assert_eq!(nodes, vec![&json!([1, 2]), &json!(3)]);
    }
}
