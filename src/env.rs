//! The query environment: function-extension registry and intrinsics
//!
//! A [`QueryEnv`] is the context a query is parsed and evaluated in. It holds the function
//! extensions that filter expressions may call, seeded with the five functions RFC 9535 defines
//! (`length`, `count`, `match`, `search`, and `value`). Extensions registered on an environment
//! are visible to the parser, which resolves call names and type-checks arguments, and to the
//! evaluator, which dispatches through the resolved extension.
//!
//! Object members enumerate in insertion order throughout this crate, via `serde_json`'s
//! `preserve_order` feature.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::spec::functions::{
    FunctionExtension, FunctionType, LogicalType, NodesType, PathType, ValueType,
};

static INTRINSICS: Lazy<HashMap<String, Arc<FunctionExtension>>> = Lazy::new(|| {
    let mut functions = HashMap::new();
    for ext in [
        FunctionExtension::new(
            "length",
            vec![FunctionType::Value],
            FunctionType::Value,
            Arc::new(eval_length),
        ),
        FunctionExtension::new(
            "count",
            vec![FunctionType::Nodes],
            FunctionType::Value,
            Arc::new(eval_count),
        ),
        FunctionExtension::new(
            "match",
            vec![FunctionType::Value, FunctionType::Value],
            FunctionType::Logical,
            Arc::new(eval_match),
        ),
        FunctionExtension::new(
            "search",
            vec![FunctionType::Value, FunctionType::Value],
            FunctionType::Logical,
            Arc::new(eval_search),
        ),
        FunctionExtension::new(
            "value",
            vec![FunctionType::Nodes],
            FunctionType::Value,
            Arc::new(eval_value),
        ),
    ] {
        functions.insert(ext.name().to_owned(), Arc::new(ext));
    }
    functions
});

pub(crate) static DEFAULT_ENV: Lazy<QueryEnv> = Lazy::new(QueryEnv::new);

/// The function extensions defined by RFC 9535, pre-registered on every default [`QueryEnv`]
pub fn intrinsic_functions() -> Vec<Arc<FunctionExtension>> {
    INTRINSICS.values().cloned().collect()
}

/// The context queries are parsed and evaluated in
///
/// Cheap to clone; registered extensions are shared. A `QueryEnv` is immutable while a parse or
/// evaluation is running and may therefore be shared freely across threads.
#[derive(Debug, Clone)]
pub struct QueryEnv {
    functions: HashMap<String, Arc<FunctionExtension>>,
}

impl Default for QueryEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEnv {
    /// An environment holding only the intrinsic functions
    pub fn new() -> Self {
        Self {
            functions: INTRINSICS.clone(),
        }
    }

    /// Register a function extension, replacing any previous extension of the same name
    pub fn register(&mut self, ext: FunctionExtension) {
        self.functions.insert(ext.name().to_owned(), Arc::new(ext));
    }

    /// Builder-style [`register`][Self::register]
    pub fn with_function(mut self, ext: FunctionExtension) -> Self {
        self.register(ext);
        self
    }

    /// Look up a function extension by name
    pub fn function(&self, name: &str) -> Option<&Arc<FunctionExtension>> {
        self.functions.get(name)
    }

    /// Iterate the names of all registered functions
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl From<Vec<FunctionExtension>> for QueryEnv {
    fn from(extensions: Vec<FunctionExtension>) -> Self {
        extensions.into_iter().collect()
    }
}

impl From<HashMap<String, FunctionExtension>> for QueryEnv {
    fn from(extensions: HashMap<String, FunctionExtension>) -> Self {
        let mut env = Self::new();
        for (name, ext) in extensions {
            env.functions.insert(name, Arc::new(ext));
        }
        env
    }
}

impl FromIterator<FunctionExtension> for QueryEnv {
    fn from_iter<T: IntoIterator<Item = FunctionExtension>>(iter: T) -> Self {
        let mut env = Self::new();
        env.extend(iter);
        env
    }
}

impl Extend<FunctionExtension> for QueryEnv {
    fn extend<T: IntoIterator<Item = FunctionExtension>>(&mut self, iter: T) {
        for ext in iter {
            self.register(ext);
        }
    }
}

fn eval_length<'a>(args: Vec<PathType<'a>>) -> PathType<'a> {
    let Some(arg) = args.into_iter().next() else {
        return PathType::Nothing;
    };
    let Ok(value) = ValueType::try_from(arg) else {
        return PathType::Nothing;
    };
    match value.as_value() {
        // Unicode scalar values, not bytes or UTF-16 code units
        Some(Value::String(s)) => PathType::Value(s.chars().count().into()),
        Some(Value::Array(a)) => PathType::Value(a.len().into()),
        Some(Value::Object(o)) => PathType::Value(o.len().into()),
        _ => PathType::Nothing,
    }
}

fn eval_count<'a>(args: Vec<PathType<'a>>) -> PathType<'a> {
    let Some(arg) = args.into_iter().next() else {
        return PathType::Nothing;
    };
    match NodesType::try_from(arg) {
        Ok(nodes) => PathType::Value(nodes.into_inner().len().into()),
        Err(_) => PathType::Nothing,
    }
}

fn eval_match<'a>(args: Vec<PathType<'a>>) -> PathType<'a> {
    PathType::Logical(LogicalType::from(regex_test(args, true)))
}

fn eval_search<'a>(args: Vec<PathType<'a>>) -> PathType<'a> {
    PathType::Logical(LogicalType::from(regex_test(args, false)))
}

fn eval_value<'a>(args: Vec<PathType<'a>>) -> PathType<'a> {
    let Some(arg) = args.into_iter().next() else {
        return PathType::Nothing;
    };
    match NodesType::try_from(arg) {
        Ok(nodes) => nodes.into_inner().as_value().into(),
        Err(_) => PathType::Nothing,
    }
}

fn regex_test(args: Vec<PathType<'_>>, full_match: bool) -> bool {
    let mut args = args.into_iter();
    let (Some(target), Some(pattern)) = (args.next(), args.next()) else {
        return false;
    };
    let (Ok(target), Ok(pattern)) = (ValueType::try_from(target), ValueType::try_from(pattern))
    else {
        return false;
    };
    let (Some(Value::String(target)), Some(Value::String(pattern))) =
        (target.as_value(), pattern.as_value())
    else {
        return false;
    };
    let Some(translated) = iregexp_to_regex(pattern, full_match) else {
        return false;
    };
    match Regex::new(&translated) {
        Ok(re) => re.is_match(target),
        Err(_) => false,
    }
}

/// Translate an I-Regexp (RFC 9485) into the `regex` crate's dialect
///
/// In I-Regexp, `.` matches any character except line terminators; the translation rewrites it
/// outside character classes. Whole-string matching is expressed by anchoring. Returns `None`
/// for patterns that are certainly malformed (a trailing backslash); anything else is left to
/// the regex compiler, whose rejection the callers map to `false`.
fn iregexp_to_regex(pattern: &str, full_match: bool) -> Option<String> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    let mut escaped = false;
    let mut in_class = false;
    for c in pattern.chars() {
        if escaped {
            translated.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                translated.push(c);
                escaped = true;
            }
            '[' if !in_class => {
                translated.push(c);
                in_class = true;
            }
            ']' if in_class => {
                translated.push(c);
                in_class = false;
            }
            '.' if !in_class => translated.push_str("[^\\n\\r]"),
            c => translated.push(c),
        }
    }
    if escaped {
        return None;
    }
    if full_match {
        Some(format!("^(?:{translated})$"))
    } else {
        Some(translated)
    }
}
