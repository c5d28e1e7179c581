//! Slice selectors for selecting array slices in JSONPath
use serde_json::Value;

use crate::spec::integer::Integer;
use crate::spec::query::Queryable;

/// A slice selector
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub struct Slice {
    /// The start of the slice
    ///
    /// This can be negative to start the slice from a position relative to the end of the array
    /// being sliced.
    pub start: Option<Integer>,
    /// The end of the slice
    ///
    /// This can be negative to end the slice at a position relative to the end of the array being
    /// sliced.
    pub end: Option<Integer>,
    /// The step of the slice
    ///
    /// This can be negative to step through the array in reverse order.
    pub step: Option<Integer>,
}

impl std::fmt::Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        write!(f, ":")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        if let Some(step) = self.step {
            write!(f, ":{step}")?;
        }
        Ok(())
    }
}

impl Slice {
    /// A slice with no start, end, or step
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slice start
    pub fn with_start(mut self, start: impl Into<Integer>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Set the slice end
    pub fn with_end(mut self, end: impl Into<Integer>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Set the slice step
    pub fn with_step(mut self, step: impl Into<Integer>) -> Self {
        self.step = Some(step.into());
        self
    }
}

fn normalize(index: i64, len: i64) -> i64 {
    if index >= 0 {
        index
    } else {
        len + index
    }
}

impl Queryable for Slice {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Slice", level = "trace", parent = None, ret))]
    fn query<'b>(&self, current: &'b Value, _root: &'b Value) -> Vec<&'b Value> {
        let Some(list) = current.as_array() else {
            return vec![];
        };
        let Ok(len) = i64::try_from(list.len()) else {
            return vec![];
        };
        let step = self.step.map(i64::from).unwrap_or(1);
        if step == 0 {
            return vec![];
        }
        let mut query = Vec::new();
        if step > 0 {
            let start = normalize(self.start.map(i64::from).unwrap_or(0), len);
            let end = normalize(self.end.map(i64::from).unwrap_or(len), len);
            let lower = start.max(0).min(len);
            let upper = end.max(0).min(len);
            let mut i = lower;
            while i < upper {
                if let Some(v) = usize::try_from(i).ok().and_then(|i| list.get(i)) {
                    query.push(v);
                }
                i += step;
            }
        } else {
            let start = normalize(self.start.map(i64::from).unwrap_or(len - 1), len);
            let end = normalize(self.end.map(i64::from).unwrap_or(-len - 1), len);
            let upper = start.min(len - 1).max(-1);
            let lower = end.min(len - 1).max(-1);
            let mut i = upper;
            while i > lower {
                if let Some(v) = usize::try_from(i).ok().and_then(|i| list.get(i)) {
                    query.push(v);
                }
                i += step;
            }
        }
        query
    }
}
