//! Query requests and field filters.

use crate::index::{lookup, PathStep};
use logdex_codec::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Comparison applied to one field.
///
/// Comparisons use [`Value::cmp_key`], the same order the index keys are
/// stored in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Field equals the value.
    Eq(Value),
    /// Field lies within the inclusive bounds. A missing bound is open.
    Range {
        /// Lower bound.
        #[serde(default)]
        gte: Option<Value>,
        /// Upper bound.
        #[serde(default)]
        lte: Option<Value>,
    },
}

impl FilterOp {
    /// Returns true if `value` satisfies the comparison.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FilterOp::Eq(expected) => value.cmp_key(expected) == Ordering::Equal,
            FilterOp::Range { gte, lte } => {
                gte.as_ref()
                    .map_or(true, |low| value.cmp_key(low) != Ordering::Less)
                    && lte
                        .as_ref()
                        .map_or(true, |high| value.cmp_key(high) != Ordering::Greater)
            }
        }
    }

    /// Returns true if some falsy value satisfies the comparison.
    ///
    /// Falsy values are never indexed, so such a filter cannot be answered
    /// from an index alone.
    pub fn admits_falsy(&self) -> bool {
        [
            Value::Null,
            Value::Bool(false),
            Value::Integer(0),
            Value::Float(0.0),
            Value::Text(String::new()),
        ]
        .iter()
        .any(|falsy| self.matches(falsy))
    }
}

/// A predicate on one field of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    /// Field to compare.
    pub path: Vec<PathStep>,
    /// Comparison to apply.
    pub op: FilterOp,
}

impl FieldFilter {
    /// Field equals `value`.
    pub fn eq<S, I>(path: I, value: Value) -> Self
    where
        S: Into<PathStep>,
        I: IntoIterator<Item = S>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            op: FilterOp::Eq(value),
        }
    }

    /// Field lies within `[gte, lte]`.
    pub fn range<S, I>(path: I, gte: Option<Value>, lte: Option<Value>) -> Self
    where
        S: Into<PathStep>,
        I: IntoIterator<Item = S>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            op: FilterOp::Range { gte, lte },
        }
    }

    /// Returns true if `content` has the field and it satisfies the op.
    pub fn matches(&self, content: &Value) -> bool {
        lookup(content, &self.path).is_some_and(|value| self.op.matches(value))
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        match &self.op {
            FilterOp::Eq(value) => write!(f, "{path} = {value}"),
            FilterOp::Range { gte, lte } => {
                if let Some(low) = gte {
                    write!(f, "{low} <= ")?;
                }
                f.write_str(&path)?;
                if let Some(high) = lte {
                    write!(f, " <= {high}")?;
                }
                Ok(())
            }
        }
    }
}

/// A query against a view.
///
/// # Example
///
/// ```rust
/// use logdex_core::{FieldFilter, QueryRequest};
/// use logdex_codec::Value;
///
/// let request: QueryRequest = serde_json::from_str(
///     r#"{"filter": {"filters": [{"path": ["author"], "op": {"eq": "alice"}}], "limit": 5}}"#,
/// )
/// .unwrap();
/// assert_eq!(
///     request,
///     QueryRequest::filter(vec![FieldFilter::eq(["author"], Value::from("alice"))]).with_limit(5)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryRequest {
    /// Direct range over a named index.
    Range {
        /// Index to scan.
        index: String,
        /// Lower bound tuple.
        #[serde(default)]
        gte: Vec<Value>,
        /// Upper bound tuple (prefix bound).
        #[serde(default)]
        lte: Vec<Value>,
        /// Maximum number of results.
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Conjunction of field filters; the planner picks the access path.
    Filter {
        /// Filters that every result satisfies.
        #[serde(default)]
        filters: Vec<FieldFilter>,
        /// Maximum number of results.
        #[serde(default)]
        limit: Option<usize>,
    },
}

impl QueryRequest {
    /// Range request over `index`.
    pub fn range(index: impl Into<String>, gte: Vec<Value>, lte: Vec<Value>) -> Self {
        QueryRequest::Range {
            index: index.into(),
            gte,
            lte,
            limit: None,
        }
    }

    /// Filter request.
    pub fn filter(filters: Vec<FieldFilter>) -> Self {
        QueryRequest::Filter {
            filters,
            limit: None,
        }
    }

    /// Caps the number of results.
    #[must_use]
    pub fn with_limit(mut self, max: usize) -> Self {
        match &mut self {
            QueryRequest::Range { limit, .. } | QueryRequest::Filter { limit, .. } => {
                *limit = Some(max);
            }
        }
        self
    }

    /// Returns the result cap.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        match self {
            QueryRequest::Range { limit, .. } | QueryRequest::Filter { limit, .. } => *limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Value {
        Value::object([
            ("author", Value::from("alice")),
            ("likes", Value::Integer(7)),
            ("draft", Value::Bool(false)),
        ])
    }

    #[test]
    fn eq_filter() {
        assert!(FieldFilter::eq(["author"], Value::from("alice")).matches(&post()));
        assert!(!FieldFilter::eq(["author"], Value::from("bob")).matches(&post()));
        assert!(!FieldFilter::eq(["missing"], Value::Null).matches(&post()));
        assert!(FieldFilter::eq(["draft"], Value::Bool(false)).matches(&post()));
    }

    #[test]
    fn float_and_integer_keys_stay_distinct() {
        assert!(!FieldFilter::eq(["likes"], Value::Float(7.0)).matches(&post()));
        let around = FieldFilter::range(["likes"], Some(Value::Float(7.0)), Some(Value::from(7)));
        assert!(around.matches(&post()));
    }

    #[test]
    fn range_filter() {
        let inside = FieldFilter::range(["likes"], Some(Value::from(5)), Some(Value::from(7)));
        assert!(inside.matches(&post()));
        let below = FieldFilter::range(["likes"], None, Some(Value::from(6)));
        assert!(!below.matches(&post()));
        let open = FieldFilter::range(["likes"], None, None);
        assert!(open.matches(&post()));
    }

    #[test]
    fn falsy_admission() {
        assert!(FilterOp::Eq(Value::Integer(0)).admits_falsy());
        assert!(FilterOp::Eq(Value::Null).admits_falsy());
        assert!(!FilterOp::Eq(Value::from("alice")).admits_falsy());
        assert!(FilterOp::Range {
            gte: Some(Value::from(-5)),
            lte: Some(Value::from(5))
        }
        .admits_falsy());
        assert!(!FilterOp::Range {
            gte: Some(Value::from(1)),
            lte: Some(Value::from(100))
        }
        .admits_falsy());
        // text sorts after numbers, so an open upper end reaches ""
        assert!(FilterOp::Range {
            gte: Some(Value::from(1)),
            lte: None
        }
        .admits_falsy());
        assert!(FilterOp::Range {
            gte: None,
            lte: Some(Value::from("z"))
        }
        .admits_falsy());
        assert!(!FilterOp::Range {
            gte: Some(Value::from("a")),
            lte: Some(Value::from("z"))
        }
        .admits_falsy());
    }

    #[test]
    fn limit_accessors() {
        let request = QueryRequest::range("author", vec![], vec![]);
        assert_eq!(request.limit(), None);
        assert_eq!(request.with_limit(3).limit(), Some(3));
    }

    #[test]
    fn range_request_json() {
        let request: QueryRequest = serde_json::from_str(
            r#"{"range": {"index": "author", "gte": ["alice"], "lte": ["alice"]}}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            QueryRequest::range("author", vec![Value::from("alice")], vec![Value::from("alice")])
        );
    }

    #[test]
    fn filter_display() {
        assert_eq!(
            FieldFilter::eq(["meta", "lang"], Value::from("en")).to_string(),
            "meta.lang = \"en\""
        );
        assert_eq!(
            FieldFilter::range(["likes"], Some(Value::from(1)), None).to_string(),
            "1 <= likes"
        );
    }
}
