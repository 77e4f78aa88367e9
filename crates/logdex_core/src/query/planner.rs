//! Query planning.

use super::request::{FieldFilter, FilterOp, QueryRequest};
use crate::error::{CoreError, CoreResult};
use crate::index::IndexDefinition;
use crate::scan::QueryBounds;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How a query reads its candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPath {
    /// Bounded scan of one index, each hit resolved through its log.
    IndexRange {
        /// Index to scan.
        index: IndexDefinition,
        /// Scan bounds.
        bounds: QueryBounds,
    },
    /// Every message of every log, merged.
    FullScan,
}

/// A compiled query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Candidate source.
    pub access: AccessPath,
    /// Filters re-applied to resolved content.
    pub residual: Vec<FieldFilter>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl QueryPlan {
    /// Full scan with no filtering.
    #[must_use]
    pub fn full_scan() -> Self {
        Self {
            access: AccessPath::FullScan,
            residual: Vec::new(),
            limit: None,
        }
    }

    /// Returns true if the plan reads an index.
    #[must_use]
    pub fn uses_index(&self) -> bool {
        matches!(self.access, AccessPath::IndexRange { .. })
    }
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.access {
            AccessPath::IndexRange { index, bounds } => {
                write!(f, "index range {:?} {bounds}", index.name)?;
                if index.exact {
                    f.write_str(" (exact)")?;
                }
            }
            AccessPath::FullScan => f.write_str("full scan")?,
        }
        if !self.residual.is_empty() {
            f.write_str("; filter ")?;
            for (i, filter) in self.residual.iter().enumerate() {
                if i > 0 {
                    f.write_str(" and ")?;
                }
                write!(f, "{filter}")?;
            }
        }
        if let Some(limit) = self.limit {
            write!(f, "; limit {limit}")?;
        }
        Ok(())
    }
}

/// Compiles requests into plans.
///
/// Hosts with their own query language implement this and install it with
/// [`crate::LogView::with_planner`].
pub trait QueryPlanner: Send + Sync {
    /// Plans `request` against the currently registered indexes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be answered.
    fn plan(
        &self,
        indexes: &[Arc<IndexDefinition>],
        request: &QueryRequest,
    ) -> CoreResult<QueryPlan>;
}

/// Default planner: direct index ranges, or one usable index per filter
/// set, falling back to a full scan.
///
/// A filter can use an index when the index's path spec is a single field
/// path equal to the filter's path, the filter does not admit falsy values
/// (those are never indexed), and the index is not `exact` or the filter
/// is an equality. Equality filters are tried before range filters. Every
/// filter is kept as a residual predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldPlanner;

impl FieldPlanner {
    fn index_for(
        indexes: &[Arc<IndexDefinition>],
        filters: &[FieldFilter],
    ) -> Option<(IndexDefinition, QueryBounds)> {
        let equalities = filters.iter().filter(|f| matches!(f.op, FilterOp::Eq(_)));
        let ranges = filters
            .iter()
            .filter(|f| matches!(f.op, FilterOp::Range { .. }));

        equalities.chain(ranges).find_map(|filter| {
            if filter.op.admits_falsy() {
                return None;
            }
            let index = indexes.iter().find(|index| {
                index.path.as_field() == Some(filter.path.as_slice())
                    && (!index.exact || matches!(filter.op, FilterOp::Eq(_)))
            })?;
            let bounds = match &filter.op {
                FilterOp::Eq(value) => QueryBounds::exact(vec![value.clone()]),
                FilterOp::Range { gte, lte } => QueryBounds::range(
                    gte.iter().cloned().collect(),
                    lte.iter().cloned().collect(),
                ),
            };
            Some((IndexDefinition::clone(index), bounds))
        })
    }
}

impl QueryPlanner for FieldPlanner {
    fn plan(
        &self,
        indexes: &[Arc<IndexDefinition>],
        request: &QueryRequest,
    ) -> CoreResult<QueryPlan> {
        let plan = match request {
            QueryRequest::Range {
                index,
                gte,
                lte,
                limit,
            } => {
                let definition = indexes
                    .iter()
                    .find(|d| &d.name == index)
                    .ok_or_else(|| CoreError::UnknownIndex {
                        name: index.clone(),
                    })?;
                if definition.exact && gte != lte {
                    return Err(CoreError::invalid_query(format!(
                        "index {index:?} only supports exact lookups"
                    )));
                }
                QueryPlan {
                    access: AccessPath::IndexRange {
                        index: IndexDefinition::clone(definition),
                        bounds: QueryBounds::range(gte.clone(), lte.clone()),
                    },
                    residual: Vec::new(),
                    limit: *limit,
                }
            }
            QueryRequest::Filter { filters, limit } => {
                let access = match Self::index_for(indexes, filters) {
                    Some((index, bounds)) => AccessPath::IndexRange { index, bounds },
                    None => AccessPath::FullScan,
                };
                QueryPlan {
                    access,
                    residual: filters.clone(),
                    limit: *limit,
                }
            }
        };
        tracing::debug!(%plan, "planned query");
        Ok(plan)
    }
}
