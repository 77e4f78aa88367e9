//! Query facade.
//!
//! A [`QueryRequest`] is compiled by a [`QueryPlanner`] into a
//! [`QueryPlan`], which [`QueryStream`] executes:
//!
//! - index plans scan one index range and resolve every hit through its log
//! - full-scan plans merge every log's read stream through a fan-in
//!
//! Both re-apply the plan's residual filters to resolved content, so an
//! index only narrows the candidates and never decides the result alone.

mod planner;
mod request;
mod stream;

pub use planner::{AccessPath, FieldPlanner, QueryPlan, QueryPlanner};
pub use request::{FieldFilter, FilterOp, QueryRequest};
pub use stream::QueryStream;
