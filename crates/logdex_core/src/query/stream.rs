//! Plan execution.

use super::planner::{AccessPath, QueryPlan};
use super::request::FieldFilter;
use crate::error::CoreResult;
use crate::log::{LogStore, ReadOptions};
use crate::merge::{FanIn, Source};
use crate::resolve::HitResolver;
use crate::scan::IndexScan;
use crate::types::Message;
use logdex_storage::KvStore;
use std::fmt;
use std::sync::Arc;

type Candidates = Box<dyn Iterator<Item = CoreResult<Message>> + Send>;

/// Pull stream of query results.
///
/// The stream ends after the first error or once the plan's limit is
/// reached. Dropping it early releases the underlying scan and stops any
/// fan-in workers.
pub struct QueryStream {
    candidates: Candidates,
    residual: Vec<FieldFilter>,
    remaining: Option<usize>,
    done: bool,
}

impl QueryStream {
    /// Starts executing `plan`.
    ///
    /// Blocks until `logs` is ready. Index plans then scan `store` and
    /// resolve each hit through `logs`; full scans merge every log's read
    /// stream through a fan-in with `fan_in_buffer` slots.
    ///
    /// # Errors
    ///
    /// Fails if `logs` never becomes ready or the scan or a log read
    /// cannot be opened.
    pub fn open(
        plan: &QueryPlan,
        store: &dyn KvStore,
        logs: Arc<dyn LogStore>,
        fan_in_buffer: usize,
    ) -> CoreResult<Self> {
        logs.ready()?;
        let candidates: Candidates = match &plan.access {
            AccessPath::IndexRange { index, bounds } => {
                let scan = IndexScan::open(store, index, bounds)?;
                let resolver = HitResolver::new(logs);
                Box::new(scan.map(move |hit| {
                    let hit = hit?;
                    resolver.resolve(&hit.id).map_err(|e| {
                        tracing::warn!(id = %hit.id, error = %e, "failed to resolve index hit");
                        e
                    })
                }))
            }
            AccessPath::FullScan => {
                let sources = logs
                    .logs()
                    .iter()
                    .map(|log| log.read_stream(&ReadOptions::all()))
                    .collect::<CoreResult<Vec<Source<Message>>>>()?;
                Box::new(FanIn::new(sources, fan_in_buffer))
            }
        };
        Ok(Self {
            candidates,
            residual: plan.residual.clone(),
            remaining: plan.limit,
            done: false,
        })
    }
}

impl Iterator for QueryStream {
    type Item = CoreResult<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.remaining == Some(0) {
                return None;
            }
            match self.candidates.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(message)) => {
                    if !self.residual.iter().all(|f| f.matches(&message.content)) {
                        continue;
                    }
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    return Some(Ok(message));
                }
            }
        }
    }
}

impl fmt::Debug for QueryStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryStream")
            .field("residual", &self.residual)
            .field("remaining", &self.remaining)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
