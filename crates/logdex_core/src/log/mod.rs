//! Log-store collaborator.
//!
//! The host owns the append-only logs. The view only needs three things
//! from them: the list of logs, an ordered read stream per log (for full
//! scans) and random access by sequence (for hit resolution).
//!
//! [`InMemoryLogStore`] implements the contract for tests and for hosts
//! that keep their logs in memory.

mod memory;

pub use memory::{InMemoryLog, InMemoryLogStore};

use crate::error::CoreResult;
use crate::types::{LogId, Message};
use logdex_codec::Value;
use std::sync::Arc;

/// An ordered, pull-based read over one log.
pub type LogStream = Box<dyn Iterator<Item = CoreResult<Message>> + Send>;

/// Options for [`LogHandle::read_stream`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// First sequence to read.
    pub start: u64,
    /// Maximum number of messages to read.
    pub limit: Option<usize>,
}

impl ReadOptions {
    /// Reads the whole log.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Starts reading at `start`.
    #[must_use]
    pub const fn starting_at(start: u64) -> Self {
        Self { start, limit: None }
    }

    /// Caps the number of messages read.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One append-only log.
pub trait LogHandle: Send + Sync {
    /// Returns the log's stable identifier.
    fn id(&self) -> &LogId;

    /// Opens an ordered read over the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the read cannot be opened. Failures while
    /// reading are yielded by the stream.
    fn read_stream(&self, options: &ReadOptions) -> CoreResult<LogStream>;

    /// Reads the content stored at `sequence`.
    ///
    /// Returns `Ok(None)` when the log has no entry there.
    ///
    /// # Errors
    ///
    /// Returns an error if the read itself fails.
    fn read_at(&self, sequence: u64) -> CoreResult<Option<Value>>;
}

/// The collection of logs a view indexes.
pub trait LogStore: Send + Sync {
    /// Returns every log currently known.
    fn logs(&self) -> Vec<Arc<dyn LogHandle>>;

    /// Looks up one log by identifier.
    fn log(&self, id: &LogId) -> Option<Arc<dyn LogHandle>> {
        self.logs().into_iter().find(|log| log.id() == id)
    }

    /// Blocks until the store can serve reads.
    ///
    /// The view calls this before opening any read.
    ///
    /// # Errors
    ///
    /// Returns an error if the store will never become ready.
    fn ready(&self) -> CoreResult<()> {
        Ok(())
    }
}
