//! In-memory logs.

use super::{LogHandle, LogStore, LogStream, ReadOptions};
use crate::error::CoreResult;
use crate::types::{LogId, Message};
use logdex_codec::Value;
use parking_lot::{Condvar, Mutex, RwLock};
use std::sync::Arc;

/// An append-only log held in memory.
///
/// Sequences start at 0 and increase by one per append. Read streams pull
/// one entry per `next` and therefore see entries appended after they
/// were opened.
#[derive(Debug)]
pub struct InMemoryLog {
    id: LogId,
    entries: Arc<RwLock<Vec<Value>>>,
}

impl InMemoryLog {
    /// Creates an empty log.
    pub fn new(id: impl Into<LogId>) -> Self {
        Self {
            id: id.into(),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Appends content and returns the stored message.
    pub fn append(&self, content: Value) -> Message {
        let mut entries = self.entries.write();
        let sequence = entries.len() as u64;
        entries.push(content.clone());
        Message::new(self.id.clone(), sequence, content)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.entries.read().len() as u64
    }

    /// Returns true if the log has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every entry at or after `len`.
    ///
    /// Index entries pointing past the new end become stale.
    pub fn truncate(&self, len: u64) {
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        self.entries.write().truncate(len);
    }
}

impl LogHandle for InMemoryLog {
    fn id(&self) -> &LogId {
        &self.id
    }

    fn read_stream(&self, options: &ReadOptions) -> CoreResult<LogStream> {
        Ok(Box::new(MemoryLogStream {
            id: self.id.clone(),
            entries: Arc::clone(&self.entries),
            next: options.start,
            remaining: options.limit,
        }))
    }

    fn read_at(&self, sequence: u64) -> CoreResult<Option<Value>> {
        let entries = self.entries.read();
        Ok(usize::try_from(sequence)
            .ok()
            .and_then(|i| entries.get(i))
            .cloned())
    }
}

struct MemoryLogStream {
    id: LogId,
    entries: Arc<RwLock<Vec<Value>>>,
    next: u64,
    remaining: Option<usize>,
}

impl Iterator for MemoryLogStream {
    type Item = CoreResult<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        let content = {
            let entries = self.entries.read();
            entries.get(usize::try_from(self.next).ok()?)?.clone()
        };
        let message = Message::new(self.id.clone(), self.next, content);
        self.next += 1;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(Ok(message))
    }
}

/// A set of in-memory logs with a readiness gate.
///
/// # Example
///
/// ```rust
/// use logdex_core::{InMemoryLogStore, LogStore};
/// use logdex_codec::Value;
///
/// let store = InMemoryLogStore::new();
/// let log = store.create_log("L1");
/// let msg = log.append(Value::from("hello"));
/// assert_eq!(msg.sequence, 0);
/// assert_eq!(store.logs().len(), 1);
/// ```
#[derive(Debug)]
pub struct InMemoryLogStore {
    logs: RwLock<Vec<Arc<InMemoryLog>>>,
    ready: Mutex<bool>,
    ready_signal: Condvar,
}

impl InMemoryLogStore {
    /// Creates an empty store that is ready immediately.
    #[must_use]
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(Vec::new()),
            ready: Mutex::new(true),
            ready_signal: Condvar::new(),
        }
    }

    /// Creates an empty store whose reads wait for [`Self::set_ready`].
    #[must_use]
    pub fn pending() -> Self {
        let store = Self::new();
        *store.ready.lock() = false;
        store
    }

    /// Returns the log with this identifier, creating it if needed.
    pub fn create_log(&self, id: impl Into<LogId>) -> Arc<InMemoryLog> {
        let id = id.into();
        let mut logs = self.logs.write();
        if let Some(existing) = logs.iter().find(|log| log.id == id) {
            return Arc::clone(existing);
        }
        let log = Arc::new(InMemoryLog::new(id));
        logs.push(Arc::clone(&log));
        log
    }

    /// Returns the concrete log with this identifier.
    pub fn get(&self, id: &LogId) -> Option<Arc<InMemoryLog>> {
        self.logs.read().iter().find(|log| &log.id == id).cloned()
    }

    /// Opens or closes the readiness gate.
    pub fn set_ready(&self, ready: bool) {
        *self.ready.lock() = ready;
        if ready {
            self.ready_signal.notify_all();
        }
    }
}

impl Default for InMemoryLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStore for InMemoryLogStore {
    fn logs(&self) -> Vec<Arc<dyn LogHandle>> {
        self.logs
            .read()
            .iter()
            .map(|log| Arc::clone(log) as Arc<dyn LogHandle>)
            .collect()
    }

    fn log(&self, id: &LogId) -> Option<Arc<dyn LogHandle>> {
        self.get(id).map(|log| log as Arc<dyn LogHandle>)
    }

    fn ready(&self) -> CoreResult<()> {
        let mut ready = self.ready.lock();
        while !*ready {
            self.ready_signal.wait(&mut ready);
        }
        Ok(())
    }
}
