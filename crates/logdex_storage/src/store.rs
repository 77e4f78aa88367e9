//! Key-value store trait definition.

use crate::error::StorageResult;

/// A single write in an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or overwrite `key`.
    Put {
        /// Encoded key.
        key: Vec<u8>,
        /// Stored value.
        value: Vec<u8>,
    },
    /// Remove `key` if present.
    Delete {
        /// Encoded key.
        key: Vec<u8>,
    },
}

impl WriteOp {
    /// Creates a put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Self::Delete { key: key.into() }
    }

    /// Returns the key this operation touches.
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// Inclusive byte-key range for ordered scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    /// Smallest key included.
    pub gte: Vec<u8>,
    /// Largest key included.
    pub lte: Vec<u8>,
}

impl KeyRange {
    /// Creates an inclusive range `[gte, lte]`.
    pub fn new(gte: impl Into<Vec<u8>>, lte: impl Into<Vec<u8>>) -> Self {
        Self {
            gte: gte.into(),
            lte: lte.into(),
        }
    }

    /// Returns true if `key` falls inside the range.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.gte.as_slice() <= key && key <= self.lte.as_slice()
    }
}

/// A key-value pair yielded by a range scan.
pub type KvEntry = (Vec<u8>, Vec<u8>);

/// An ordered, pull-based scan over a key range.
///
/// Dropping the iterator releases whatever the store holds for the scan.
pub type KvIter = Box<dyn Iterator<Item = StorageResult<KvEntry>> + Send>;

/// An ordered key-value store shared by every index and the checkpoint.
///
/// Stores are **opaque byte maps**: they order keys bytewise and do not
/// interpret either keys or values.
///
/// # Invariants
///
/// - `batch_write` applies every operation or none of them
/// - `range` yields entries in ascending bytewise key order
/// - a missing key is `Ok(None)` from `get`, never an error
/// - stores must be `Send + Sync` for concurrent queries and indexing
pub trait KvStore: Send + Sync {
    /// Applies a batch of writes atomically.
    ///
    /// Readers never observe part of a batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the write fails; in
    /// that case no operation from the batch is visible.
    fn batch_write(&self, ops: Vec<WriteOp>) -> StorageResult<()>;

    /// Reads a single key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the read fails.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Writes a single key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the write fails.
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.batch_write(vec![WriteOp::put(key, value)])
    }

    /// Opens an ascending scan over `range` (both bounds inclusive).
    ///
    /// An inverted range (`gte > lte`) yields nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed. Errors during iteration
    /// are yielded by the iterator.
    fn range(&self, range: KeyRange) -> StorageResult<KvIter>;
}
