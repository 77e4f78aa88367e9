//! # logdex Storage
//!
//! Ordered key-value store abstraction for logdex.
//!
//! Every index entry and the checkpoint live in one flat, bytewise-ordered
//! key space. Stores are **opaque byte maps** - they do not interpret the
//! keys the codec produces or the values the indexer writes.
//!
//! ## Design Principles
//!
//! - Atomic batched writes (all or nothing)
//! - Inclusive, ascending, pull-based range scans
//! - "Not found" is a value (`Ok(None)`), not an error
//! - Must be `Send + Sync` for concurrent queries
//!
//! ## Available Stores
//!
//! - [`InMemoryKvStore`] - For testing and ephemeral views
//!
//! Hosts with their own persistent store implement [`KvStore`].
//!
//! ## Example
//!
//! ```rust
//! use logdex_storage::{InMemoryKvStore, KvStore};
//!
//! let store = InMemoryKvStore::new();
//! store.put(b"key", b"value").unwrap();
//! assert_eq!(store.get(b"key").unwrap(), Some(b"value".to_vec()));
//! assert_eq!(store.get(b"other").unwrap(), None);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryKvStore, SCAN_PAGE_SIZE};
pub use store::{KeyRange, KvEntry, KvIter, KvStore, WriteOp};
