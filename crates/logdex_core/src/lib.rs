//! # Logdex Core
//!
//! Secondary-index views over append-only message logs.
//!
//! This crate provides:
//! - Field extraction and index-entry building for incoming messages
//! - Range scans over the order-preserving index keys
//! - A fan-in merge of per-log read streams for full scans
//! - Resolution of index hits back into full messages
//! - A query facade with a pluggable planner and plan explanation
//! - Checkpoint storage and an in-process update feed
//!
//! ## Design Principles
//!
//! - The host owns the logs and the key-value store; the view only reads
//!   logs and writes index entries
//! - Every stream is pull-based and stops work when dropped
//! - Errors are propagated verbatim; only validator rejections are silent
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use logdex_core::{
//!     FieldFilter, IndexDefinition, InMemoryLogStore, LogView, PathSpec, QueryRequest,
//!     ViewConfig,
//! };
//! use logdex_codec::Value;
//! use logdex_storage::InMemoryKvStore;
//!
//! let logs = Arc::new(InMemoryLogStore::new());
//! let view = LogView::new(Arc::new(InMemoryKvStore::new()), ViewConfig::default())
//!     .with_indexes([IndexDefinition::new("author", PathSpec::field(["author"]))])
//!     .unwrap();
//!
//! let log = logs.create_log("L1");
//! let batch = vec![
//!     log.append(Value::object([("author", Value::from("alice"))])),
//!     log.append(Value::object([("author", Value::from("bob"))])),
//! ];
//! view.index(&batch).unwrap();
//! view.notify_indexed(&batch);
//!
//! let request = QueryRequest::filter(vec![FieldFilter::eq(["author"], Value::from("bob"))]);
//! assert_eq!(
//!     view.explain_query(&request).unwrap().to_string(),
//!     "index range \"author\" [\"bob\"]..=[\"bob\"]*; filter author = \"bob\""
//! );
//! let hits: Vec<_> = view.query(logs, &request).unwrap().collect();
//! assert_eq!(hits.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod checkpoint;
mod config;
mod error;
mod feed;
mod index;
mod log;
mod merge;
mod query;
mod resolve;
mod scan;
mod types;
mod view;

pub use checkpoint::{fetch_checkpoint, store_checkpoint, CHECKPOINT_KEY};
pub use config::ViewConfig;
pub use error::{CoreError, CoreResult};
pub use feed::{Subscription, UpdateFeed, ViewEvent};
pub use index::{
    build_ops, lookup, AcceptAll, IndexDefinition, IndexEntry, IndexRegistry, PathSpec, PathStep,
    Validator, RESERVED_PREFIX,
};
pub use log::{InMemoryLog, InMemoryLogStore, LogHandle, LogStore, LogStream, ReadOptions};
pub use merge::{FanIn, Source};
pub use query::{
    AccessPath, FieldFilter, FieldPlanner, FilterOp, QueryPlan, QueryPlanner, QueryRequest,
    QueryStream,
};
pub use resolve::HitResolver;
pub use scan::{IndexHit, IndexScan, QueryBounds};
pub use types::{LogId, Message, MessageId};
pub use view::LogView;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
