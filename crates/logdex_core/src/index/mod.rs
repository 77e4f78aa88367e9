//! Index definitions and the write path.
//!
//! An index is a name plus a [`PathSpec`]. For every accepted message the
//! builder extracts zero or more values per definition and writes one
//! entry per value. Entries are keyed by `(name, value)` so each index
//! occupies its own ordered key range.
//!
//! # Invariants
//!
//! - Extraction is pure: it only depends on the fields the spec names
//! - Every entry key starts with its index name element
//! - A batch either yields all of its write operations or none

mod builder;
mod definition;
mod entry;
mod path;
mod registry;

pub use builder::{build_ops, AcceptAll, Validator};
pub use definition::{IndexDefinition, RESERVED_PREFIX};
pub use entry::IndexEntry;
pub use path::{lookup, PathSpec, PathStep};
pub use registry::IndexRegistry;
