//! # Logdex Testkit
//!
//! Test utilities for Logdex.
//!
//! This crate provides:
//! - Test fixtures and a fully wired in-memory view
//! - Property-based test generators using proptest
//! - Cross-crate integration test helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use logdex_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_view() {
//!     with_test_view(scenarios::blog_indexes(), |tv| {
//!         tv.append_indexed("L1", post("alice", &["rust"], 1));
//!         // ... queries
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
