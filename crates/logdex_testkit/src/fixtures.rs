//! Test fixtures and view helpers.
//!
//! Provides a fully wired in-memory view and common test scenarios.

use logdex_codec::Value;
use logdex_core::{
    IndexDefinition, InMemoryLogStore, LogStore, LogView, Message, PathSpec, QueryRequest,
    QueryStream, ViewConfig,
};
use logdex_storage::InMemoryKvStore;
use serde::Deserialize;
use std::sync::Arc;

/// An in-memory view together with its store and logs.
pub struct TestView {
    /// The view under test.
    pub view: LogView,
    /// Key-value store shared with the view.
    pub kv: InMemoryKvStore,
    /// Logs the view reads from.
    pub logs: Arc<InMemoryLogStore>,
}

impl TestView {
    /// Creates a view with the default configuration.
    pub fn new(indexes: impl IntoIterator<Item = IndexDefinition>) -> Self {
        Self::with_config(ViewConfig::default(), indexes)
    }

    /// Creates a view with a specific configuration.
    pub fn with_config(
        config: ViewConfig,
        indexes: impl IntoIterator<Item = IndexDefinition>,
    ) -> Self {
        let kv = InMemoryKvStore::new();
        let view = LogView::new(Arc::new(kv.clone()), config)
            .with_indexes(indexes)
            .expect("Invalid fixture index definition");
        Self {
            view,
            kv,
            logs: Arc::new(InMemoryLogStore::new()),
        }
    }

    /// Appends content to a log without indexing it.
    pub fn append(&self, log: &str, content: Value) -> Message {
        self.logs.create_log(log).append(content)
    }

    /// Appends, indexes and broadcasts one message.
    pub fn append_indexed(&self, log: &str, content: Value) -> Message {
        let message = self.append(log, content);
        self.index(std::slice::from_ref(&message));
        message
    }

    /// Indexes and broadcasts a batch, as a host would after a log update.
    pub fn index(&self, messages: &[Message]) -> usize {
        let written = self.view.index(messages).expect("Failed to index batch");
        self.view.notify_indexed(messages);
        written
    }

    /// Returns the logs as the trait object the view consumes.
    pub fn log_store(&self) -> Arc<dyn LogStore> {
        self.logs.clone()
    }

    /// Starts a query without consuming it.
    pub fn query_stream(&self, request: &QueryRequest) -> QueryStream {
        self.view
            .query(self.log_store(), request)
            .expect("Failed to start query")
    }

    /// Runs a query and collects every result.
    pub fn query(&self, request: &QueryRequest) -> Vec<Message> {
        self.query_stream(request)
            .map(|m| m.expect("Query stream failed"))
            .collect()
    }

    /// Runs a query and returns the result identifiers in stream order.
    pub fn query_ids(&self, request: &QueryRequest) -> Vec<String> {
        self.query(request)
            .iter()
            .map(|m| m.id().to_string())
            .collect()
    }
}

impl std::ops::Deref for TestView {
    type Target = LogView;

    fn deref(&self) -> &Self::Target {
        &self.view
    }
}

/// Runs a test against a fresh in-memory view.
///
/// # Example
///
/// ```rust
/// use logdex_codec::Value;
/// use logdex_core::{IndexDefinition, PathSpec};
/// use logdex_testkit::with_test_view;
///
/// with_test_view([IndexDefinition::new("author", PathSpec::field(["author"]))], |tv| {
///     tv.append_indexed("L1", Value::object([("author", Value::from("alice"))]));
///     assert_eq!(tv.kv.len(), 1);
/// });
/// ```
pub fn with_test_view<F, R>(indexes: impl IntoIterator<Item = IndexDefinition>, f: F) -> R
where
    F: FnOnce(&TestView) -> R,
{
    let tv = TestView::new(indexes);
    f(&tv)
}

/// Builds blog-post content.
pub fn post(author: &str, tags: &[&str], likes: i64) -> Value {
    Value::object([
        ("author", Value::from(author)),
        (
            "tags",
            Value::Array(tags.iter().map(|t| Value::from(*t)).collect()),
        ),
        ("likes", Value::Integer(likes)),
    ])
}

/// A message to seed, in its JSON form: `{"log": "L1", "content": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Seed {
    /// Log to append to.
    pub log: String,
    /// Message content.
    pub content: Value,
}

/// Parses a JSON array of [`Seed`]s.
pub fn seeds_from_json(json: &str) -> Vec<Seed> {
    serde_json::from_str(json).expect("Invalid seed JSON")
}

/// Common test scenarios.
pub mod scenarios {
    use super::*;

    /// Index definitions used by the blog scenario.
    pub fn blog_indexes() -> Vec<IndexDefinition> {
        vec![
            IndexDefinition::new("by-author", PathSpec::field(["author"])),
            IndexDefinition::new(
                "by-tag",
                PathSpec::alternatives([
                    PathSpec::field(["tags", "0"]),
                    PathSpec::field(["tags", "1"]),
                ]),
            ),
            IndexDefinition::new("by-likes", PathSpec::field(["likes"])),
        ]
    }

    /// A view with `post_count` indexed posts spread over three logs.
    ///
    /// Post `i` is written by `author{i % 4}` into log `L{i % 3}`, tagged
    /// `t{i % 5}` and `t{(i + 1) % 5}`, with `i` likes.
    pub fn blog(post_count: usize) -> TestView {
        let tv = TestView::new(blog_indexes());
        let messages: Vec<Message> = (0..post_count)
            .map(|i| {
                let tags = [format!("t{}", i % 5), format!("t{}", (i + 1) % 5)];
                let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
                tv.append(
                    &format!("L{}", i % 3),
                    post(&format!("author{}", i % 4), &tag_refs, i as i64),
                )
            })
            .collect();
        tv.index(&messages);
        tv
    }
}
