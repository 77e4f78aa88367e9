//! The log view: indexing, querying and notification in one handle.

use crate::checkpoint;
use crate::config::ViewConfig;
use crate::error::CoreResult;
use crate::feed::{Subscription, UpdateFeed, ViewEvent};
use crate::index::{build_ops, AcceptAll, IndexDefinition, IndexRegistry, Validator};
use crate::log::LogStore;
use crate::query::{FieldPlanner, QueryPlan, QueryPlanner, QueryRequest, QueryStream};
use crate::types::Message;
use logdex_storage::KvStore;
use std::fmt;
use std::sync::Arc;

/// A queryable secondary-index view over a set of append-only logs.
///
/// The view owns its index registry, validator, planner and update feed.
/// Index entries and the checkpoint live in the shared key-value store.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use logdex_core::{
///     IndexDefinition, InMemoryLogStore, LogView, PathSpec, QueryRequest, ViewConfig,
/// };
/// use logdex_codec::Value;
/// use logdex_storage::InMemoryKvStore;
///
/// let logs = Arc::new(InMemoryLogStore::new());
/// let view = LogView::new(Arc::new(InMemoryKvStore::new()), ViewConfig::default())
///     .with_indexes([IndexDefinition::new("author", PathSpec::field(["author"]))])
///     .unwrap();
///
/// let msg = logs
///     .create_log("L1")
///     .append(Value::object([("author", Value::from("alice"))]));
/// view.index(&[msg]).unwrap();
///
/// let request = QueryRequest::range("author", vec![Value::from("alice")], vec![Value::from("alice")]);
/// let found: Vec<_> = view.query(logs, &request).unwrap().collect();
/// assert_eq!(found.len(), 1);
/// ```
pub struct LogView {
    store: Arc<dyn KvStore>,
    config: ViewConfig,
    registry: IndexRegistry,
    validator: Box<dyn Validator>,
    planner: Box<dyn QueryPlanner>,
    feed: UpdateFeed,
}

impl LogView {
    /// Creates a view with no indexes that accepts every message.
    pub fn new(store: Arc<dyn KvStore>, config: ViewConfig) -> Self {
        Self {
            store,
            config,
            registry: IndexRegistry::new(),
            validator: Box::new(AcceptAll),
            planner: Box::new(FieldPlanner),
            feed: UpdateFeed::new(),
        }
    }

    /// Registers the static index list.
    ///
    /// Unlike [`Self::add_index`] this broadcasts nothing.
    ///
    /// # Errors
    ///
    /// Returns the first [`crate::CoreError::InvalidDefinition`];
    /// definitions before it stay registered.
    pub fn with_indexes(
        self,
        definitions: impl IntoIterator<Item = IndexDefinition>,
    ) -> CoreResult<Self> {
        for definition in definitions {
            self.registry.register(definition)?;
        }
        Ok(self)
    }

    /// Replaces the validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Replaces the query planner.
    #[must_use]
    pub fn with_planner(mut self, planner: impl QueryPlanner + 'static) -> Self {
        self.planner = Box::new(planner);
        self
    }

    /// Indexes a batch of messages.
    ///
    /// The batch is split into chunks of at most `max_batch` messages.
    /// Each chunk is written atomically; chunks written before a failure
    /// stay written.
    ///
    /// Returns the number of entries written: one per accepted message,
    /// definition and extracted value. Every entry has its own key, so
    /// this is also the number of entries the store gains, except when a
    /// message is indexed again and its entries are rewritten in place.
    ///
    /// # Errors
    ///
    /// Fails on the first chunk that holds an unencodable value or whose
    /// write the store rejects.
    pub fn index(&self, messages: &[Message]) -> CoreResult<usize> {
        let definitions = self.registry.snapshot();
        let mut written = 0;
        for chunk in messages.chunks(self.config.max_batch.max(1)) {
            let ops = build_ops(chunk, self.validator.as_ref(), &definitions)?;
            let count = ops.len();
            if count > 0 {
                self.store.batch_write(ops)?;
            }
            written += count;
        }
        tracing::debug!(messages = messages.len(), entries = written, "indexed messages");
        Ok(written)
    }

    /// Broadcasts messages that were durably indexed.
    ///
    /// Messages the validator rejects are not broadcast.
    pub fn notify_indexed(&self, messages: &[Message]) {
        for message in messages {
            if self.validator.accept(message) {
                self.feed.emit(ViewEvent::Indexed(message.clone()));
            }
        }
    }

    /// Plans and starts a query.
    ///
    /// # Errors
    ///
    /// Fails if planning fails or the first read cannot be opened. Errors
    /// while reading end the returned stream.
    pub fn query(&self, logs: Arc<dyn LogStore>, request: &QueryRequest) -> CoreResult<QueryStream> {
        let plan = self.explain_query(request)?;
        QueryStream::open(&plan, self.store.as_ref(), logs, self.config.fan_in_buffer)
    }

    /// Returns the plan a query would run, without running it.
    ///
    /// # Errors
    ///
    /// Returns the planner's error.
    pub fn explain_query(&self, request: &QueryRequest) -> CoreResult<QueryPlan> {
        self.planner.plan(&self.registry.snapshot(), request)
    }

    /// Registers an index at runtime and broadcasts
    /// [`ViewEvent::IndexAdded`].
    ///
    /// Messages indexed earlier are not back-filled.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidDefinition`]; the registry is
    /// unchanged and nothing is broadcast.
    pub fn add_index(&self, definition: IndexDefinition) -> CoreResult<()> {
        let definition = self.registry.register(definition)?;
        tracing::debug!(name = %definition.name, path = %definition.path, "index added");
        self.feed.emit(ViewEvent::IndexAdded(definition.name.clone()));
        Ok(())
    }

    /// Subscribes to the view's events.
    pub fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }

    /// Cancels a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: u64) -> bool {
        self.feed.unsubscribe(id)
    }

    /// Persists the host's checkpoint token.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn store_checkpoint(&self, token: &[u8]) -> CoreResult<()> {
        checkpoint::store_checkpoint(self.store.as_ref(), token)
    }

    /// Reads the checkpoint token; `None` on first run.
    ///
    /// # Errors
    ///
    /// Propagates store failures and undecodable stored tokens.
    pub fn fetch_checkpoint(&self) -> CoreResult<Option<Vec<u8>>> {
        checkpoint::fetch_checkpoint(self.store.as_ref())
    }

    /// Returns the registered definitions in registration order.
    #[must_use]
    pub fn indexes(&self) -> Vec<Arc<IndexDefinition>> {
        self.registry.snapshot()
    }

    /// Returns the view configuration.
    #[must_use]
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }
}

impl fmt::Debug for LogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogView")
            .field("config", &self.config)
            .field("indexes", &self.registry.len())
            .field("subscribers", &self.feed.subscriber_count())
            .finish_non_exhaustive()
    }
}
