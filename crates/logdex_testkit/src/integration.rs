//! Cross-crate integration test helpers.
//!
//! Provides a harness that tracks what every index should contain and
//! checks the key-value store against it.

use crate::fixtures::TestView;
use logdex_codec::Value;
use logdex_core::{IndexDefinition, IndexEntry, Message, CHECKPOINT_KEY};
use logdex_storage::InMemoryKvStore;
use std::collections::BTreeMap;

/// Decodes every index entry in `kv`, skipping the checkpoint.
///
/// Panics if any stored entry fails to decode.
pub fn index_entries(kv: &InMemoryKvStore) -> Vec<IndexEntry> {
    kv.entries()
        .into_iter()
        .filter(|(key, _)| key.as_slice() != CHECKPOINT_KEY)
        .map(|(key, value)| {
            IndexEntry::decode(&key, &value).expect("Stored entry does not decode")
        })
        .collect()
}

/// Asserts that every stored entry belongs to one of `indexes`.
pub fn assert_entries_registered(kv: &InMemoryKvStore, indexes: &[IndexDefinition]) {
    for entry in index_entries(kv) {
        assert!(
            indexes.iter().any(|d| d.name == entry.index),
            "Entry for unregistered index {:?}",
            entry.index
        );
        assert_eq!(entry.values.len(), 1, "Entry {entry:?} holds a multi-value tuple");
    }
}

/// A test harness that mirrors the expected index contents.
pub struct IntegrationHarness {
    /// The view under test.
    pub tv: TestView,
    definitions: Vec<IndexDefinition>,
    expected: BTreeMap<Vec<u8>, String>,
}

impl IntegrationHarness {
    /// Creates a harness over a fresh in-memory view.
    pub fn new(indexes: Vec<IndexDefinition>) -> Self {
        Self {
            tv: TestView::new(indexes.clone()),
            definitions: indexes,
            expected: BTreeMap::new(),
        }
    }

    /// Appends and indexes content, tracking the entries it should produce.
    pub fn ingest(&mut self, log: &str, content: Value) -> Message {
        let message = self.tv.append_indexed(log, content);
        self.track(&message);
        message
    }

    /// Indexes a batch of already appended messages.
    pub fn ingest_batch(&mut self, messages: &[Message]) {
        self.tv.index(messages);
        for message in messages {
            self.track(message);
        }
    }

    fn track(&mut self, message: &Message) {
        for definition in &self.definitions {
            for (ordinal, value) in (0u32..).zip(definition.path.extract(&message.content)) {
                let entry = IndexEntry::new(definition.name.clone(), value, message.id())
                    .with_ordinal(ordinal);
                let key = entry.key().expect("Tracked value is not key-encodable");
                self.expected.insert(key, message.id().to_string());
            }
        }
    }

    /// Number of entries the indexes should hold.
    pub fn expected_len(&self) -> usize {
        self.expected.len()
    }

    /// Verifies the store holds exactly the tracked entries.
    pub fn verify(&self) {
        let actual: BTreeMap<Vec<u8>, String> = self
            .tv
            .kv
            .entries()
            .into_iter()
            .filter(|(key, _)| key.as_slice() != CHECKPOINT_KEY)
            .map(|(key, value)| {
                let id = String::from_utf8(value).expect("Entry value is not UTF-8");
                (key, id)
            })
            .collect();
        assert_eq!(actual, self.expected, "Index contents diverged");
        assert_entries_registered(&self.tv.kv, &self.definitions);
    }
}
