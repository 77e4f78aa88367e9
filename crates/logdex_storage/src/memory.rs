//! In-memory key-value store.

use crate::error::{StorageError, StorageResult};
use crate::store::{KeyRange, KvEntry, KvIter, KvStore, WriteOp};
use parking_lot::RwLock;
use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Number of entries a scan copies out per lock acquisition.
pub const SCAN_PAGE_SIZE: usize = 64;

type Tree = BTreeMap<Vec<u8>, Vec<u8>>;

/// An in-memory ordered key-value store.
///
/// This store keeps everything in a `BTreeMap` and is suitable for:
/// - Unit and integration tests
/// - Hosts that rebuild their views on every start
///
/// # Thread Safety
///
/// Batches are applied under a single write lock, so concurrent scans see
/// either all of a batch or none of it. Scans copy entries out a page at a
/// time and never hold the lock while the consumer processes them.
///
/// # Example
///
/// ```rust
/// use logdex_storage::{InMemoryKvStore, KeyRange, KvStore, WriteOp};
///
/// let store = InMemoryKvStore::new();
/// store.batch_write(vec![WriteOp::put(*b"a", *b"1"), WriteOp::put(*b"b", *b"2")]).unwrap();
///
/// let keys: Vec<_> = store
///     .range(KeyRange::new(*b"a", *b"b"))
///     .unwrap()
///     .map(|entry| entry.unwrap().0)
///     .collect();
/// assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryKvStore {
    tree: Arc<RwLock<Tree>>,
    closed: Arc<AtomicBool>,
}

impl InMemoryKvStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    /// Returns a copy of every entry in key order.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn entries(&self) -> Vec<KvEntry> {
        self.tree
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.tree.write().clear();
    }

    /// Closes the store. Every later operation fails with
    /// [`StorageError::Closed`], including pulls on open scans.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn check_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

impl KvStore for InMemoryKvStore {
    fn batch_write(&self, ops: Vec<WriteOp>) -> StorageResult<()> {
        self.check_open()?;
        let mut tree = self.tree.write();
        for op in ops {
            match op {
                WriteOp::Put { key, value } => {
                    tree.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    tree.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.check_open()?;
        Ok(self.tree.read().get(key).cloned())
    }

    fn range(&self, range: KeyRange) -> StorageResult<KvIter> {
        self.check_open()?;
        Ok(Box::new(MemoryRangeIter {
            tree: Arc::clone(&self.tree),
            closed: Arc::clone(&self.closed),
            next_start: Bound::Included(range.gte.clone()),
            range,
            page: VecDeque::new(),
            exhausted: false,
        }))
    }
}

/// Paged scan over an [`InMemoryKvStore`].
struct MemoryRangeIter {
    tree: Arc<RwLock<Tree>>,
    closed: Arc<AtomicBool>,
    range: KeyRange,
    /// Where the next page starts.
    next_start: Bound<Vec<u8>>,
    page: VecDeque<KvEntry>,
    exhausted: bool,
}

impl MemoryRangeIter {
    fn fill_page(&mut self) {
        if self.range.gte > self.range.lte {
            self.exhausted = true;
            return;
        }

        let tree = self.tree.read();
        let bounds = (
            self.next_start.clone(),
            Bound::Included(self.range.lte.clone()),
        );
        for (key, value) in tree.range::<Vec<u8>, _>(bounds).take(SCAN_PAGE_SIZE) {
            self.page.push_back((key.clone(), value.clone()));
        }

        match self.page.back() {
            Some((last, _)) if self.page.len() == SCAN_PAGE_SIZE => {
                self.next_start = Bound::Excluded(last.clone());
            }
            _ => self.exhausted = true,
        }
    }
}

impl Iterator for MemoryRangeIter {
    type Item = StorageResult<KvEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page.is_empty() && !self.exhausted {
            if self.closed.load(Ordering::SeqCst) {
                self.exhausted = true;
                return Some(Err(StorageError::Closed));
            }
            self.fill_page();
        }
        self.page.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(iter: KvIter) -> Vec<Vec<u8>> {
        iter.map(|e| e.unwrap().0).collect()
    }

    #[test]
    fn new_is_empty() {
        let store = InMemoryKvStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get(b"missing").unwrap(), None);
    }

    #[test]
    fn put_and_get() {
        let store = InMemoryKvStore::new();
        store.put(b"k", b"v").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn batch_applies_puts_and_deletes() {
        let store = InMemoryKvStore::new();
        store.put(b"gone", b"x").unwrap();
        store
            .batch_write(vec![
                WriteOp::put(*b"a", *b"1"),
                WriteOp::delete(*b"gone"),
                WriteOp::put(*b"b", *b"2"),
            ])
            .unwrap();

        assert_eq!(store.get(b"gone").unwrap(), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn range_is_inclusive_and_ordered() {
        let store = InMemoryKvStore::new();
        store
            .batch_write(vec![
                WriteOp::put(*b"d", *b""),
                WriteOp::put(*b"a", *b""),
                WriteOp::put(*b"c", *b""),
                WriteOp::put(*b"b", *b""),
            ])
            .unwrap();

        let scanned = keys(store.range(KeyRange::new(*b"b", *b"d")).unwrap());
        assert_eq!(scanned, vec![b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]);
    }

    #[test]
    fn inverted_range_is_empty() {
        let store = InMemoryKvStore::new();
        store.put(b"b", b"").unwrap();
        assert!(keys(store.range(KeyRange::new(*b"c", *b"a")).unwrap()).is_empty());
    }

    #[test]
    fn range_spans_multiple_pages() {
        let store = InMemoryKvStore::new();
        let total = SCAN_PAGE_SIZE * 2 + 5;
        let ops = (0..total)
            .map(|i| WriteOp::put((i as u32).to_be_bytes(), Vec::new()))
            .collect();
        store.batch_write(ops).unwrap();

        let scanned = keys(
            store
                .range(KeyRange::new(0u32.to_be_bytes(), u32::MAX.to_be_bytes()))
                .unwrap(),
        );
        assert_eq!(scanned.len(), total);
        assert!(scanned.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn scan_sees_writes_between_pages() {
        let store = InMemoryKvStore::new();
        let ops = (0..SCAN_PAGE_SIZE as u32)
            .map(|i| WriteOp::put((i * 2).to_be_bytes(), Vec::new()))
            .collect();
        store.batch_write(ops).unwrap();

        let mut iter = store
            .range(KeyRange::new(0u32.to_be_bytes(), u32::MAX.to_be_bytes()))
            .unwrap();
        assert!(iter.next().is_some());

        // Lands after the first page
        store.put(&u32::MAX.to_be_bytes(), b"").unwrap();
        assert_eq!(iter.count(), SCAN_PAGE_SIZE);
    }

    #[test]
    fn closed_store_rejects_operations() {
        let store = InMemoryKvStore::new();
        store.close();
        assert!(matches!(store.get(b"k"), Err(StorageError::Closed)));
        assert!(matches!(store.put(b"k", b"v"), Err(StorageError::Closed)));
        assert!(matches!(
            store.range(KeyRange::new(*b"a", *b"z")),
            Err(StorageError::Closed)
        ));
    }

    #[test]
    fn closing_fails_open_scan_on_next_page() {
        let store = InMemoryKvStore::new();
        store.put(b"a", b"").unwrap();
        let mut iter = store.range(KeyRange::new(*b"a", *b"z")).unwrap();
        store.close();

        assert!(matches!(iter.next(), Some(Err(StorageError::Closed))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn clones_share_contents() {
        let store = InMemoryKvStore::new();
        let other = store.clone();
        store.put(b"k", b"v").unwrap();
        assert_eq!(other.get(b"k").unwrap(), Some(b"v".to_vec()));
        other.clear();
        assert!(store.is_empty());
    }

    mod paging {
        use super::*;
        use proptest::prelude::*;

        fn key() -> impl Strategy<Value = Vec<u8>> {
            prop::collection::vec(any::<u8>(), 0..4)
        }

        fn contents() -> impl Strategy<Value = Tree> {
            prop::collection::btree_map(
                prop::collection::vec(any::<u8>(), 1..4),
                prop::collection::vec(any::<u8>(), 0..3),
                SCAN_PAGE_SIZE * 2..SCAN_PAGE_SIZE * 4,
            )
        }

        fn oracle(tree: &Tree, gte: &[u8], lte: &[u8]) -> Vec<KvEntry> {
            if gte > lte {
                return Vec::new();
            }
            tree.range::<[u8], _>((Bound::Included(gte), Bound::Included(lte)))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        }

        fn scan(store: &InMemoryKvStore, gte: &[u8], lte: &[u8]) -> Vec<KvEntry> {
            store
                .range(KeyRange::new(gte, lte))
                .unwrap()
                .map(Result::unwrap)
                .collect()
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn range_matches_ordered_map(tree in contents(), gte in key(), lte in key()) {
                let store = InMemoryKvStore::new();
                store
                    .batch_write(
                        tree.iter()
                            .map(|(k, v)| WriteOp::put(k.clone(), v.clone()))
                            .collect(),
                    )
                    .unwrap();

                prop_assert_eq!(scan(&store, &gte, &lte), oracle(&tree, &gte, &lte));
                // every key sorts inside the widest range
                prop_assert_eq!(scan(&store, &[], &[0xFF; 4]), oracle(&tree, &[], &[0xFF; 4]));
            }
        }
    }
}
