//! Range scans over one index.

use crate::error::CoreResult;
use crate::index::{IndexDefinition, IndexEntry};
use crate::types::MessageId;
use logdex_codec::{encode_upper_bound, KeyEncoder, Value};
use logdex_storage::{KeyRange, KvIter, KvStore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive value-tuple bounds for an index scan.
///
/// The index name is prepended to both ends when the scan is opened. The
/// upper bound is a prefix bound: every key extending `lte` is included,
/// so empty bounds cover the whole index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryBounds {
    /// Lower bound tuple.
    #[serde(default)]
    pub gte: Vec<Value>,
    /// Upper bound tuple.
    #[serde(default)]
    pub lte: Vec<Value>,
}

impl QueryBounds {
    /// Matches entries equal to `values`.
    pub fn exact(values: Vec<Value>) -> Self {
        Self {
            gte: values.clone(),
            lte: values,
        }
    }

    /// Matches entries between `gte` and `lte`.
    pub fn range(gte: Vec<Value>, lte: Vec<Value>) -> Self {
        Self { gte, lte }
    }

    /// Matches every entry of the index.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    fn key_range(&self, index: &str) -> CoreResult<KeyRange> {
        let name = Value::Text(index.to_string());

        let mut lower = KeyEncoder::new();
        lower.push(&name)?;
        for value in &self.gte {
            lower.push(value)?;
        }

        let mut upper = Vec::with_capacity(self.lte.len() + 1);
        upper.push(name);
        upper.extend(self.lte.iter().cloned());

        Ok(KeyRange::new(lower.into_bytes(), encode_upper_bound(&upper)?))
    }
}

impl fmt::Display for QueryBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tuple = |f: &mut fmt::Formatter<'_>, values: &[Value]| -> fmt::Result {
            f.write_str("[")?;
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{v}")?;
            }
            f.write_str("]")
        };
        tuple(f, &self.gte)?;
        f.write_str("..=")?;
        tuple(f, &self.lte)?;
        f.write_str("*")
    }
}

/// One index entry matched by a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    /// Indexed value tuple, without the index name and the trailing
    /// message identifier.
    pub key: Vec<Value>,
    /// Message the entry points at.
    pub id: MessageId,
}

/// Ascending scan over one index's key range.
///
/// Pull-based: each `next` decodes one stored entry. The scan ends after
/// the first error.
pub struct IndexScan {
    index: String,
    inner: KvIter,
    done: bool,
}

impl IndexScan {
    /// Opens a scan of `definition` restricted to `bounds`.
    ///
    /// The definition's `exact` flag is not consulted here.
    ///
    /// # Errors
    ///
    /// Fails if a bound value is not key-encodable or the store refuses
    /// the scan.
    pub fn open(
        store: &dyn KvStore,
        definition: &IndexDefinition,
        bounds: &QueryBounds,
    ) -> CoreResult<Self> {
        let range = bounds.key_range(&definition.name)?;
        tracing::trace!(index = %definition.name, %bounds, "opening index scan");
        Ok(Self {
            index: definition.name.clone(),
            inner: store.range(range)?,
            done: false,
        })
    }

    /// Returns the scanned index name.
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }
}

impl Iterator for IndexScan {
    type Item = CoreResult<IndexHit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let decoded = match self.inner.next()? {
            Ok((key, value)) => IndexEntry::decode(&key, &value),
            Err(e) => Err(e.into()),
        };
        match decoded {
            Ok(entry) => Some(Ok(IndexHit {
                key: entry.values,
                id: entry.id,
            })),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl fmt::Debug for IndexScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexScan")
            .field("index", &self.index)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
