//! Core type definitions for logdex.

use crate::error::CoreError;
use logdex_codec::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of an append-only log.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogId(String);

impl LogId {
    /// Creates a log identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LogId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Canonical identifier of one message: `(log, sequence)`.
///
/// Serialized as `"<log>@<sequence>"`. Parsing splits on the last `@`, so
/// log identifiers may themselves contain `@`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId {
    /// Originating log.
    pub log_id: LogId,
    /// Position within the log.
    pub sequence: u64,
}

impl MessageId {
    /// Creates a message identifier.
    pub fn new(log_id: impl Into<LogId>, sequence: u64) -> Self {
        Self {
            log_id: log_id.into(),
            sequence,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.log_id, self.sequence)
    }
}

impl FromStr for MessageId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidMessageId { id: s.to_string() };
        let (log, seq) = s.rsplit_once('@').ok_or_else(invalid)?;
        if log.is_empty() {
            return Err(invalid());
        }
        let sequence = seq.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self::new(log, sequence))
    }
}

impl Serialize for MessageId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A message read from a log.
///
/// Immutable once its sequence is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Originating log.
    pub log_id: LogId,
    /// Position within the log.
    pub sequence: u64,
    /// Opaque payload.
    pub content: Value,
}

impl Message {
    /// Creates a message.
    pub fn new(log_id: impl Into<LogId>, sequence: u64, content: Value) -> Self {
        Self {
            log_id: log_id.into(),
            sequence,
            content,
        }
    }

    /// Returns the canonical identifier of this message.
    #[must_use]
    pub fn id(&self) -> MessageId {
        MessageId {
            log_id: self.log_id.clone(),
            sequence: self.sequence,
        }
    }
}
