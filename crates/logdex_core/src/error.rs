//! Error types for logdex core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in logdex core operations.
///
/// A message rejected by the view's validator is not an error: it is
/// skipped silently and never reaches this type.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Key-value store error, propagated verbatim.
    #[error("storage error: {0}")]
    Storage(#[from] logdex_storage::StorageError),

    /// Key codec error. A value that cannot be key-encoded surfaces as
    /// [`logdex_codec::CodecError::UnsupportedValueType`] and fails the
    /// whole indexing batch.
    #[error("codec error: {0}")]
    Codec(#[from] logdex_codec::CodecError),

    /// Error reported by a log collaborator.
    #[error("log error: {message}")]
    Log {
        /// Description of the failure.
        message: String,
    },

    /// No log matches the identifier of a hit.
    #[error("unknown log: {log_id}")]
    UnknownLog {
        /// The identifier that was looked up.
        log_id: String,
    },

    /// The log exists but has no entry at the hit's sequence.
    #[error("sequence {sequence} not found in log {log_id}")]
    SequenceNotFound {
        /// The log that was read.
        log_id: String,
        /// The missing sequence.
        sequence: u64,
    },

    /// Index definition rejected at registration.
    #[error("invalid index definition: {message}")]
    InvalidDefinition {
        /// Why the definition was rejected.
        message: String,
    },

    /// A stored or supplied message identifier does not parse.
    #[error("invalid message identifier: {id:?}")]
    InvalidMessageId {
        /// The offending identifier.
        id: String,
    },

    /// A query names an index that is not registered.
    #[error("unknown index: {name}")]
    UnknownIndex {
        /// The requested index name.
        name: String,
    },

    /// A query request the planner cannot turn into a plan.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Description of the problem.
        message: String,
    },

    /// The stored checkpoint is not valid hex text.
    #[error("stored checkpoint is corrupted: {message}")]
    InvalidCheckpoint {
        /// Decoder message.
        message: String,
    },

    /// A fan-in worker stopped without reporting its end.
    #[error("log source disconnected")]
    SourceDisconnected,
}

impl CoreError {
    /// Creates a log collaborator error.
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
        }
    }

    /// Creates an invalid definition error.
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
        }
    }

    /// Creates an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates an unknown log error.
    pub fn unknown_log(log_id: impl Into<String>) -> Self {
        Self::UnknownLog {
            log_id: log_id.into(),
        }
    }

    /// Creates a sequence not found error.
    pub fn sequence_not_found(log_id: impl Into<String>, sequence: u64) -> Self {
        Self::SequenceNotFound {
            log_id: log_id.into(),
            sequence,
        }
    }

    /// Returns true for the resolution-time inconsistencies a caller may
    /// recover from by dropping the stale hit or re-indexing.
    pub fn is_stale_hit(&self) -> bool {
        matches!(self, Self::UnknownLog { .. } | Self::SequenceNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logdex_codec::CodecError;

    #[test]
    fn stale_hit_classification() {
        assert!(CoreError::unknown_log("L1").is_stale_hit());
        assert!(CoreError::sequence_not_found("L1", 3).is_stale_hit());
        assert!(!CoreError::invalid_definition("empty").is_stale_hit());
    }

    #[test]
    fn codec_errors_convert() {
        let err: CoreError = CodecError::unsupported_type("map").into();
        assert!(matches!(
            err,
            CoreError::Codec(CodecError::UnsupportedValueType { .. })
        ));
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            CoreError::sequence_not_found("L1", 7).to_string(),
            "sequence 7 not found in log L1"
        );
        assert_eq!(CoreError::unknown_log("L9").to_string(), "unknown log: L9");
    }
}
