//! Resolution of index hits into messages.

use crate::error::{CoreError, CoreResult};
use crate::log::LogStore;
use crate::types::{Message, MessageId};
use std::fmt;
use std::sync::Arc;

/// Turns message identifiers back into full messages.
///
/// Resolution is two-phase: the identifier selects a log, then the log is
/// read at the identifier's sequence. Both misses are reported as
/// recoverable stale-hit errors (see [`CoreError::is_stale_hit`]).
#[derive(Clone)]
pub struct HitResolver {
    logs: Arc<dyn LogStore>,
}

impl HitResolver {
    /// Creates a resolver over `logs`.
    pub fn new(logs: Arc<dyn LogStore>) -> Self {
        Self { logs }
    }

    /// Reads the message an identifier points at.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnknownLog`] if no log has the identifier's log id
    /// - [`CoreError::SequenceNotFound`] if the log has no such entry
    /// - any error of the log read itself
    pub fn resolve(&self, id: &MessageId) -> CoreResult<Message> {
        let log = self
            .logs
            .log(&id.log_id)
            .ok_or_else(|| CoreError::unknown_log(id.log_id.as_str()))?;
        let content = log
            .read_at(id.sequence)?
            .ok_or_else(|| CoreError::sequence_not_found(id.log_id.as_str(), id.sequence))?;
        Ok(Message::new(log.id().clone(), id.sequence, content))
    }
}

impl fmt::Debug for HitResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::InMemoryLogStore;
    use logdex_codec::Value;

    fn resolver() -> (Arc<InMemoryLogStore>, HitResolver) {
        let store = Arc::new(InMemoryLogStore::new());
        let log = store.create_log("L1");
        log.append(Value::from("zero"));
        log.append(Value::from("one"));
        let resolver = HitResolver::new(store.clone());
        (store, resolver)
    }

    #[test]
    fn resolves_existing_hit() {
        let (_, resolver) = resolver();
        let msg = resolver.resolve(&MessageId::new("L1", 1)).unwrap();
        assert_eq!(msg, Message::new("L1", 1, Value::from("one")));
    }

    #[test]
    fn unknown_log() {
        let (_, resolver) = resolver();
        let err = resolver.resolve(&MessageId::new("L9", 0)).unwrap_err();
        assert!(matches!(err, CoreError::UnknownLog { ref log_id } if log_id == "L9"));
        assert!(err.is_stale_hit());
    }

    #[test]
    fn truncated_log_reports_missing_sequence() {
        let (store, resolver) = resolver();
        store.get(&"L1".into()).unwrap().truncate(1);
        let err = resolver.resolve(&MessageId::new("L1", 1)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SequenceNotFound { ref log_id, sequence: 1 } if log_id == "L1"
        ));
    }
}
