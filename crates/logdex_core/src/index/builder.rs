//! Turns messages into index write operations.

use super::definition::IndexDefinition;
use super::entry::IndexEntry;
use crate::error::CoreResult;
use crate::types::Message;
use logdex_storage::WriteOp;
use std::sync::Arc;

/// Decides which messages are indexed.
///
/// Rejection is not an error: a rejected message contributes no write
/// operations and no notification.
pub trait Validator: Send + Sync {
    /// Returns true if the message should be indexed.
    fn accept(&self, message: &Message) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&Message) -> bool + Send + Sync,
{
    fn accept(&self, message: &Message) -> bool {
        self(message)
    }
}

/// Validator that accepts every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn accept(&self, _message: &Message) -> bool {
        true
    }
}

/// Builds the write operations for a batch of messages.
///
/// Output order is message order, then definition order, then the order
/// the path spec extracted the values in. A message yielding `k` values
/// for a definition produces `k` operations for it, each with its own key
/// even when values repeat.
///
/// # Errors
///
/// Any value that cannot be key-encoded fails the whole batch; no partial
/// operation list is returned.
pub fn build_ops(
    messages: &[Message],
    validator: &dyn Validator,
    definitions: &[Arc<IndexDefinition>],
) -> CoreResult<Vec<WriteOp>> {
    let mut ops = Vec::new();
    let mut skipped = 0usize;

    for message in messages {
        if !validator.accept(message) {
            skipped += 1;
            continue;
        }
        for definition in definitions {
            for (ordinal, value) in (0u32..).zip(definition.path.extract(&message.content)) {
                let entry = IndexEntry::new(definition.name.clone(), value, message.id())
                    .with_ordinal(ordinal);
                ops.push(entry.to_write_op()?);
            }
        }
    }

    tracing::debug!(
        messages = messages.len(),
        skipped,
        ops = ops.len(),
        "built index batch"
    );
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::index::PathSpec;
    use logdex_codec::{encode_key, CodecError, Value};

    fn defs(list: &[IndexDefinition]) -> Vec<Arc<IndexDefinition>> {
        list.iter().cloned().map(Arc::new).collect()
    }

    fn post(seq: u64, author: &str) -> Message {
        Message::new(
            "L1",
            seq,
            Value::object([
                ("author", Value::from(author)),
                ("tags", Value::Array(vec![Value::from("x"), Value::from("y")])),
            ]),
        )
    }

    #[test]
    fn one_op_per_message_and_definition() {
        let defs = defs(&[IndexDefinition::new("author", PathSpec::field(["author"]))]);
        let ops = build_ops(&[post(0, "alice"), post(1, "bob")], &AcceptAll, &defs).unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(
            ops[0].key(),
            encode_key(&[
                Value::from("author"),
                Value::from("alice"),
                Value::from("L1@0"),
                Value::Integer(0),
            ])
            .unwrap()
            .as_slice()
        );
    }

    #[test]
    fn multi_valued_spec_yields_k_ops() {
        let defs = defs(&[IndexDefinition::new(
            "tags",
            PathSpec::alternatives([
                PathSpec::field(["tags", "0"]),
                PathSpec::field(["tags", "1"]),
                PathSpec::field(["tags", "2"]),
            ]),
        )]);
        let ops = build_ops(&[post(0, "alice")], &AcceptAll, &defs).unwrap();
        assert_eq!(ops.len(), 2);
        for op in &ops {
            assert!(matches!(op, WriteOp::Put { value, .. } if value == b"L1@0"));
        }
    }

    #[test]
    fn repeated_values_get_distinct_keys() {
        let defs = defs(&[IndexDefinition::new(
            "tags",
            PathSpec::alternatives([PathSpec::field(["tags", "0"]), PathSpec::field(["tags", "1"])]),
        )]);
        let message = Message::new(
            "L1",
            0,
            Value::object([("tags", Value::Array(vec![Value::from("x"), Value::from("x")]))]),
        );
        let ops = build_ops(&[message], &AcceptAll, &defs).unwrap();
        assert_eq!(ops.len(), 2);
        assert_ne!(ops[0].key(), ops[1].key());

        let ordinals: Vec<u32> = ops
            .iter()
            .map(|op| IndexEntry::decode(op.key(), b"L1@0").unwrap().ordinal)
            .collect();
        assert_eq!(ordinals, vec![0, 1]);
    }

    #[test]
    fn rejected_messages_yield_nothing() {
        let defs = defs(&[IndexDefinition::new("author", PathSpec::field(["author"]))]);
        let only_bob = |m: &Message| m.content.get("author") == Some(&Value::from("bob"));
        let ops = build_ops(&[post(0, "alice"), post(1, "bob")], &only_bob, &defs).unwrap();
        assert_eq!(ops.len(), 1);

        let reject_all = |_: &Message| false;
        assert!(build_ops(&[post(0, "alice")], &reject_all, &defs)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn no_definitions_no_ops() {
        assert!(build_ops(&[post(0, "alice")], &AcceptAll, &[])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unencodable_value_fails_whole_batch() {
        let defs = defs(&[IndexDefinition::new("meta", PathSpec::field(["meta"]))]);
        let good = Message::new("L1", 0, Value::object([("meta", Value::from("ok"))]));
        let bad = Message::new(
            "L1",
            1,
            Value::object([("meta", Value::object([("nested", Value::from(1))]))]),
        );
        let result = build_ops(&[good, bad], &AcceptAll, &defs);
        assert!(matches!(
            result,
            Err(CoreError::Codec(CodecError::UnsupportedValueType { .. }))
        ));
    }

    #[test]
    fn definitions_contribute_in_order() {
        let defs = defs(&[
            IndexDefinition::new("b", PathSpec::field(["author"])),
            IndexDefinition::new("a", PathSpec::field(["author"])),
        ]);
        let ops = build_ops(&[post(0, "alice")], &AcceptAll, &defs).unwrap();
        let first = IndexEntry::decode(ops[0].key(), b"L1@0").unwrap();
        assert_eq!(first.index, "b");
    }
}
