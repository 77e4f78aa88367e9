//! Index entry layout.
//!
//! An entry is stored as:
//! - key: `encode_key([Text(index name), value, Text(message id), Integer(ordinal)])`
//! - value: UTF-8 bytes of the message identifier (`"<log>@<sequence>"`)
//!
//! The leading name element keeps every index in its own contiguous key
//! range. The trailing identifier and ordinal make the key unique per
//! message and matched sub-path, so messages sharing a value never
//! overwrite each other and range scans over a value prefix see them all
//! in identifier order.

use crate::error::{CoreError, CoreResult};
use crate::types::MessageId;
use logdex_codec::{decode_key, CodecError, KeyEncoder, Value};
use logdex_storage::WriteOp;

/// One decoded index entry.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// Owning index name.
    pub index: String,
    /// Indexed value tuple, without the name and identifier elements.
    pub values: Vec<Value>,
    /// Message the entry points at.
    pub id: MessageId,
    /// Position of the match among the values the definition extracted
    /// from the message.
    pub ordinal: u32,
}

impl IndexEntry {
    /// Creates the entry for the first extracted value.
    pub fn new(index: impl Into<String>, value: Value, id: MessageId) -> Self {
        Self {
            index: index.into(),
            values: vec![value],
            id,
            ordinal: 0,
        }
    }

    /// Sets the match position.
    #[must_use]
    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = ordinal;
        self
    }

    /// Encodes the entry key.
    ///
    /// # Errors
    ///
    /// Fails with a codec error if a value is not key-encodable.
    pub fn key(&self) -> CoreResult<Vec<u8>> {
        let mut encoder = KeyEncoder::new();
        encoder.push(&Value::Text(self.index.clone()))?;
        for value in &self.values {
            encoder.push(value)?;
        }
        encoder.push(&Value::Text(self.id.to_string()))?;
        encoder.push(&Value::Integer(i64::from(self.ordinal)))?;
        Ok(encoder.into_bytes())
    }

    /// Turns the entry into a put operation.
    ///
    /// # Errors
    ///
    /// Fails with a codec error if a value is not key-encodable.
    pub fn to_write_op(&self) -> CoreResult<WriteOp> {
        Ok(WriteOp::put(self.key()?, self.id.to_string().into_bytes()))
    }

    /// Decodes a stored key/value pair.
    ///
    /// # Errors
    ///
    /// Fails if the key is not a tuple of a text name, at least one value,
    /// an identifier and an ordinal, or if the stored value is not a
    /// message identifier.
    pub fn decode(key: &[u8], value: &[u8]) -> CoreResult<Self> {
        let mut tuple = decode_key(key)?;
        if tuple.len() < 4 {
            return Err(CodecError::invalid_structure("index key is too short").into());
        }
        let ordinal = match tuple.pop() {
            Some(Value::Integer(n)) => u32::try_from(n)
                .map_err(|_| CodecError::invalid_structure("index key ordinal out of range"))?,
            _ => return Err(CodecError::invalid_structure("index key has no ordinal").into()),
        };
        if !matches!(tuple.pop(), Some(Value::Text(_))) {
            return Err(CodecError::invalid_structure("index key has no identifier").into());
        }
        let mut tuple = tuple.into_iter();
        let index = match tuple.next() {
            Some(Value::Text(name)) => name,
            _ => {
                return Err(CodecError::invalid_structure("index key has no name element").into())
            }
        };
        let id = std::str::from_utf8(value)
            .map_err(|_| CoreError::InvalidMessageId {
                id: String::from_utf8_lossy(value).into_owned(),
            })?
            .parse()?;
        Ok(Self {
            index,
            values: tuple.collect(),
            id,
            ordinal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(values: &[Value]) -> Vec<u8> {
        logdex_codec::encode_key(values).unwrap()
    }

    #[test]
    fn write_op_layout() {
        let entry = IndexEntry::new("author", Value::from("alice"), MessageId::new("L1", 4));
        let op = entry.to_write_op().unwrap();
        match op {
            WriteOp::Put { key, value } => {
                assert_eq!(
                    key,
                    key_of(&[
                        Value::from("author"),
                        Value::from("alice"),
                        Value::from("L1@4"),
                        Value::Integer(0),
                    ])
                );
                assert_eq!(value, b"L1@4");
                assert_eq!(IndexEntry::decode(&key, &value).unwrap(), entry);
            }
            WriteOp::Delete { .. } => panic!("expected put"),
        }
    }

    #[test]
    fn shared_value_keys_stay_distinct() {
        let a = IndexEntry::new("author", Value::from("alice"), MessageId::new("L1", 0));
        let b = IndexEntry::new("author", Value::from("alice"), MessageId::new("L2", 0));
        let c = a.clone().with_ordinal(1);
        assert_ne!(a.key().unwrap(), b.key().unwrap());
        assert_ne!(a.key().unwrap(), c.key().unwrap());
    }

    #[test]
    fn keys_sort_by_value_before_identifier() {
        let alice = IndexEntry::new("author", Value::from("alice"), MessageId::new("L9", 9));
        let bob = IndexEntry::new("author", Value::from("bob"), MessageId::new("L0", 0));
        assert!(alice.key().unwrap() < bob.key().unwrap());
    }

    #[test]
    fn map_value_is_not_encodable() {
        let entry = IndexEntry::new("meta", Value::object([("a", Value::from(1))]), MessageId::new("L1", 0));
        assert!(matches!(
            entry.to_write_op(),
            Err(CoreError::Codec(CodecError::UnsupportedValueType { .. }))
        ));
    }

    #[test]
    fn decode_rejects_malformed_keys() {
        let nameless = key_of(&[
            Value::Integer(1),
            Value::from("a"),
            Value::from("L1@0"),
            Value::Integer(0),
        ]);
        assert!(IndexEntry::decode(&nameless, b"L1@0").is_err());

        let short = key_of(&[Value::from("a"), Value::from("b")]);
        assert!(IndexEntry::decode(&short, b"L1@0").is_err());

        let no_ordinal = key_of(&[
            Value::from("a"),
            Value::from("b"),
            Value::from("L1@0"),
            Value::from("x"),
        ]);
        assert!(IndexEntry::decode(&no_ordinal, b"L1@0").is_err());
    }

    #[test]
    fn decode_rejects_bad_identifier() {
        let key = key_of(&[
            Value::from("a"),
            Value::from("b"),
            Value::from("L1@0"),
            Value::Integer(0),
        ]);
        assert!(matches!(
            IndexEntry::decode(&key, b"no-sequence"),
            Err(CoreError::InvalidMessageId { .. })
        ));
        assert!(matches!(
            IndexEntry::decode(&key, &[0xC3, 0x28]),
            Err(CoreError::InvalidMessageId { .. })
        ));
    }
}
