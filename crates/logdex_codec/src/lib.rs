//! # logdex Codec
//!
//! Dynamic values and the order-preserving tuple key codec for logdex.
//!
//! Index entries are stored under keys of the form
//! `(index_name, value, ...)`. This crate encodes such tuples into bytes
//! whose lexicographic byte order matches the logical tuple order, so an
//! ordered key-value store can answer range queries over heterogeneous
//! values.
//!
//! ## Ordering Rules
//!
//! - Tuples compare element by element; a strict prefix sorts first
//! - Type precedence: `null < false < true < numbers < text < bytes < arrays`
//! - Integers and floats compare numerically in one class
//! - Text and bytes compare bytewise
//! - Arrays are nested tuples
//! - Maps and NaN cannot be encoded
//!
//! ## Usage
//!
//! ```
//! use logdex_codec::{decode_key, encode_key, Value};
//!
//! let tuple = vec![Value::from("by-author"), Value::from("alice")];
//! let bytes = encode_key(&tuple).unwrap();
//! assert_eq!(decode_key(&bytes).unwrap(), tuple);
//!
//! let low = encode_key(&[Value::from(2)]).unwrap();
//! let high = encode_key(&[Value::from(10.5)]).unwrap();
//! assert!(low < high);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{decode_key, KeyDecoder};
pub use encoder::{encode_key, encode_upper_bound, KeyEncoder, UPPER_BOUND_SUFFIX};
pub use error::{CodecError, CodecResult};
pub use value::Value;

/// Trait for types that can be encoded as an index key.
pub trait EncodeKey {
    /// Encode this value to order-preserving key bytes.
    fn encode_key(&self) -> CodecResult<Vec<u8>>;
}

/// Trait for types that can be decoded from index key bytes.
pub trait DecodeKey: Sized {
    /// Decode this value from key bytes.
    fn decode_key(bytes: &[u8]) -> CodecResult<Self>;
}

impl EncodeKey for [Value] {
    fn encode_key(&self) -> CodecResult<Vec<u8>> {
        encode_key(self)
    }
}

impl EncodeKey for Vec<Value> {
    fn encode_key(&self) -> CodecResult<Vec<u8>> {
        encode_key(self)
    }
}

impl DecodeKey for Vec<Value> {
    fn decode_key(bytes: &[u8]) -> CodecResult<Self> {
        decode_key(bytes)
    }
}
