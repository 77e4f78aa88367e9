//! Order-preserving tuple key encoder.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;

pub(crate) const TERMINATOR: u8 = 0x00;
pub(crate) const ESCAPE: u8 = 0xFF;

pub(crate) const TAG_NULL: u8 = 0x01;
pub(crate) const TAG_FALSE: u8 = 0x02;
pub(crate) const TAG_TRUE: u8 = 0x03;
pub(crate) const TAG_NUMBER: u8 = 0x10;
pub(crate) const TAG_TEXT: u8 = 0x20;
pub(crate) const TAG_BYTES: u8 = 0x30;
pub(crate) const TAG_ARRAY: u8 = 0x40;

// Number sub-tags, written after the float image.
pub(crate) const NUM_INT_BELOW: u8 = 0x00;
pub(crate) const NUM_FLOAT: u8 = 0x01;
pub(crate) const NUM_INT_EXACT: u8 = 0x02;
pub(crate) const NUM_INT_ABOVE: u8 = 0x03;

/// Byte appended to an encoded prefix to form an inclusive upper bound.
///
/// No element starts with this byte, so every key extending the prefix
/// sorts below it.
pub const UPPER_BOUND_SUFFIX: u8 = 0xFF;

/// Encode a tuple of values as an order-preserving key.
///
/// For any two encodable tuples `a` and `b`, `encode_key(a) < encode_key(b)`
/// byte-wise exactly when `a` sorts before `b` under
/// [`Value::cmp_key`] applied element by element (a strict prefix sorts
/// first).
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedValueType`] for maps and
/// [`CodecError::NaNForbidden`] for NaN floats, anywhere in the tuple.
pub fn encode_key(tuple: &[Value]) -> CodecResult<Vec<u8>> {
    let mut encoder = KeyEncoder::new();
    for value in tuple {
        encoder.push(value)?;
    }
    Ok(encoder.into_bytes())
}

/// Encode the inclusive upper bound of all keys starting with `prefix`.
///
/// The result sorts after `encode_key(prefix)` and after every key that
/// extends the prefix with more elements, and before every key whose
/// prefix elements are greater.
///
/// # Errors
///
/// Same as [`encode_key`].
pub fn encode_upper_bound(prefix: &[Value]) -> CodecResult<Vec<u8>> {
    let mut bytes = encode_key(prefix)?;
    bytes.push(UPPER_BOUND_SUFFIX);
    Ok(bytes)
}

/// An incremental tuple key encoder.
pub struct KeyEncoder {
    buffer: Vec<u8>,
}

impl KeyEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Append one tuple element.
    ///
    /// On error the encoder may hold a partially written element and
    /// should be discarded.
    pub fn push(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null => self.buffer.push(TAG_NULL),
            Value::Bool(false) => self.buffer.push(TAG_FALSE),
            Value::Bool(true) => self.buffer.push(TAG_TRUE),
            Value::Integer(n) => self.encode_integer(*n),
            Value::Float(f) => self.encode_float(*f)?,
            Value::Text(s) => self.encode_escaped(TAG_TEXT, s.as_bytes()),
            Value::Bytes(b) => self.encode_escaped(TAG_BYTES, b),
            Value::Array(items) => {
                self.buffer.push(TAG_ARRAY);
                for item in items {
                    self.push(item)?;
                }
                self.buffer.push(TERMINATOR);
            }
            Value::Map(_) => return Err(CodecError::unsupported_type(value.type_name())),
        }
        Ok(())
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn encode_integer(&mut self, n: i64) {
        let image = n as f64;
        let sub_tag = match i128::from(n).cmp(&(image as i128)) {
            std::cmp::Ordering::Less => NUM_INT_BELOW,
            std::cmp::Ordering::Equal => NUM_INT_EXACT,
            std::cmp::Ordering::Greater => NUM_INT_ABOVE,
        };

        self.buffer.push(TAG_NUMBER);
        self.buffer
            .extend_from_slice(&float_image(image).to_be_bytes());
        self.buffer.push(sub_tag);
        self.buffer.extend_from_slice(&flip_sign(n).to_be_bytes());
    }

    fn encode_float(&mut self, f: f64) -> CodecResult<()> {
        if f.is_nan() {
            return Err(CodecError::NaNForbidden);
        }
        // Collapse -0.0 onto 0.0
        let f = if f == 0.0 { 0.0 } else { f };

        self.buffer.push(TAG_NUMBER);
        self.buffer.extend_from_slice(&float_image(f).to_be_bytes());
        self.buffer.push(NUM_FLOAT);
        Ok(())
    }

    fn encode_escaped(&mut self, tag: u8, bytes: &[u8]) {
        self.buffer.push(tag);
        for &byte in bytes {
            self.buffer.push(byte);
            if byte == TERMINATOR {
                self.buffer.push(ESCAPE);
            }
        }
        self.buffer.push(TERMINATOR);
    }
}

impl Default for KeyEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a float onto a u64 whose unsigned order matches the float order.
fn float_image(f: f64) -> u64 {
    let bits = f.to_bits();
    if bits >> 63 == 1 {
        !bits
    } else {
        bits | (1 << 63)
    }
}

/// Inverse of [`float_image`].
pub(crate) fn float_from_image(image: u64) -> f64 {
    if image >> 63 == 1 {
        f64::from_bits(image & !(1 << 63))
    } else {
        f64::from_bits(!image)
    }
}

#[allow(clippy::cast_sign_loss)]
fn flip_sign(n: i64) -> u64 {
    (n as u64) ^ (1 << 63)
}

#[allow(clippy::cast_possible_wrap)]
pub(crate) fn unflip_sign(n: u64) -> i64 {
    (n ^ (1 << 63)) as i64
}
