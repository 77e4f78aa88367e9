//! Tuple key decoder.

use crate::encoder::{
    float_from_image, unflip_sign, ESCAPE, NUM_FLOAT, NUM_INT_ABOVE, NUM_INT_BELOW, NUM_INT_EXACT,
    TAG_ARRAY, TAG_BYTES, TAG_FALSE, TAG_NULL, TAG_NUMBER, TAG_TEXT, TAG_TRUE, TERMINATOR,
};
use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Decode a key produced by [`crate::encode_key`] back into its tuple.
///
/// # Errors
///
/// Returns an error if the bytes are truncated or contain an unknown
/// type tag or number sub-tag.
pub fn decode_key(bytes: &[u8]) -> CodecResult<Vec<Value>> {
    let mut decoder = KeyDecoder::new(bytes);
    let mut tuple = Vec::new();
    while !decoder.is_empty() {
        tuple.push(decoder.decode()?);
    }
    Ok(tuple)
}

/// A streaming tuple key decoder.
pub struct KeyDecoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> KeyDecoder<'a> {
    /// Create a new decoder for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Decode the next tuple element.
    pub fn decode(&mut self) -> CodecResult<Value> {
        let tag = self.read_byte()?;
        self.decode_tagged(tag)
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    fn decode_tagged(&mut self, tag: u8) -> CodecResult<Value> {
        match tag {
            TAG_NULL => Ok(Value::Null),
            TAG_FALSE => Ok(Value::Bool(false)),
            TAG_TRUE => Ok(Value::Bool(true)),
            TAG_NUMBER => self.decode_number(),
            TAG_TEXT => {
                let bytes = self.read_escaped()?;
                String::from_utf8(bytes)
                    .map(Value::Text)
                    .map_err(|_| CodecError::InvalidUtf8)
            }
            TAG_BYTES => self.read_escaped().map(Value::Bytes),
            TAG_ARRAY => {
                let mut items = Vec::new();
                loop {
                    let next = self.read_byte()?;
                    if next == TERMINATOR {
                        break;
                    }
                    items.push(self.decode_tagged(next)?);
                }
                Ok(Value::Array(items))
            }
            other => Err(CodecError::UnknownTag { tag: other }),
        }
    }

    fn decode_number(&mut self) -> CodecResult<Value> {
        let image = self.read_u64()?;
        match self.read_byte()? {
            NUM_FLOAT => Ok(Value::Float(float_from_image(image))),
            NUM_INT_BELOW | NUM_INT_EXACT | NUM_INT_ABOVE => {
                Ok(Value::Integer(unflip_sign(self.read_u64()?)))
            }
            other => Err(CodecError::invalid_structure(format!(
                "unknown number sub-tag 0x{other:02x}"
            ))),
        }
    }

    fn read_escaped(&mut self) -> CodecResult<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let byte = self.read_byte()?;
            if byte != TERMINATOR {
                out.push(byte);
                continue;
            }
            if self.data.get(self.pos) == Some(&ESCAPE) {
                self.pos += 1;
                out.push(TERMINATOR);
            } else {
                return Ok(out);
            }
        }
    }

    #[inline]
    fn read_byte(&mut self) -> CodecResult<u8> {
        let byte = *self.data.get(self.pos).ok_or(CodecError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_u64(&mut self) -> CodecResult<u64> {
        let end = self.pos + 8;
        let bytes: [u8; 8] = self
            .data
            .get(self.pos..end)
            .and_then(|s| s.try_into().ok())
            .ok_or(CodecError::UnexpectedEof)?;
        self.pos = end;
        Ok(u64::from_be_bytes(bytes))
    }
}
