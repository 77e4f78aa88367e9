//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during key encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value has no place in the key ordering.
    #[error("unsupported value type for key encoding: {type_name}")]
    UnsupportedValueType {
        /// Name of the unsupported type.
        type_name: String,
    },

    /// NaN has no position in the key ordering.
    #[error("NaN values cannot be key-encoded")]
    NaNForbidden,

    /// Invalid UTF-8 in a decoded text element.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// An element starts with a byte that is not a known type tag.
    #[error("unknown type tag: 0x{tag:02x}")]
    UnknownTag {
        /// The offending byte.
        tag: u8,
    },

    /// Invalid key structure.
    #[error("invalid key structure: {message}")]
    InvalidStructure {
        /// Description of the structural error.
        message: String,
    },
}

impl CodecError {
    /// Create an unsupported value type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedValueType {
            type_name: type_name.into(),
        }
    }

    /// Create an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}
