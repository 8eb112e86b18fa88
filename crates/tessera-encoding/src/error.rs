use thiserror::Error;

/// Errors from encoding or decoding canonical bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A declared length or fixed width runs past the end of the buffer.
    #[error("truncated buffer: need {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A length does not fit the 4-byte prefix.
    #[error("length {0} exceeds the 32-bit length prefix")]
    LengthOverflow(usize),

    /// A boolean byte other than 0 or 1.
    #[error("invalid boolean byte: {0:#04x}")]
    InvalidBool(u8),

    /// String bytes that are not UTF-8.
    #[error("invalid utf-8 string: {0}")]
    InvalidUtf8(String),

    /// Bytes left over after a complete value was decoded.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// A structurally valid buffer carrying a value the decoder rejects.
    #[error("invalid value: {0}")]
    Invalid(String),
}

/// Result alias for encoding operations.
pub type EncodingResult<T> = Result<T, EncodingError>;
