/// Atom-level write failures, per §5's invariants on string and array length.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireEncodeError {
    #[error("string is {len} bytes, exceeds the uint16 length prefix limit of 65535")]
    StringTooLong { len: usize },

    #[error("array has {len} elements, exceeds the uint16 length prefix limit of 65535")]
    ArrayTooLong { len: usize },
}

/// Atom-level read failures, per §5.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireDecodeError {
    #[error("unexpected end of input")]
    EndOfInput,

    #[error("string bytes are not valid UTF-8")]
    InvalidUtf8,

    #[error("trailing bytes after decoding the expected value")]
    TrailingBytes,
}
