/// Errors raised while reading primitive arguments from a command buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Fewer bytes remain than the value being read requires.
    #[error("read past end of buffer at offset {offset} (need {needed} bytes, {available} available)")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A string argument has no NUL terminator before the end of the buffer.
    #[error("unterminated string starting at offset {offset}")]
    MissingTerminator { offset: usize },

    /// A string argument is not valid UTF-8.
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
}

impl WireError {
    /// Whether the error means the buffer ended early.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            WireError::OutOfBounds { .. } | WireError::MissingTerminator { .. }
        )
    }

    /// Offset at which the failing read started.
    pub fn offset(&self) -> usize {
        match self {
            WireError::OutOfBounds { offset, .. }
            | WireError::MissingTerminator { offset }
            | WireError::InvalidUtf8 { offset } => *offset,
        }
    }
}

/// Errors that can occur during network frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The declared frame size is smaller than the header itself.
    #[error("invalid frame size {size} (header alone is {header} bytes)")]
    InvalidSize { size: u32, header: usize },

    /// The header carries a data type this codec does not know.
    #[error("invalid frame data type {0}")]
    InvalidDataType(u8),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
