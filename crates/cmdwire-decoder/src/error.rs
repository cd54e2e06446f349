use cmdwire_frame::WireError;
use cmdwire_table::{ArgumentTypeTag, CommandIdentity};

/// Errors returned when a command buffer cannot be decoded.
///
/// Every variant is recoverable: drop the frame and carry on with the next.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The header names a command the descriptor table does not know.
    #[error("unknown command {0}")]
    UnknownCommand(CommandIdentity),

    /// The buffer ended before the header, list flags or an argument.
    #[error("frame truncated at offset {offset}")]
    Truncated { offset: usize },

    /// A string argument is not valid UTF-8.
    #[error("invalid string argument at offset {offset}")]
    InvalidString { offset: usize },

    /// Bytes remain after the last argument and the decoder is strict.
    #[error("{count} trailing bytes after last argument")]
    TrailingBytes { count: usize },
}

impl DecodeError {
    /// Whether the frame came from a command this receiver does not know.
    pub fn is_unknown_command(&self) -> bool {
        matches!(self, DecodeError::UnknownCommand(_))
    }
}

impl From<WireError> for DecodeError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::OutOfBounds { offset, .. } | WireError::MissingTerminator { offset } => {
                DecodeError::Truncated { offset }
            }
            WireError::InvalidUtf8 { offset } => DecodeError::InvalidString { offset },
        }
    }
}

/// Errors raised when typed access does not match the decoded values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    /// The requested position is past the last argument.
    #[error("argument {index} out of range ({len} arguments)")]
    OutOfRange { index: usize, len: usize },

    /// The value at this position has another wire type.
    #[error("argument {index} is {found}, not {expected}")]
    TypeMismatch {
        index: usize,
        expected: ArgumentTypeTag,
        found: ArgumentTypeTag,
    },

    /// The tuple size differs from the argument count.
    #[error("expected {expected} arguments, command has {found}")]
    Arity { expected: usize, found: usize },
}

/// Errors raised by the symmetric encoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// No descriptor for the identity.
    #[error("unknown command {0}")]
    UnknownCommand(CommandIdentity),

    /// Value count differs from the descriptor's argument count.
    #[error("command {identity} takes {expected} arguments, got {found}")]
    Arity {
        identity: CommandIdentity,
        expected: usize,
        found: usize,
    },

    /// A value does not have the descriptor's type at its position.
    #[error("argument {index} of {identity} must be {expected}, got {found}")]
    TypeMismatch {
        identity: CommandIdentity,
        index: usize,
        expected: ArgumentTypeTag,
        found: ArgumentTypeTag,
    },

    /// List flags given for a plain command or missing for a list item.
    #[error("list flags mismatch for {identity} (list item: {is_list_item})")]
    ListFlags {
        identity: CommandIdentity,
        is_list_item: bool,
    },

    /// A string argument contains a NUL byte and would be cut short on decode.
    #[error("string argument {index} contains a NUL byte")]
    InteriorNul { index: usize },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
