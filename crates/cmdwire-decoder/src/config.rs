use cmdwire_frame::ByteOrder;

/// Controls how command buffers are decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Byte order of the header's command id and every multi-byte argument.
    pub byte_order: ByteOrder,
    /// When true, bytes left after the last argument fail the decode with
    /// `DecodeError::TrailingBytes`. Default: tolerated, since newer senders
    /// may append arguments.
    pub reject_trailing_bytes: bool,
}

impl DecoderConfig {
    /// Strict decoding: trailing bytes are an error.
    pub fn strict() -> Self {
        Self {
            reject_trailing_bytes: true,
            ..Self::default()
        }
    }
}
