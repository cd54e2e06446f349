//! Table-driven binary command protocol.
//!
//! cmdwire decodes compact command buffers (feature, class, command header
//! followed by typed arguments) against a descriptor table and hands each
//! decoded command to the handler registered for it.
//!
//! # Crate Structure
//!
//! - [`frame`]: primitive argument codec and the 7-byte link envelope
//! - [`table`]: command descriptors, the built-in table and JSON loading
//! - [`decoder`]: decoding, typed argument access, handler dispatch

/// Re-export frame types.
pub mod frame {
    pub use cmdwire_frame::*;
}

/// Re-export table types.
pub mod table {
    pub use cmdwire_table::*;
}

/// Re-export decoder types.
pub mod decoder {
    pub use cmdwire_decoder::*;
}

pub use cmdwire_decoder::{
    decode, dispatch, CommandDecoder, DecodeError, DecodedCommand, DecodedValue, DecoderConfig,
    HandlerRegistry, ListFlags,
};
pub use cmdwire_table::{builtin, CommandIdentity, CommandTable};
