//! Wire-level building blocks for cmdwire.
//!
//! Two layers live here:
//! - [`args`]: the primitive argument codec used for command bodies
//!   (fixed-width integers, floats, enum codes, NUL-terminated strings)
//! - [`codec`], [`reader`], [`writer`]: the 7-byte link envelope
//!   (data type, buffer id, sequence, total size) that carries one command
//!   buffer per frame on the vehicle link
//!
//! No partial reads, no buffer management in user code.

pub mod args;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use args::{ArgReader, ArgWriter, ByteOrder, NUL};
pub use codec::{
    decode_frame, encode_frame, DataType, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
};
pub use error::{FrameError, Result, WireError};
pub use reader::FrameReader;
pub use writer::FrameWriter;
