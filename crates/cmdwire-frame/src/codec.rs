use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: data type (1) + buffer id (1) + sequence (1) + size (4) = 7 bytes.
pub const HEADER_SIZE: usize = 7;

/// Default maximum payload size: 128 KiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 128 * 1024;

/// How the link layer treats a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// Acknowledgement of a frame sent with [`DataType::DataWithAck`].
    Ack = 1,
    /// Unacknowledged data.
    Data = 2,
    /// Unacknowledged data, highest priority (video).
    LowLatency = 3,
    /// Data the receiver must acknowledge.
    DataWithAck = 4,
}

impl DataType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether the payload of this frame is a command buffer.
    pub fn carries_command(self) -> bool {
        matches!(self, DataType::Data | DataType::DataWithAck)
    }
}

impl TryFrom<u8> for DataType {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(DataType::Ack),
            2 => Ok(DataType::Data),
            3 => Ok(DataType::LowLatency),
            4 => Ok(DataType::DataWithAck),
            other => Err(FrameError::InvalidDataType(other)),
        }
    }
}

/// One link-layer frame wrapping a command buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub data_type: DataType,
    /// Link buffer the frame was sent on.
    pub buffer_id: u8,
    /// Per-buffer sequence number, wraps at 255.
    pub sequence: u8,
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(data_type: DataType, buffer_id: u8, sequence: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            data_type,
            buffer_id,
            sequence,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Append `frame` to `dst`.
///
/// ```text
/// +------+--------+-----+-----------------+---------+
/// | type | buffer | seq | size (u32 LE)   | payload |
/// |  u8  |   u8   | u8  | header included |         |
/// +------+--------+-----+-----------------+---------+
/// ```
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) -> Result<()> {
    let size = u32::try_from(frame.wire_size()).map_err(|_| FrameError::PayloadTooLarge {
        size: frame.payload.len(),
        max: u32::MAX as usize - HEADER_SIZE,
    })?;
    dst.reserve(frame.wire_size());
    dst.put_slice(&[frame.data_type.as_u8(), frame.buffer_id, frame.sequence]);
    dst.put_u32_le(size);
    dst.put_slice(&frame.payload);
    Ok(())
}

/// Split the next frame off the front of `src`.
///
/// `Ok(None)` until `src` holds a whole frame; nothing is consumed then.
/// The envelope is validated as soon as the header is present, so a corrupt
/// header fails without waiting for its payload.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    let Some(header) = src.get(..HEADER_SIZE) else {
        return Ok(None);
    };

    let data_type = DataType::try_from(header[0])?;
    let (buffer_id, sequence) = (header[1], header[2]);
    let size = u32::from_le_bytes([header[3], header[4], header[5], header[6]]);

    let payload_len = (size as usize)
        .checked_sub(HEADER_SIZE)
        .ok_or(FrameError::InvalidSize {
            size,
            header: HEADER_SIZE,
        })?;
    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }
    if src.len() < HEADER_SIZE + payload_len {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    Ok(Some(Frame {
        data_type,
        buffer_id,
        sequence,
        payload: src.split_to(payload_len).freeze(),
    }))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 128 KiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
