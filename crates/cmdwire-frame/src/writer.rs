use std::io::Write;

use bytes::BytesMut;

use crate::codec::{encode_frame, DataType, Frame, FrameConfig};
use crate::error::{FrameError, Result};

/// Emits link frames to a byte sink, numbering each buffer independently.
pub struct FrameWriter<W> {
    sink: W,
    scratch: BytesMut,
    config: FrameConfig,
    next_sequence: [u8; 256],
    frames: u64,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, FrameConfig::default())
    }

    pub fn with_config(sink: W, config: FrameConfig) -> Self {
        Self {
            sink,
            scratch: BytesMut::new(),
            config,
            next_sequence: [0; 256],
            frames: 0,
        }
    }

    /// Write `frame` exactly as given, sequence number included.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let max = self.config.max_payload_size;
        if frame.payload.len() > max {
            return Err(FrameError::PayloadTooLarge {
                size: frame.payload.len(),
                max,
            });
        }

        self.scratch.clear();
        encode_frame(frame, &mut self.scratch)?;
        self.sink.write_all(&self.scratch).map_err(|err| match err.kind() {
            std::io::ErrorKind::WriteZero => FrameError::ConnectionClosed,
            _ => FrameError::Io(err),
        })?;
        self.frames += 1;
        Ok(())
    }

    /// Frame `payload` on `buffer_id` with that buffer's next sequence
    /// number and return the number used. Sequences wrap after 255.
    pub fn send(&mut self, data_type: DataType, buffer_id: u8, payload: &[u8]) -> Result<u8> {
        let slot = usize::from(buffer_id);
        let sequence = self.next_sequence[slot];
        self.write_frame(&Frame::new(data_type, buffer_id, sequence, payload.to_vec()))?;
        self.next_sequence[slot] = sequence.wrapping_add(1);
        Ok(sequence)
    }

    /// Sequence number the next `send` on `buffer_id` will use.
    pub fn next_sequence(&self, buffer_id: u8) -> u8 {
        self.next_sequence[usize::from(buffer_id)]
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush().map_err(FrameError::Io)
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
