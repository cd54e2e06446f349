use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const READ_CHUNK: usize = 8 * 1024;

/// Pulls whole link frames out of a byte stream such as a capture file.
///
/// Short reads are buffered until a full frame is available.
pub struct FrameReader<R> {
    source: R,
    pending: BytesMut,
    config: FrameConfig,
    frames: u64,
    consumed: u64,
    finished: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_config(source, FrameConfig::default())
    }

    pub fn with_config(source: R, config: FrameConfig) -> Self {
        Self {
            source,
            pending: BytesMut::with_capacity(READ_CHUNK),
            config,
            frames: 0,
            consumed: 0,
            finished: false,
        }
    }

    /// Next frame; a stream that ends, even between frames, is
    /// `FrameError::ConnectionClosed`.
    pub fn read_frame(&mut self) -> Result<Frame> {
        self.next_frame()?.ok_or(FrameError::ConnectionClosed)
    }

    /// Next frame, or `None` when the stream ends on a frame boundary.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = decode_frame(&mut self.pending, self.config.max_payload_size)? {
                self.frames += 1;
                self.consumed += frame.wire_size() as u64;
                return Ok(Some(frame));
            }

            if self.fill()? == 0 {
                return match self.pending.len() {
                    0 => Ok(None),
                    leftover => {
                        tracing::debug!(
                            offset = self.consumed,
                            leftover,
                            "stream ended inside a frame"
                        );
                        Err(FrameError::ConnectionClosed)
                    }
                };
            }
        }
    }

    /// Frames returned so far.
    pub fn frames_read(&self) -> u64 {
        self.frames
    }

    /// Stream offset of the first byte not yet returned as part of a frame.
    pub fn position(&self) -> u64 {
        self.consumed
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn fill(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.source.read(&mut chunk) {
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }
}

/// Iteration stops for good after the stream ends or the first error; a
/// corrupt envelope leaves no trustworthy frame boundary to resume from.
impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_frame().transpose();
        self.finished = !matches!(item, Some(Ok(_)));
        item
    }
}

impl<R: Read> std::iter::FusedIterator for FrameReader<R> {}
