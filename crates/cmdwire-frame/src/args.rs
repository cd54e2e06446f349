//! Primitive argument codec.
//!
//! Command bodies are a flat sequence of fixed-width integers, IEEE-754
//! floats, 32-bit enum codes and NUL-terminated UTF-8 strings. [`ArgReader`]
//! walks a borrowed buffer with a cursor; [`ArgWriter`] produces the same
//! layout into a [`BytesMut`].

use bytes::{BufMut, BytesMut};

use crate::error::WireError;

/// Byte order used for every multi-byte value in a command buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// The vehicle protocol's native order.
    #[default]
    Little,
    Big,
}

/// String terminator.
pub const NUL: u8 = 0x00;

/// Cursor over a read-only command buffer.
#[derive(Debug, Clone)]
pub struct ArgReader<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

macro_rules! read_int {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $width:literal) => {
        $(#[$doc])*
        pub fn $name(&mut self) -> Result<$ty, WireError> {
            let bytes = self.take::<$width>()?;
            Ok(match self.order {
                ByteOrder::Little => <$ty>::from_le_bytes(bytes),
                ByteOrder::Big => <$ty>::from_be_bytes(bytes),
            })
        }
    };
}

impl<'a> ArgReader<'a> {
    /// Create a little-endian reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_byte_order(buf, ByteOrder::Little)
    }

    /// Create a reader with an explicit byte order.
    pub fn with_byte_order(buf: &'a [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    /// Current cursor offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let available = self.remaining();
        if available < N {
            return Err(WireError::OutOfBounds {
                offset: self.pos,
                needed: N,
                available,
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    read_int!(
        /// Read one unsigned byte.
        read_u8,
        u8,
        1
    );
    read_int!(read_i8, i8, 1);
    read_int!(read_u16, u16, 2);
    read_int!(read_i16, i16, 2);
    read_int!(read_u32, u32, 4);
    read_int!(read_i32, i32, 4);
    read_int!(read_u64, u64, 8);
    read_int!(read_i64, i64, 8);

    /// Read a 32-bit IEEE-754 float.
    pub fn read_float(&mut self) -> Result<f32, WireError> {
        self.read_u32().map(f32::from_bits)
    }

    /// Read a 64-bit IEEE-754 float.
    pub fn read_double(&mut self) -> Result<f64, WireError> {
        self.read_u64().map(f64::from_bits)
    }

    /// Read an enum code.
    ///
    /// Codes are returned raw; mapping to enumerator names is left to the
    /// caller so codes from newer senders still decode.
    pub fn read_enum(&mut self) -> Result<i32, WireError> {
        self.read_i32()
    }

    /// Read a NUL-terminated UTF-8 string and move past the terminator.
    pub fn read_string(&mut self) -> Result<String, WireError> {
        let start = self.pos;
        let rest = &self.buf[start..];
        let len = rest
            .iter()
            .position(|b| *b == NUL)
            .ok_or(WireError::MissingTerminator { offset: start })?;
        let text = std::str::from_utf8(&rest[..len])
            .map_err(|_| WireError::InvalidUtf8 { offset: start })?;
        self.pos = start + len + 1;
        Ok(text.to_owned())
    }
}

/// Appends primitive arguments to a buffer.
#[derive(Debug)]
pub struct ArgWriter<'a> {
    dst: &'a mut BytesMut,
    order: ByteOrder,
}

macro_rules! write_int {
    ($name:ident, $ty:ty, $le:ident, $be:ident) => {
        pub fn $name(&mut self, value: $ty) -> &mut Self {
            match self.order {
                ByteOrder::Little => self.dst.$le(value),
                ByteOrder::Big => self.dst.$be(value),
            }
            self
        }
    };
}

impl<'a> ArgWriter<'a> {
    /// Create a little-endian writer appending to `dst`.
    pub fn new(dst: &'a mut BytesMut) -> Self {
        Self::with_byte_order(dst, ByteOrder::Little)
    }

    pub fn with_byte_order(dst: &'a mut BytesMut, order: ByteOrder) -> Self {
        Self { dst, order }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.dst.put_u8(value);
        self
    }

    pub fn write_i8(&mut self, value: i8) -> &mut Self {
        self.dst.put_i8(value);
        self
    }

    write_int!(write_u16, u16, put_u16_le, put_u16);
    write_int!(write_i16, i16, put_i16_le, put_i16);
    write_int!(write_u32, u32, put_u32_le, put_u32);
    write_int!(write_i32, i32, put_i32_le, put_i32);
    write_int!(write_u64, u64, put_u64_le, put_u64);
    write_int!(write_i64, i64, put_i64_le, put_i64);

    pub fn write_float(&mut self, value: f32) -> &mut Self {
        self.write_u32(value.to_bits())
    }

    pub fn write_double(&mut self, value: f64) -> &mut Self {
        self.write_u64(value.to_bits())
    }

    pub fn write_enum(&mut self, code: i32) -> &mut Self {
        self.write_i32(code)
    }

    /// Write `value` followed by a NUL terminator.
    ///
    /// The caller must make sure `value` holds no interior NUL, otherwise the
    /// reader stops at the first one.
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.dst.put_slice(value.as_bytes());
        self.dst.put_u8(NUL);
        self
    }
}
