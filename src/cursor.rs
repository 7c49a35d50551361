//! Bounds-checked little-endian reader over a byte slice

use crate::error::{ConversionError, ConversionResult};
use byteorder::{ByteOrder, LittleEndian};

/// Forward-only reader. Reads past the end fail with `TruncatedInput`
/// carrying the absolute offset of the failed read.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    /// Cursor over a sub-slice that starts at `base` in the whole input.
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Absolute offset of the next read.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> ConversionResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(ConversionError::truncated(
                self.offset(),
                format!("need {} bytes, {} remain", n, self.remaining()),
            ));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> ConversionResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> ConversionResult<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> ConversionResult<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> ConversionResult<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> ConversionResult<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_bytes(&mut self, n: usize) -> ConversionResult<&'a [u8]> {
        self.take(n)
    }

    /// Everything left, leaving the cursor at the end.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }

    pub fn skip(&mut self, n: usize) -> ConversionResult<()> {
        self.take(n).map(|_| ())
    }
}
