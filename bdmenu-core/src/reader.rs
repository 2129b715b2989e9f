//! Bounds-checked byte cursor over a borrowed buffer.
//!
//! All multi-byte reads are big-endian, matching the MPEG-2 and Blu-ray
//! binary formats parsed throughout the workspace.

use crate::error::{ReaderError, Result};

/// A byte-oriented cursor for parsing binary structures.
///
/// Every read validates the remaining length first, so malformed input
/// surfaces as [`ReaderError::UnexpectedEnd`] instead of a panic or an
/// out-of-bounds access.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader over a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check whether the cursor has consumed the whole buffer.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn check(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(ReaderError::UnexpectedEnd {
                offset: self.pos,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.check(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Read a big-endian 16-bit value.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.check(2)?;
        let value = u16::from_be_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }

    /// Read a big-endian 24-bit value into a `u32`.
    pub fn read_u24(&mut self) -> Result<u32> {
        self.check(3)?;
        let value = ((self.data[self.pos] as u32) << 16)
            | ((self.data[self.pos + 1] as u32) << 8)
            | (self.data[self.pos + 2] as u32);
        self.pos += 3;
        Ok(value)
    }

    /// Read a big-endian 32-bit value.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Read a big-endian 64-bit value.
    pub fn read_u64(&mut self) -> Result<u64> {
        self.check(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(u64::from_be_bytes(bytes))
    }

    /// Read `n` bytes as a borrowed slice.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.check(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.check(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(bytes)
    }

    /// Advance the cursor by `n` bytes without reading.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    /// Peek at the byte at `offset` relative to the cursor without consuming.
    pub fn peek_at(&self, offset: usize) -> Result<u8> {
        self.check(offset + 1)?;
        Ok(self.data[self.pos + offset])
    }

    /// Move the cursor to an absolute position.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(ReaderError::UnexpectedEnd {
                offset: self.pos,
                needed: pos - self.pos.min(pos),
                available: self.remaining(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Remaining bytes as a borrowed slice, without consuming them.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16().unwrap(), 0x0203);
        assert_eq!(reader.read_u24().unwrap(), 0x040506);
        assert_eq!(reader.position(), 6);
        assert_eq!(reader.remaining(), 3);
    }

    #[test]
    fn test_read_u32_u64() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2A];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(reader.read_u64().unwrap(), 42);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let data = [0x01, 0x02];
        let mut reader = ByteReader::new(&data);

        let err = reader.read_u32().unwrap_err();
        assert_eq!(
            err,
            ReaderError::UnexpectedEnd {
                offset: 0,
                needed: 4,
                available: 2,
            }
        );

        // A failed read must not move the cursor.
        assert_eq!(reader.read_u16().unwrap(), 0x0102);
    }

    #[test]
    fn test_skip_and_peek() {
        let data = [0x10, 0x20, 0x30, 0x40];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.peek_at(2).unwrap(), 0x30);
        reader.skip(3).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 0x40);
        assert!(reader.skip(1).is_err());
    }

    #[test]
    fn test_read_bytes_and_array() {
        let data = [0x41, 0x42, 0x43, 0x44, 0x45];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_bytes(2).unwrap(), b"AB");
        assert_eq!(reader.read_array::<3>().unwrap(), *b"CDE");
        assert!(reader.read_bytes(1).is_err());
    }
}
