//! Bounds-checked little-endian reads over a byte slice.
//!
//! Every structure in an SMX container is packed little-endian, and every
//! offset in it comes from untrusted input, so all reads go through here
//! and report where they failed instead of panicking.

/// Failure while reading from a byte slice.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("read of {len} bytes at offset {offset} exceeds buffer of {size} bytes")]
    OutOfBounds { offset: usize, len: usize, size: usize },
    #[error("unterminated string at offset {0}")]
    UnterminatedString(usize),
    #[error("string at offset {0} is not valid ASCII")]
    NotAscii(usize),
    #[error("varint at offset {0} does not fit in 32 bits")]
    VarintOverflow(usize),
}

/// Read a little-endian u32 at `offset`.
pub fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32, ReadError> {
    let end = offset.checked_add(4).ok_or(ReadError::OutOfBounds {
        offset,
        len: 4,
        size: bytes.len(),
    })?;
    match bytes.get(offset..end) {
        Some(b) => Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(ReadError::OutOfBounds {
            offset,
            len: 4,
            size: bytes.len(),
        }),
    }
}

/// Read a null-terminated ASCII string starting at `offset`.
pub fn read_cstr(bytes: &[u8], offset: usize) -> Result<&str, ReadError> {
    let tail = bytes.get(offset..).ok_or(ReadError::OutOfBounds {
        offset,
        len: 1,
        size: bytes.len(),
    })?;
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(ReadError::UnterminatedString(offset))?;
    let raw = &tail[..len];
    if !raw.is_ascii() {
        return Err(ReadError::NotAscii(offset));
    }
    std::str::from_utf8(raw).map_err(|_| ReadError::NotAscii(offset))
}

/// Sequential cursor over a byte slice.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Cursor positioned at `offset`. The position is validated on first read.
    pub fn at(bytes: &'a [u8], offset: usize) -> Self {
        Self { bytes, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn seek(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn skip(&mut self, len: usize) -> Result<(), ReadError> {
        self.take(len).map(|_| ())
    }

    /// Consume `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let err = ReadError::OutOfBounds {
            offset: self.offset,
            len,
            size: self.bytes.len(),
        };
        let end = self.offset.checked_add(len).ok_or(err.clone())?;
        let slice = self.bytes.get(self.offset..end).ok_or(err)?;
        self.offset = end;
        Ok(slice)
    }

    pub fn peek_u8(&self) -> Result<u8, ReadError> {
        self.bytes
            .get(self.offset)
            .copied()
            .ok_or(ReadError::OutOfBounds {
                offset: self.offset,
                len: 1,
                size: self.bytes.len(),
            })
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        let b = self.peek_u8()?;
        self.offset += 1;
        Ok(b)
    }

    /// Consume `tag` if it is the next byte.
    pub fn eat(&mut self, tag: u8) -> bool {
        if self.peek_u8() == Ok(tag) {
            self.offset += 1;
            true
        } else {
            false
        }
    }

    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, ReadError> {
        self.read_u32().map(|v| v as i32)
    }

    /// Read an unsigned varint: 7 value bits per byte, least significant
    /// group first, high bit set on every byte but the last.
    pub fn read_varint(&mut self) -> Result<u32, ReadError> {
        let start = self.offset;
        let mut value: u32 = 0;
        let mut shift = 0u32;
        loop {
            let b = self.read_u8()?;
            let group = u32::from(b & 0x7f);
            if shift >= 32 || (shift == 28 && group > 0x0f) {
                return Err(ReadError::VarintOverflow(start));
            }
            value |= group << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    pub fn read_cstr(&mut self) -> Result<&'a str, ReadError> {
        let s = read_cstr(self.bytes, self.offset)?;
        self.offset += s.len() + 1;
        Ok(s)
    }
}
