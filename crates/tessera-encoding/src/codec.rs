use crate::error::{EncodingError, EncodingResult};

/// Width of every length prefix (strings, slices, reference lists).
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Append-only writer for canonical bytes.
#[derive(Debug, Default, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Write a length prefix. Fails if `len` does not fit in 32 bits.
    pub fn put_len(&mut self, len: usize) -> EncodingResult<()> {
        let len = u32::try_from(len).map_err(|_| EncodingError::LengthOverflow(len))?;
        self.put_u32(len);
        Ok(())
    }

    /// Write raw bytes with no prefix.
    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a byte-length-prefixed string.
    pub fn put_str(&mut self, s: &str) -> EncodingResult<()> {
        self.put_len(s.len())?;
        self.put_raw(s.as_bytes());
        Ok(())
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the encoder and return the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked cursor over canonical bytes.
///
/// Every read checks the remaining length first, so a malformed or partial
/// buffer yields [`EncodingError::Truncated`] rather than a panic.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` if every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> EncodingResult<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(EncodingError::Truncated {
                needed: n,
                remaining,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consume `n` bytes without looking at them.
    pub fn skip(&mut self, n: usize) -> EncodingResult<()> {
        self.take(n).map(|_| ())
    }

    /// Consume a fixed-size array.
    pub fn take_array<const N: usize>(&mut self) -> EncodingResult<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn get_u8(&mut self) -> EncodingResult<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn get_u16(&mut self) -> EncodingResult<u16> {
        self.take_array().map(u16::from_le_bytes)
    }

    pub fn get_u32(&mut self) -> EncodingResult<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn get_u64(&mut self) -> EncodingResult<u64> {
        self.take_array().map(u64::from_le_bytes)
    }

    /// Read a length prefix.
    pub fn get_len(&mut self) -> EncodingResult<usize> {
        self.get_u32().map(|v| v as usize)
    }

    /// Read a length prefix counting `width`-byte items and check that the
    /// items fit in what is left of the buffer.
    pub fn get_counted_len(&mut self, width: usize) -> EncodingResult<usize> {
        let count = self.get_len()?;
        let needed = count
            .checked_mul(width)
            .ok_or(EncodingError::LengthOverflow(count))?;
        let remaining = self.remaining();
        if needed > remaining {
            return Err(EncodingError::Truncated { needed, remaining });
        }
        Ok(count)
    }

    /// Read a byte-length-prefixed UTF-8 string.
    pub fn get_str(&mut self) -> EncodingResult<&'a str> {
        let len = self.get_len()?;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes).map_err(|e| EncodingError::InvalidUtf8(e.to_string()))
    }

    /// Fail if any bytes are left.
    pub fn finish(&self) -> EncodingResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(EncodingError::TrailingBytes(n)),
        }
    }
}
