//! Bounds-checked reads over an untrusted byte buffer.

use crate::descriptor::Section;
use crate::errors::FormatError;

/// Forward-only reader over a borrowed buffer.
///
/// Every read names the descriptor section it belongs to so a shortfall can be
/// reported precisely. The position never moves past the end of the buffer.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consumes exactly `len` bytes.
    pub fn take(&mut self, len: usize, section: Section) -> Result<&'a [u8], FormatError> {
        if len > self.remaining() {
            return Err(self.shortfall(len, section));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Consumes `count` records of `size` bytes each, as one slice.
    ///
    /// The total is checked for overflow before it is compared with the
    /// remaining length, so an absurd declared count fails instead of wrapping.
    pub fn take_array(
        &mut self,
        count: usize,
        size: usize,
        section: Section,
    ) -> Result<&'a [u8], FormatError> {
        let len = count
            .checked_mul(size)
            .ok_or_else(|| self.shortfall(usize::MAX, section))?;
        self.take(len, section)
    }

    pub fn read_u32(&mut self, section: Section) -> Result<u32, FormatError> {
        let bytes = self.take(4, section)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self, section: Section) -> Result<u64, FormatError> {
        let bytes = self.take(8, section)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(word))
    }

    fn shortfall(&self, needed: usize, section: Section) -> FormatError {
        FormatError::Truncated {
            section,
            offset: self.pos,
            needed,
            remaining: self.remaining(),
        }
    }
}

/// Splits a slice into little-endian `u32` words. The length must be a
/// multiple of four; a trailing partial word is ignored.
pub(crate) fn le_u32_words(bytes: &[u8]) -> impl Iterator<Item = u32> + '_ {
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

/// Splits a slice into little-endian `u64` words.
pub(crate) fn le_u64_words(bytes: &[u8]) -> impl Iterator<Item = u64> + '_ {
    bytes.chunks_exact(8).map(|chunk| {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        u64::from_le_bytes(word)
    })
}
