//! Binary buffer reader with cursor tracking.

use crate::BufferError;

/// A bounds-checked reader over a byte slice.
///
/// Every read advances the cursor only when the requested bytes are present;
/// a short read leaves the cursor untouched and returns
/// [`BufferError::EndOfBuffer`].
///
/// # Example
///
/// ```
/// use cbor_driver_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.array::<2>(), Ok([0x02, 0x03]));
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Resets the reader with a new byte slice.
    pub fn reset(&mut self, uint8: &'a [u8]) {
        self.x = 0;
        self.uint8 = uint8;
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.uint8.len() - self.x
    }

    /// Peeks at the current byte without advancing the cursor.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.uint8.get(self.x).copied().ok_or(BufferError::EndOfBuffer)
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        if length > self.size() {
            return Err(BufferError::EndOfBuffer);
        }
        self.x += length;
        Ok(())
    }

    /// Moves the cursor back by the given number of bytes.
    pub fn unread(&mut self, length: usize) -> Result<(), BufferError> {
        self.x = self.x.checked_sub(length).ok_or(BufferError::Overflow)?;
        Ok(())
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        let end = self.x.checked_add(size).ok_or(BufferError::EndOfBuffer)?;
        let bin = self.uint8.get(self.x..end).ok_or(BufferError::EndOfBuffer)?;
        self.x = end;
        Ok(bin)
    }

    /// Reads exactly `N` bytes into an array.
    #[inline]
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.buf(N)?);
        Ok(out)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        let val = self.peek()?;
        self.x += 1;
        Ok(val)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let data = [0x01, 0x02];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8(), Ok(0x01));
        assert_eq!(reader.u8(), Ok(0x02));
        assert_eq!(reader.u8(), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn test_array() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.array::<2>().map(u16::from_be_bytes), Ok(0x0102));
        assert_eq!(reader.array::<4>().map(u32::from_be_bytes), Ok(0x03040506));
        assert_eq!(reader.array::<1>(), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn test_short_read_keeps_cursor() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        reader.skip(1).unwrap();
        assert_eq!(reader.array::<4>(), Err(BufferError::EndOfBuffer));
        assert_eq!(reader.x, 1);
        assert_eq!(reader.array::<2>(), Ok([0x02, 0x03]));
    }

    #[test]
    fn test_unread() {
        let data = [0xaa, 0xbb];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8(), Ok(0xaa));
        reader.unread(1).unwrap();
        assert_eq!(reader.u8(), Ok(0xaa));
        assert_eq!(reader.unread(2), Err(BufferError::Overflow));
    }

    #[test]
    fn test_buf_is_borrowed() {
        let data = b"hello world";
        let mut reader = Reader::new(data);
        let head = reader.buf(5).unwrap();
        assert_eq!(head, b"hello");
        assert_eq!(head.as_ptr(), data.as_ptr());
        assert_eq!(reader.size(), 6);
    }
}
