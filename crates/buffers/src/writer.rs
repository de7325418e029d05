//! Binary buffer writer with auto-growing capacity.

/// A binary buffer writer that grows automatically as needed.
///
/// Bytes between `x0` and `x` are the pending output; [`Writer::flush`]
/// hands them out and moves `x0` forward.
///
/// # Example
///
/// ```
/// use cbor_driver_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8u16(0x19, 0x0203);
/// assert_eq!(writer.flush(), [0x19, 0x02, 0x03]);
/// ```
#[derive(Debug, Clone)]
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Position where last flush happened.
    pub x0: usize,
    /// Current cursor position.
    pub x: usize,
    alloc_size: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with default allocation size (4KB).
    pub fn new() -> Self {
        Self::with_alloc_size(4 * 1024)
    }

    /// Creates a new writer with custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self {
            uint8: vec![0u8; alloc_size],
            x0: 0,
            x: 0,
            alloc_size,
        }
    }

    /// Number of pending (unflushed) bytes.
    pub fn len(&self) -> usize {
        self.x - self.x0
    }

    /// Returns `true` when nothing has been written since the last flush.
    pub fn is_empty(&self) -> bool {
        self.x == self.x0
    }

    /// Pending bytes, without flushing.
    pub fn as_slice(&self) -> &[u8] {
        &self.uint8[self.x0..self.x]
    }

    /// Ensures the buffer has at least `capacity` bytes available.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let remaining = self.uint8.len() - self.x;
        if remaining < capacity {
            let pending = self.x - self.x0;
            let required = pending + capacity;
            let new_size = if required <= self.alloc_size {
                self.alloc_size
            } else {
                required * 2
            };
            self.grow(new_size);
        }
    }

    fn grow(&mut self, new_size: usize) {
        let pending = self.x - self.x0;
        let mut new_buf = vec![0u8; new_size];
        new_buf[..pending].copy_from_slice(&self.uint8[self.x0..self.x]);
        self.uint8 = new_buf;
        self.x = pending;
        self.x0 = 0;
    }

    /// Discards pending bytes.
    pub fn reset(&mut self) {
        self.x = self.x0;
    }

    /// Returns the pending data and advances the flush position.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[self.x0..self.x].to_vec();
        self.x0 = self.x;
        result
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.ensure_capacity(1);
        self.uint8[self.x] = val;
        self.x += 1;
    }

    /// Writes an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.buf(&val.to_be_bytes());
    }

    /// Writes an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.buf(&val.to_be_bytes());
    }

    /// Writes an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.buf(&val.to_be_bytes());
    }

    /// Writes a descriptor byte followed by a big-endian `u16`.
    #[inline]
    pub fn u8u16(&mut self, head: u8, val: u16) {
        self.ensure_capacity(3);
        self.u8(head);
        self.u16(val);
    }

    /// Writes a descriptor byte followed by a big-endian `u32`.
    #[inline]
    pub fn u8u32(&mut self, head: u8, val: u32) {
        self.ensure_capacity(5);
        self.u8(head);
        self.u32(val);
    }

    /// Writes a descriptor byte followed by a big-endian `u64`.
    #[inline]
    pub fn u8u64(&mut self, head: u8, val: u64) {
        self.ensure_capacity(9);
        self.u8(head);
        self.u64(val);
    }

    /// Writes raw bytes.
    pub fn buf(&mut self, data: &[u8]) {
        let length = data.len();
        self.ensure_capacity(length);
        self.uint8[self.x..self.x + length].copy_from_slice(data);
        self.x += length;
    }
}
