//! Byte stream seams the drivers are bound to.
//!
//! [`DecRead`] and [`EncWrite`] are the whole transport contract: the drivers
//! never buffer beyond one descriptor byte on the read side and never buffer
//! at all on the write side.

use std::io::{self, Read as _, Write as _};

use cbor_driver_buffers::{Reader, Writer};

use crate::error::{CborError, Result};

/// Input side of the decoder.
pub trait DecRead<'de> {
    /// Reads exactly one byte.
    fn read_u8(&mut self) -> Result<u8>;

    /// Pushes the byte returned by the last [`DecRead::read_u8`] back onto
    /// the stream.
    fn unread_u8(&mut self) -> Result<()>;

    /// Fills `buf` completely.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Appends exactly `n` bytes to `buf`. Implementations grow `buf` only
    /// as bytes actually arrive, so a hostile length cannot force a large
    /// allocation up front.
    fn read_append(&mut self, buf: &mut Vec<u8>, n: usize) -> Result<()>;

    /// Returns a view of the next `n` bytes borrowed from the underlying
    /// buffer, or `None` (consuming nothing) if the stream cannot lend one.
    fn read_borrowed(&mut self, n: usize) -> Result<Option<&'de [u8]>> {
        let _ = n;
        Ok(None)
    }

    /// Reads exactly `N` bytes into an array.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_into(&mut out)?;
        Ok(out)
    }
}

/// Zero-copy source over an in-memory slice.
#[derive(Debug, Clone)]
pub struct SliceRead<'de> {
    reader: Reader<'de>,
}

impl<'de> SliceRead<'de> {
    pub fn new(bytes: &'de [u8]) -> Self {
        Self {
            reader: Reader::new(bytes),
        }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.reader.x
    }

    /// Number of bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.reader.size()
    }
}

impl<'de> DecRead<'de> for SliceRead<'de> {
    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.reader.u8()?)
    }

    fn unread_u8(&mut self) -> Result<()> {
        Ok(self.reader.unread(1)?)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        buf.copy_from_slice(self.reader.buf(buf.len())?);
        Ok(())
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        Ok(self.reader.array()?)
    }

    fn read_append(&mut self, buf: &mut Vec<u8>, n: usize) -> Result<()> {
        buf.extend_from_slice(self.reader.buf(n)?);
        Ok(())
    }

    fn read_borrowed(&mut self, n: usize) -> Result<Option<&'de [u8]>> {
        Ok(Some(self.reader.buf(n)?))
    }
}

/// Source over any [`io::Read`], with one byte of push-back.
#[derive(Debug)]
pub struct IoRead<R> {
    inner: R,
    last: Option<u8>,
    pending: bool,
}

impl<R: io::Read> IoRead<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            last: None,
            pending: false,
        }
    }

    /// Returns the wrapped reader. A pushed-back byte is lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn take_pending(&mut self) -> Option<u8> {
        if self.pending {
            self.pending = false;
            self.last
        } else {
            None
        }
    }
}

fn map_io(e: io::Error) -> CborError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        CborError::UnexpectedEof
    } else {
        CborError::Io(e)
    }
}

impl<'de, R: io::Read> DecRead<'de> for IoRead<R> {
    fn read_u8(&mut self) -> Result<u8> {
        if let Some(b) = self.take_pending() {
            return Ok(b);
        }
        let mut b = [0u8; 1];
        self.inner.read_exact(&mut b).map_err(map_io)?;
        self.last = Some(b[0]);
        Ok(b[0])
    }

    fn unread_u8(&mut self) -> Result<()> {
        if self.pending || self.last.is_none() {
            return Err(CborError::Io(io::Error::other("no byte to unread")));
        }
        self.pending = true;
        Ok(())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let rest = match self.take_pending() {
            Some(b) => {
                buf[0] = b;
                &mut buf[1..]
            }
            None => buf,
        };
        self.inner.read_exact(rest).map_err(map_io)?;
        self.last = None;
        Ok(())
    }

    fn read_append(&mut self, buf: &mut Vec<u8>, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        let mut want = n;
        if let Some(b) = self.take_pending() {
            buf.push(b);
            want -= 1;
        }
        let got = (&mut self.inner)
            .take(want as u64)
            .read_to_end(buf)
            .map_err(map_io)?;
        self.last = None;
        if got < want {
            return Err(CborError::UnexpectedEof);
        }
        Ok(())
    }
}

/// Output side of the encoder.
pub trait EncWrite {
    fn write_u8(&mut self, b: u8) -> Result<()>;
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Descriptor byte followed by a big-endian `u16`.
    fn write_u8u16(&mut self, head: u8, val: u16) -> Result<()> {
        let [b0, b1] = val.to_be_bytes();
        self.write_all(&[head, b0, b1])
    }

    fn write_u8u32(&mut self, head: u8, val: u32) -> Result<()> {
        let mut x = [head; 5];
        x[1..].copy_from_slice(&val.to_be_bytes());
        self.write_all(&x)
    }

    fn write_u8u64(&mut self, head: u8, val: u64) -> Result<()> {
        let mut x = [head; 9];
        x[1..].copy_from_slice(&val.to_be_bytes());
        self.write_all(&x)
    }
}

impl EncWrite for Writer {
    #[inline]
    fn write_u8(&mut self, b: u8) -> Result<()> {
        self.u8(b);
        Ok(())
    }

    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf(bytes);
        Ok(())
    }

    #[inline]
    fn write_u8u16(&mut self, head: u8, val: u16) -> Result<()> {
        self.u8u16(head, val);
        Ok(())
    }

    #[inline]
    fn write_u8u32(&mut self, head: u8, val: u32) -> Result<()> {
        self.u8u32(head, val);
        Ok(())
    }

    #[inline]
    fn write_u8u64(&mut self, head: u8, val: u64) -> Result<()> {
        self.u8u64(head, val);
        Ok(())
    }
}

impl EncWrite for Vec<u8> {
    #[inline]
    fn write_u8(&mut self, b: u8) -> Result<()> {
        self.push(b);
        Ok(())
    }

    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<W: EncWrite + ?Sized> EncWrite for &mut W {
    #[inline]
    fn write_u8(&mut self, b: u8) -> Result<()> {
        (**self).write_u8(b)
    }

    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }

    #[inline]
    fn write_u8u16(&mut self, head: u8, val: u16) -> Result<()> {
        (**self).write_u8u16(head, val)
    }

    #[inline]
    fn write_u8u32(&mut self, head: u8, val: u32) -> Result<()> {
        (**self).write_u8u32(head, val)
    }

    #[inline]
    fn write_u8u64(&mut self, head: u8, val: u64) -> Result<()> {
        (**self).write_u8u64(head, val)
    }
}

/// Sink over any [`io::Write`]. Write failures propagate as [`CborError::Io`].
#[derive(Debug)]
pub struct IoWrite<W>(pub W);

impl<W: io::Write> IoWrite<W> {
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: io::Write> EncWrite for IoWrite<W> {
    fn write_u8(&mut self, b: u8) -> Result<()> {
        Ok(self.0.write_all(&[b])?)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        Ok(self.0.write_all(bytes)?)
    }
}
