use std::io::{ErrorKind, Read, Write};

use tracing::trace;

use crate::error::{Result, TransportError};

/// Non-blocking, byte-at-a-time receive side of a link.
pub trait ByteSource {
    /// Take the next byte if one has already arrived.
    ///
    /// Returns `Ok(None)` when nothing is available right now. Implementations
    /// must not block waiting for data; the frame reader owns the wait loop.
    fn try_read_byte(&mut self) -> Result<Option<u8>>;
}

/// Transmit side of a link.
pub trait ByteSink {
    /// Write every byte of `bytes`, in order.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Push buffered bytes out to the device.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A full-duplex byte link: what the driver owns for its whole lifetime.
pub trait ByteLink: ByteSource + ByteSink {}

impl<T: ByteSource + ByteSink + ?Sized> ByteLink for T {}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn try_read_byte(&mut self) -> Result<Option<u8>> {
        (**self).try_read_byte()
    }
}

impl<T: ByteSink + ?Sized> ByteSink for Box<T> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Adapts any `Read + Write` stream into a [`ByteLink`].
///
/// The stream should be configured non-blocking or with a short read timeout:
/// `WouldBlock` and `TimedOut` are reported as "no byte available".
pub struct IoLink<T> {
    inner: T,
}

impl<T> IoLink<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the link and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> ByteSource for IoLink<T> {
    fn try_read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(_) => {
                    trace!(byte = byte[0], "rx");
                    return Ok(Some(byte[0]));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    return Ok(None)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<T: Write> ByteSink for IoLink<T> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<T> std::fmt::Debug for IoLink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoLink").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_bytes_until_end_of_stream() {
        let mut link = IoLink::new(Cursor::new(b"ab".to_vec()));
        assert_eq!(link.try_read_byte().unwrap(), Some(b'a'));
        assert_eq!(link.try_read_byte().unwrap(), Some(b'b'));
        assert!(matches!(link.try_read_byte(), Err(TransportError::Closed)));
    }

    #[test]
    fn would_block_reads_as_no_byte() {
        let mut link = IoLink::new(WouldBlockThenData { blocked: false });
        assert_eq!(link.try_read_byte().unwrap(), None);
        assert_eq!(link.try_read_byte().unwrap(), Some(0x42));
    }

    #[test]
    fn interrupted_read_retries() {
        let mut link = IoLink::new(InterruptedOnce { interrupted: false });
        assert_eq!(link.try_read_byte().unwrap(), Some(0x7F));
    }

    #[test]
    fn write_all_retries_partial_and_interrupted_writes() {
        let mut link = IoLink::new(ChunkedWriter {
            data: Vec::new(),
            interrupted: false,
        });
        link.write_all(b"sip get_ver").unwrap();
        assert_eq!(link.get_ref().data, b"sip get_ver");
    }

    #[test]
    fn write_returning_zero_is_closed() {
        let mut link = IoLink::new(ZeroWriter);
        assert!(matches!(link.write_all(b"x"), Err(TransportError::Closed)));
    }

    #[test]
    fn boxed_link_forwards() {
        let mut link: Box<IoLink<Cursor<Vec<u8>>>> = Box::new(IoLink::new(Cursor::new(vec![9])));
        assert_eq!(link.try_read_byte().unwrap(), Some(9));
        link.write_all(b"z").unwrap();
    }

    struct WouldBlockThenData {
        blocked: bool,
    }

    impl Read for WouldBlockThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.blocked {
                self.blocked = true;
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            buf[0] = 0x42;
            Ok(1)
        }
    }

    struct InterruptedOnce {
        interrupted: bool,
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            buf[0] = 0x7F;
            Ok(1)
        }
    }

    struct ChunkedWriter {
        data: Vec<u8>,
        interrupted: bool,
    }

    impl Write for ChunkedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            let n = buf.len().min(3);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
