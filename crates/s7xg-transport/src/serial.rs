use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, info, trace};

use crate::error::{Result, TransportError};
use crate::traits::{ByteSink, ByteSource};

/// Factory default UART speed of S76G/S78G modules.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

const WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Bytes pulled from the port per read.
const RX_CHUNK: usize = 64;

/// Serial port link to a module.
///
/// Reads are only attempted when the driver reports pending input, so
/// [`ByteSource::try_read_byte`] never blocks. Pending input is read in
/// chunks and handed out one byte at a time.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    path: PathBuf,
    rx: RxBuffer,
}

/// Bytes already read from the port but not yet handed out.
#[derive(Debug)]
struct RxBuffer {
    buf: [u8; RX_CHUNK],
    pos: usize,
    len: usize,
}

impl Default for RxBuffer {
    fn default() -> Self {
        Self {
            buf: [0; RX_CHUNK],
            pos: 0,
            len: 0,
        }
    }
}

impl RxBuffer {
    fn pop(&mut self) -> Option<u8> {
        if self.pos < self.len {
            let byte = self.buf[self.pos];
            self.pos += 1;
            Some(byte)
        } else {
            None
        }
    }

    /// Read up to `available` bytes (capped at the chunk size) from `src`.
    /// Returns the number of bytes now buffered.
    fn fill(&mut self, src: &mut impl Read, available: usize) -> Result<usize> {
        let want = available.min(RX_CHUNK);
        loop {
            match src.read(&mut self.buf[..want]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => {
                    trace!(len = n, "rx");
                    self.pos = 0;
                    self.len = n;
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::TimedOut => return Ok(0),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn reset(&mut self) {
        self.pos = 0;
        self.len = 0;
    }
}

impl SerialLink {
    /// Open `path` at `baud` (8N1, no flow control).
    pub fn open(path: impl AsRef<Path>, baud: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let port = serialport::new(path.to_string_lossy(), baud)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|err| TransportError::Open {
                path: path.clone(),
                source: err.into(),
            })?;
        info!(?path, baud, "opened serial port");
        Ok(Self {
            port,
            path,
            rx: RxBuffer::default(),
        })
    }

    /// The device path this link was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop everything the OS has buffered in both directions.
    pub fn clear(&mut self) -> Result<()> {
        debug!(path = ?self.path, "clearing serial buffers");
        self.rx.reset();
        self.port.clear(ClearBuffer::All)?;
        Ok(())
    }
}

impl ByteSource for SerialLink {
    fn try_read_byte(&mut self) -> Result<Option<u8>> {
        if let Some(byte) = self.rx.pop() {
            return Ok(Some(byte));
        }
        let available = self.port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(None);
        }
        self.rx.fill(&mut self.port, available)?;
        Ok(self.rx.pop())
    }
}

impl ByteSink for SerialLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        Write::write_all(&mut self.port, bytes)?;
        ByteSink::flush(self)
    }

    fn flush(&mut self) -> Result<()> {
        Write::flush(&mut self.port)?;
        Ok(())
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink").field("path", &self.path).finish()
    }
}
