//! Scripted link for deterministic testing of the framing and driver layers.
//!
//! [`MockLink`] implements [`ByteSource`] and [`ByteSink`] with pre-loaded
//! command/reply pairs. Replies are released into the receive queue when the
//! matching command is written, optionally after a delay, and are then handed
//! out one byte per [`ByteSource::try_read_byte`] call.
//!
//! # Example
//!
//! ```
//! use s7xg_transport::{ByteSink, ByteSource, MockLink};
//!
//! let mut link = MockLink::new();
//! link.expect("sip get_ver", b"\n\r>> v1.6.5-g9\n");
//! link.write_all(b"sip get_ver").unwrap();
//! assert_eq!(link.try_read_byte().unwrap(), Some(b'\n'));
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::error::{Result, TransportError};
use crate::traits::{ByteSink, ByteSource};

/// A pre-loaded command/reply pair.
#[derive(Debug, Clone)]
struct Exchange {
    /// Exact bytes the driver is expected to write.
    command: Vec<u8>,
    /// Bytes queued for reading once the command is written.
    reply: Vec<u8>,
    /// How long after the write the reply starts arriving.
    delay: Duration,
}

/// A mock [`ByteSource`] + [`ByteSink`] for testing without hardware.
///
/// Writes that do not match the next scripted exchange fail with
/// [`TransportError::Mock`]. Writes with no script left are recorded and
/// accepted silently, which models a device that never answers.
#[derive(Debug, Default)]
pub struct MockLink {
    script: VecDeque<Exchange>,
    rx: VecDeque<(Instant, u8)>,
    written: Vec<Vec<u8>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `command` is written, make `reply` readable immediately.
    pub fn expect(&mut self, command: impl AsRef<[u8]>, reply: &[u8]) {
        self.expect_delayed(command, reply, Duration::ZERO);
    }

    /// When `command` is written, make `reply` readable after `delay`.
    pub fn expect_delayed(&mut self, command: impl AsRef<[u8]>, reply: &[u8], delay: Duration) {
        self.script.push_back(Exchange {
            command: command.as_ref().to_vec(),
            reply: reply.to_vec(),
            delay,
        });
    }

    /// Make raw bytes readable right now, independent of any command.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.push_bytes_at(bytes, Instant::now());
    }

    /// Make raw bytes readable once `delay` has elapsed.
    pub fn push_bytes_after(&mut self, bytes: &[u8], delay: Duration) {
        self.push_bytes_at(bytes, Instant::now() + delay);
    }

    /// Every write seen so far, one entry per `write_all` call.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Writes decoded as text, for readable assertions.
    pub fn written_text(&self) -> Vec<String> {
        self.written
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Number of bytes queued but not yet read (including ones not yet due).
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Number of scripted exchanges not yet triggered.
    pub fn remaining_exchanges(&self) -> usize {
        self.script.len()
    }

    fn push_bytes_at(&mut self, bytes: &[u8], due: Instant) {
        // A byte is never due before the one queued ahead of it.
        let floor = self.rx.back().map(|(t, _)| *t).unwrap_or(due);
        let due = due.max(floor);
        self.rx.extend(bytes.iter().map(|b| (due, *b)));
    }
}

impl ByteSource for MockLink {
    fn try_read_byte(&mut self) -> Result<Option<u8>> {
        match self.rx.front() {
            Some((due, _)) if *due <= Instant::now() => Ok(self.rx.pop_front().map(|(_, b)| b)),
            _ => Ok(None),
        }
    }
}

impl ByteSink for MockLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.push(bytes.to_vec());

        let Some(next) = self.script.front() else {
            return Ok(());
        };
        if next.command != bytes {
            return Err(TransportError::Mock(format!(
                "unexpected write: expected {:?}, got {:?}",
                String::from_utf8_lossy(&next.command),
                String::from_utf8_lossy(bytes)
            )));
        }
        if let Some(exchange) = self.script.pop_front() {
            self.push_bytes_at(&exchange.reply, Instant::now() + exchange.delay);
        }
        Ok(())
    }
}
