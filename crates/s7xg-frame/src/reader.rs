use std::time::{Duration, Instant};

use bytes::{BufMut, Bytes, BytesMut};
use s7xg_transport::ByteSource;
use tracing::{debug, trace, warn};

use crate::codec::{Frame, FrameConfig, END_MARKER, MIN_FRAME_CAPACITY, PAYLOAD_OFFSET, START_MARKER};
use crate::error::{FrameError, Result};

/// Accumulation buffers' worth of bytes [`FrameReader::discard_pending`]
/// still drains after its window has passed.
pub const DISCARD_LIMIT_FRAMES: usize = 4;

/// Recovers prompt-delimited frames from a [`ByteSource`].
///
/// Bytes are pulled one at a time into a bounded accumulation buffer. Each
/// call to [`read_frame`](Self::read_frame) starts a fresh window: nothing
/// accumulated by an earlier call that timed out or failed is carried over.
pub struct FrameReader<L> {
    inner: L,
    buf: BytesMut,
    config: FrameConfig,
}

impl<L: ByteSource> FrameReader<L> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: L) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    ///
    /// Capacities below [`MIN_FRAME_CAPACITY`] are raised to it.
    pub fn with_config(inner: L, mut config: FrameConfig) -> Self {
        config.capacity = config.capacity.max(MIN_FRAME_CAPACITY);
        Self {
            inner,
            buf: BytesMut::with_capacity(config.capacity),
            config,
        }
    }

    /// Read the next complete frame, waiting at most `timeout` for bytes.
    ///
    /// The deadline is only checked while no byte is available, so a frame
    /// whose bytes are already flowing is finished. `Duration::ZERO` consumes
    /// whatever has already arrived and never waits.
    pub fn read_frame(&mut self, timeout: Duration) -> Result<Frame> {
        self.buf.clear();
        let started = Instant::now();

        loop {
            let byte = match self.inner.try_read_byte() {
                Ok(byte) => byte,
                Err(err) => {
                    self.buf.clear();
                    return Err(FrameError::Transport(err));
                }
            };

            match byte {
                Some(byte) => {
                    if let Some(frame) = self.accept(byte)? {
                        return Ok(frame);
                    }
                }
                None => {
                    let elapsed = started.elapsed();
                    if elapsed >= timeout {
                        if !self.buf.is_empty() {
                            debug!(
                                partial = self.buf.len(),
                                "frame wait timed out; dropping partial frame"
                            );
                        }
                        self.buf.clear();
                        return Err(FrameError::Timeout(timeout));
                    }
                    if !self.config.poll_interval.is_zero() {
                        std::thread::sleep(self.config.poll_interval.min(timeout - elapsed));
                    }
                }
            }
        }
    }

    /// Throw away every byte that arrives within `window`, plus anything
    /// already buffered. Returns the number of bytes dropped.
    ///
    /// A reply that lands after its command timed out would otherwise be read
    /// as the answer to the next command. Once the window has passed, at most
    /// [`DISCARD_LIMIT_FRAMES`] buffers' worth of bytes are still drained, so
    /// a link that never goes quiet cannot hold the caller.
    pub fn discard_pending(&mut self, window: Duration) -> Result<usize> {
        self.buf.clear();
        let started = Instant::now();
        let limit = self.config.capacity.saturating_mul(DISCARD_LIMIT_FRAMES);
        let mut dropped = 0usize;

        loop {
            let expired = started.elapsed() >= window;
            if expired && dropped >= limit {
                warn!(dropped, "link still busy after discard window");
                break;
            }
            match self.inner.try_read_byte()? {
                Some(_) => dropped += 1,
                None if expired => break,
                None => {
                    if !self.config.poll_interval.is_zero() {
                        std::thread::sleep(self.config.poll_interval);
                    }
                }
            }
        }

        if dropped > 0 {
            debug!(dropped, "discarded pending bytes");
        }
        Ok(dropped)
    }

    fn accept(&mut self, byte: u8) -> Result<Option<Frame>> {
        if self.buf.len() >= self.config.capacity {
            let capacity = self.config.capacity;
            self.buf.clear();
            warn!(capacity, "no end marker before accumulation buffer filled");
            return Err(FrameError::BufferOverflow { capacity });
        }

        self.buf.put_u8(byte);
        let len = self.buf.len();

        if len <= START_MARKER.len() {
            if self.config.resync_on_noise && byte != START_MARKER[len - 1] {
                self.resync();
            }
            return Ok(None);
        }

        if byte == END_MARKER && len > PAYLOAD_OFFSET && self.buf[..START_MARKER.len()] == START_MARKER
        {
            let payload = Bytes::copy_from_slice(&self.buf[PAYLOAD_OFFSET..len - 1]);
            self.buf.clear();
            trace!(len = payload.len(), "frame complete");
            return Ok(Some(Frame { payload }));
        }

        Ok(None)
    }

    /// Shift the window forward to the longest tail that could still start
    /// a marker.
    fn resync(&mut self) {
        let mut skip = 1;
        while skip < self.buf.len() && !START_MARKER.starts_with(&self.buf[skip..]) {
            skip += 1;
        }
        trace!(skip, "resynchronizing on start marker");
        let _ = self.buf.split_to(skip);
    }

    /// Borrow the underlying link.
    pub fn get_ref(&self) -> &L {
        &self.inner
    }

    /// Mutably borrow the underlying link.
    pub fn get_mut(&mut self) -> &mut L {
        &mut self.inner
    }

    /// Consume the reader and return the inner link.
    pub fn into_inner(self) -> L {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<L> std::fmt::Debug for FrameReader<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader")
            .field("buffered", &self.buf.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use s7xg_transport::{MockLink, TransportError};

    use super::*;
    use crate::codec::{encode_frame, DEFAULT_FRAME_CAPACITY};

    const SHORT: Duration = Duration::from_millis(20);

    fn wire(payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(payload, &mut buf);
        buf.to_vec()
    }

    fn reader_with(bytes: &[u8]) -> FrameReader<MockLink> {
        let mut link = MockLink::new();
        link.push_bytes(bytes);
        FrameReader::new(link)
    }

    #[test]
    fn read_single_frame() {
        let mut reader = reader_with(&wire(b"Ok"));
        let frame = reader.read_frame(SHORT).unwrap();
        assert_eq!(frame.payload.as_ref(), b"Ok");
        assert_eq!(reader.get_ref().pending(), 0);
    }

    #[test]
    fn read_multiple_frames() {
        let mut bytes = wire(b"Ok");
        bytes.extend(wire(b"accepted"));
        let mut reader = reader_with(&bytes);

        assert_eq!(reader.read_frame(SHORT).unwrap().payload.as_ref(), b"Ok");
        assert_eq!(
            reader.read_frame(SHORT).unwrap().payload.as_ref(),
            b"accepted"
        );
    }

    #[test]
    fn leaves_following_bytes_unread() {
        let mut bytes = wire(b"Ok");
        bytes.extend_from_slice(b"\n\r");
        let mut reader = reader_with(&bytes);

        reader.read_frame(SHORT).unwrap();
        assert_eq!(reader.get_ref().pending(), 2);
    }

    #[test]
    fn payloads_up_to_capacity_round_trip() {
        for len in [0usize, 1, 17, DEFAULT_FRAME_CAPACITY - 6] {
            let payload: Vec<u8> = (0..len).map(|i| b'A' + (i % 26) as u8).collect();
            let mut reader = reader_with(&wire(&payload));
            let frame = reader.read_frame(SHORT).unwrap();
            assert_eq!(frame.payload.as_ref(), payload.as_slice(), "len {len}");
        }
    }

    #[test]
    fn payload_past_capacity_overflows() {
        let payload = vec![b'x'; DEFAULT_FRAME_CAPACITY - 5];
        let mut reader = reader_with(&wire(&payload));
        let err = reader.read_frame(SHORT).unwrap_err();
        assert!(matches!(
            err,
            FrameError::BufferOverflow {
                capacity: DEFAULT_FRAME_CAPACITY
            }
        ));
    }

    #[test]
    fn noise_without_marker_overflows() {
        let mut reader = reader_with(&[b'a'; 300]);
        let err = reader.read_frame(SHORT).unwrap_err();
        assert!(matches!(err, FrameError::BufferOverflow { .. }));
    }

    #[test]
    fn times_out_without_bytes() {
        let mut reader = FrameReader::new(MockLink::new());
        let started = Instant::now();
        let err = reader.read_frame(SHORT).unwrap_err();
        assert!(matches!(err, FrameError::Timeout(d) if d == SHORT));
        assert!(started.elapsed() >= SHORT);

        let err = reader.read_frame(SHORT).unwrap_err();
        assert!(matches!(err, FrameError::Timeout(_)));
    }

    #[test]
    fn partial_marker_is_not_carried_across_calls() {
        let mut reader = reader_with(b"\n\r");
        assert!(matches!(
            reader.read_frame(SHORT),
            Err(FrameError::Timeout(_))
        ));

        reader.get_mut().push_bytes(b">> Ok\n");
        assert!(matches!(
            reader.read_frame(SHORT),
            Err(FrameError::Timeout(_))
        ));
    }

    #[test]
    fn end_marker_in_separator_slot_does_not_complete() {
        let mut reader = reader_with(b"\n\r>>\n");
        assert!(matches!(
            reader.read_frame(SHORT),
            Err(FrameError::Timeout(_))
        ));
    }

    #[test]
    fn leading_noise_is_fatal_without_resync() {
        let mut bytes = b"xx".to_vec();
        bytes.extend(wire(b"Ok"));
        let mut reader = reader_with(&bytes);
        assert!(matches!(
            reader.read_frame(SHORT),
            Err(FrameError::Timeout(_))
        ));
    }

    #[test]
    fn leading_noise_is_skipped_with_resync() {
        let mut bytes = b"\nxx\n".to_vec();
        bytes.extend(wire(b"Ok"));
        let mut link = MockLink::new();
        link.push_bytes(&bytes);
        let config = FrameConfig {
            resync_on_noise: true,
            ..FrameConfig::default()
        };
        let mut reader = FrameReader::with_config(link, config);

        assert_eq!(reader.read_frame(SHORT).unwrap().payload.as_ref(), b"Ok");
    }

    #[test]
    fn zero_timeout_only_uses_buffered_bytes() {
        let mut reader = reader_with(&wire(b"radio_rx 00 -1 2"));
        let frame = reader.read_frame(Duration::ZERO).unwrap();
        assert_eq!(frame.text(), "radio_rx 00 -1 2");

        let started = Instant::now();
        assert!(matches!(
            reader.read_frame(Duration::ZERO),
            Err(FrameError::Timeout(_))
        ));
        assert!(started.elapsed() < Duration::from_millis(10));
    }

    #[test]
    fn delayed_bytes_within_deadline_are_read() {
        let mut link = MockLink::new();
        link.push_bytes_after(&wire(b"v1.6.5-g9"), Duration::from_millis(15));
        let mut reader = FrameReader::new(link);

        let frame = reader.read_frame(Duration::from_millis(500)).unwrap();
        assert_eq!(frame.payload.as_ref(), b"v1.6.5-g9");
    }

    #[test]
    fn transport_error_propagates() {
        let mut reader = FrameReader::new(FailingSource);
        let err = reader.read_frame(SHORT).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Closed)
        ));
    }

    #[test]
    fn discard_pending_drains_link() {
        let mut reader = reader_with(b"\n\r>> late reply\n");
        let dropped = reader.discard_pending(Duration::ZERO).unwrap();
        assert_eq!(dropped, 16);
        assert_eq!(reader.get_ref().pending(), 0);
    }

    #[test]
    fn discard_pending_waits_out_window() {
        let mut link = MockLink::new();
        link.push_bytes_after(b"late", Duration::from_millis(10));
        let mut reader = FrameReader::new(link);

        let dropped = reader.discard_pending(Duration::from_millis(40)).unwrap();
        assert_eq!(dropped, 4);
    }

    #[test]
    fn discard_pending_returns_on_endless_link() {
        let mut reader = FrameReader::new(Chatter);
        let started = Instant::now();

        let dropped = reader.discard_pending(Duration::from_millis(10)).unwrap();
        assert!(dropped >= MIN_FRAME_CAPACITY * DISCARD_LIMIT_FRAMES);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn capacity_is_raised_to_minimum() {
        let config = FrameConfig {
            capacity: 8,
            ..FrameConfig::default()
        };
        let reader = FrameReader::with_config(MockLink::new(), config);
        assert_eq!(reader.config().capacity, MIN_FRAME_CAPACITY);
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = FrameReader::new(MockLink::new());
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    struct Chatter;

    impl ByteSource for Chatter {
        fn try_read_byte(&mut self) -> s7xg_transport::Result<Option<u8>> {
            Ok(Some(b'x'))
        }
    }

    struct FailingSource;

    impl ByteSource for FailingSource {
        fn try_read_byte(&mut self) -> s7xg_transport::Result<Option<u8>> {
            Err(TransportError::Closed)
        }
    }
}
