use std::borrow::Cow;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

/// Start marker: `\n\r>>` (0x0A 0x0D 0x3E 0x3E).
pub const START_MARKER: [u8; 4] = [0x0A, 0x0D, 0x3E, 0x3E];

/// End marker: `\n` (0x0A).
pub const END_MARKER: u8 = 0x0A;

/// Byte the module prints between the prompt and the payload.
pub const SEPARATOR: u8 = b' ';

/// Payload starts after the start marker and the separator byte.
pub const PAYLOAD_OFFSET: usize = START_MARKER.len() + 1;

/// Default accumulation buffer size, matching the module's line buffer.
pub const DEFAULT_FRAME_CAPACITY: usize = 256;

/// Smallest accumulation buffer the reader will run with.
pub const MIN_FRAME_CAPACITY: usize = 256;

/// One reply or event recovered from the byte stream.
///
/// The payload is copied out of the reader's accumulation buffer, so a frame
/// never aliases reader state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Bytes between the separator and the end marker.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Payload as text; the module speaks ASCII, anything else is replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// The total wire size of this frame (markers + separator + payload).
    pub fn wire_size(&self) -> usize {
        PAYLOAD_OFFSET + self.payload.len() + 1
    }
}

/// Encode a payload the way the module frames it on the wire.
///
/// Wire format:
/// ```text
/// ┌─────────────────────┬───────────┬──────────────┬──────┐
/// │ Start (4B)          │ Sep (1B)  │ Payload      │ End  │
/// │ 0x0A 0x0D 0x3E 0x3E │ 0x20      │ (text)       │ 0x0A │
/// └─────────────────────┴───────────┴──────────────┴──────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(PAYLOAD_OFFSET + payload.len() + 1);
    dst.put_slice(&START_MARKER);
    dst.put_u8(SEPARATOR);
    dst.put_slice(payload);
    dst.put_u8(END_MARKER);
}

/// Configuration for the frame reader.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Accumulation buffer size in bytes. Default and minimum: 256.
    pub capacity: usize,
    /// Sleep between polls that found no byte. Zero busy-polls.
    pub poll_interval: Duration,
    /// Drop leading bytes that cannot start a frame instead of requiring the
    /// start marker at offset 0.
    pub resync_on_noise: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_FRAME_CAPACITY,
            poll_interval: Duration::from_millis(1),
            resync_on_noise: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_layout() {
        let mut buf = BytesMut::new();
        encode_frame(b"Ok", &mut buf);
        assert_eq!(
            buf.as_ref(),
            &[0x0A, 0x0D, 0x3E, 0x3E, 0x20, b'O', b'k', 0x0A]
        );
    }

    #[test]
    fn empty_payload_frame() {
        let mut buf = BytesMut::new();
        encode_frame(b"", &mut buf);
        assert_eq!(buf.len(), PAYLOAD_OFFSET + 1);
    }

    #[test]
    fn frame_wire_size() {
        let frame = Frame::new(Bytes::from_static(b"busy"));
        assert_eq!(frame.wire_size(), 10);
    }

    #[test]
    fn frame_text_is_lossy() {
        let frame = Frame::new(vec![b'o', 0xFF, b'n']);
        assert_eq!(frame.text(), "o\u{FFFD}n");
    }
}
