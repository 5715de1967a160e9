//! Reply framing and hex payload codec for S7xG modules.
//!
//! The module answers every command, and announces every unsolicited event,
//! with a prompt-delimited text frame:
//! - A 4-byte start marker `\n\r>>` followed by one separator byte
//! - A variable-length text payload
//! - A single `\n` end marker
//!
//! There is no length field and no checksum. [`FrameReader`] recovers frames
//! from the byte stream one byte at a time under a per-call timeout.

pub mod codec;
pub mod error;
pub mod hex;
pub mod reader;

pub use codec::{
    encode_frame, Frame, FrameConfig, DEFAULT_FRAME_CAPACITY, END_MARKER, MIN_FRAME_CAPACITY,
    PAYLOAD_OFFSET, SEPARATOR, START_MARKER,
};
pub use error::{FrameError, HexError, Result};
pub use reader::{FrameReader, DISCARD_LIMIT_FRAMES};
