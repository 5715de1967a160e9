use std::time::Duration;

/// Errors that can occur while recovering frames from the byte stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No complete frame arrived before the deadline.
    #[error("no frame received within {0:?}")]
    Timeout(Duration),

    /// The accumulation buffer filled up before an end marker was seen.
    #[error("frame exceeds accumulation buffer ({capacity} bytes)")]
    BufferOverflow { capacity: usize },

    /// The underlying link failed.
    #[error("frame transport error: {0}")]
    Transport(#[from] s7xg_transport::TransportError),
}

/// Errors from the hex payload codec.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HexError {
    /// The decoded bytes would not fit the destination.
    #[error("decoded hex needs {needed} bytes, destination holds {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    /// The filtered digits were rejected by the decoder.
    #[error("invalid hex digits: {0}")]
    Digits(#[from] ::hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
