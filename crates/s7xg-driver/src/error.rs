use std::time::Duration;

use s7xg_frame::{FrameError, HexError};
use s7xg_transport::TransportError;

use crate::status::Status;

/// Errors that can occur while driving the module.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Framing or transport failure while waiting for a reply.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Hex payload did not fit its destination or was not hex.
    #[error("hex error: {0}")]
    Hex(#[from] HexError),

    /// The module answered `Invalid` or `Unknown command!`.
    #[error("module rejected command {command:?}")]
    InvalidCommand { command: String },

    /// The module answered with a known failure token.
    #[error("{command:?} failed: {status}")]
    Protocol { command: String, status: Status },

    /// A reply did not match the grammar expected for it.
    #[error("cannot decode {what}: expected {expected} fields, found {found} in {payload:?}")]
    Decode {
        what: &'static str,
        expected: usize,
        found: usize,
        payload: String,
    },

    /// A command argument is out of range; nothing was written.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A reply outside the vocabulary of the command that produced it.
    #[error("unexpected reply to {command:?}: {reply:?}")]
    UnexpectedReply { command: String, reply: String },
}

impl From<TransportError> for DriverError {
    fn from(err: TransportError) -> Self {
        DriverError::Frame(FrameError::Transport(err))
    }
}

/// Coarse classification of a [`DriverError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No frame arrived before the deadline.
    Timeout,
    /// The module rejected the command text.
    InvalidCommand,
    /// The module reported a domain failure token.
    Protocol,
    /// The reply did not match its grammar.
    Decode,
    /// A frame outgrew the accumulation buffer.
    BufferOverflow,
    /// Hex decode output would not fit.
    CapacityExceeded,
    /// The byte link failed.
    Transport,
    /// Rejected on the host before anything was sent.
    InvalidArgument,
}

impl DriverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::Frame(FrameError::Timeout(_)) => ErrorKind::Timeout,
            DriverError::Frame(FrameError::BufferOverflow { .. }) => ErrorKind::BufferOverflow,
            DriverError::Frame(FrameError::Transport(_)) => ErrorKind::Transport,
            DriverError::Hex(HexError::CapacityExceeded { .. }) => ErrorKind::CapacityExceeded,
            DriverError::Hex(HexError::Digits(_)) => ErrorKind::Decode,
            DriverError::InvalidCommand { .. } => ErrorKind::InvalidCommand,
            DriverError::Protocol { .. } => ErrorKind::Protocol,
            DriverError::Decode { .. } | DriverError::UnexpectedReply { .. } => ErrorKind::Decode,
            DriverError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    /// The deadline that expired, when this is a timeout.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            DriverError::Frame(FrameError::Timeout(d)) => Some(*d),
            _ => None,
        }
    }

    /// The failure token, when the module reported one.
    pub fn status(&self) -> Option<Status> {
        match self {
            DriverError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_wrapped_error() {
        let timeout = DriverError::from(FrameError::Timeout(Duration::from_millis(5)));
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(timeout.timeout(), Some(Duration::from_millis(5)));

        let overflow = DriverError::from(FrameError::BufferOverflow { capacity: 256 });
        assert_eq!(overflow.kind(), ErrorKind::BufferOverflow);

        let closed = DriverError::from(TransportError::Closed);
        assert_eq!(closed.kind(), ErrorKind::Transport);

        let hex = DriverError::from(HexError::CapacityExceeded {
            needed: 4,
            capacity: 2,
        });
        assert_eq!(hex.kind(), ErrorKind::CapacityExceeded);
    }

    #[test]
    fn reply_outside_grammar_is_a_decode_failure() {
        let err = DriverError::UnexpectedReply {
            command: "sip get_hw_model".into(),
            reply: "S99X".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn protocol_error_exposes_status() {
        let err = DriverError::Protocol {
            command: "mac tx ucnf 1 00".into(),
            status: Status::NotJoined,
        };
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.status(), Some(Status::NotJoined));
        assert!(err.to_string().contains("not_joined"));
    }

    #[test]
    fn decode_error_message_names_counts() {
        let err = DriverError::Decode {
            what: "rx2 parameters",
            expected: 2,
            found: 1,
            payload: "3".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(
            err.to_string(),
            "cannot decode rx2 parameters: expected 2 fields, found 1 in \"3\""
        );
    }
}
