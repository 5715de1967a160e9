//! Status tokens.
//!
//! The module reports success and failure as whole-line words that share a
//! shape with ordinary data. Classification is by full-string equality, never
//! by prefix or substring: `"Ok"` is a status, `"Okay"` is data.

use std::fmt;

use serde::Serialize;

use crate::error::DriverError;

/// A known status payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Ok,
    Invalid,
    Busy,
    NotJoined,
    AlreadyJoined,
    InvalidDataLength,
    ExceededDataLength,
    KeysNotInit,
    NoFreeChannel,
    GpsNotInit,
    GpsInIdle,
    GpsNotPositioning,
    UnknownCommand,
    /// The GNSS UART is wired to the host and blocks GNSS commands.
    GpsUartConflict,
    /// Second-stage answer to an uplink that was not sent.
    TxFailed,
}

const TABLE: &[(&str, Status)] = &[
    ("Ok", Status::Ok),
    ("Invalid", Status::Invalid),
    ("busy", Status::Busy),
    ("not_joined", Status::NotJoined),
    ("already_joined", Status::AlreadyJoined),
    ("invalid_data_length", Status::InvalidDataLength),
    ("exceeded_data_length", Status::ExceededDataLength),
    ("keys_not_init", Status::KeysNotInit),
    ("no_free_ch", Status::NoFreeChannel),
    ("gps_not_init", Status::GpsNotInit),
    ("gps_in_idle", Status::GpsInIdle),
    ("gps_not_positioning", Status::GpsNotPositioning),
    ("Unknown command!", Status::UnknownCommand),
    ("Please disconnect UART4 TX/RX", Status::GpsUartConflict),
    ("err", Status::TxFailed),
];

impl Status {
    /// Classify a reply payload. `None` means the payload is data.
    pub fn classify(payload: &str) -> Option<Status> {
        TABLE
            .iter()
            .find(|(token, _)| *token == payload)
            .map(|(_, status)| *status)
    }

    /// The exact payload the module sends.
    pub fn token(self) -> &'static str {
        TABLE
            .iter()
            .find(|(_, status)| *status == self)
            .map(|(token, _)| *token)
            .unwrap_or("")
    }

    /// Whether the module rejected the command text itself.
    pub fn is_rejection(self) -> bool {
        matches!(self, Status::Invalid | Status::UnknownCommand)
    }

    /// The error this status means for `command`; `None` for [`Status::Ok`].
    pub fn into_error(self, command: &str) -> Option<DriverError> {
        match self {
            Status::Ok => None,
            s if s.is_rejection() => Some(DriverError::InvalidCommand {
                command: command.to_string(),
            }),
            status => Some(DriverError::Protocol {
                command: command.to_string(),
                status,
            }),
        }
    }

    /// Human-readable explanation.
    pub fn description(self) -> &'static str {
        match self {
            Status::Ok => "command accepted",
            Status::Invalid => "invalid command or argument",
            Status::Busy => "module busy",
            Status::NotJoined => "not joined to a network",
            Status::AlreadyJoined => "already joined",
            Status::InvalidDataLength => "invalid data length",
            Status::ExceededDataLength => "data length exceeds the current data rate limit",
            Status::KeysNotInit => "keys not initialized",
            Status::NoFreeChannel => "no free channel",
            Status::GpsNotInit => "GNSS not initialized",
            Status::GpsInIdle => "GNSS in idle mode",
            Status::GpsNotPositioning => "GNSS has no fix",
            Status::UnknownCommand => "unknown command",
            Status::GpsUartConflict => "GNSS UART in use by the host",
            Status::TxFailed => "uplink failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
