//! Structured reply decoders.
//!
//! Each decoder takes the payload text of one reply frame and turns it into a
//! typed value. Status words are classified by the caller before a payload
//! reaches a decoder, except where a decoder documents otherwise.

pub mod fields;
pub mod gps;
pub mod mac;
pub mod scalar;
pub mod sip;

pub use fields::{scan_fields, FieldScanner};
pub use gps::{
    decode_fix, decode_mode, Coordinates, Dms, FixTime, GpsModeRecord, GpsReading, PositionFix,
};
pub use scalar::{decode_bool, decode_scalar, decode_scalar_strict, Scalar, Value, ValueKind};

use crate::error::DriverError;

pub(crate) fn unexpected(command: &str, reply: &str) -> DriverError {
    DriverError::UnexpectedReply {
        command: command.to_string(),
        reply: reply.to_string(),
    }
}
