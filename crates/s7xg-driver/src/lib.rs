//! Command/response driver for AcSIP S7xG LoRa/GNSS modules.
//!
//! The module speaks a half-duplex text protocol over a serial link: the
//! host writes one command, the module answers with one or more prompt
//! framed replies, and, with continuous receive on, announces radio packets
//! as unsolicited `radio_rx` frames in between.
//!
//! - [`Driver`] correlates replies with the outstanding command and queues
//!   RF events found by [`Driver::poll`]
//! - [`command`] builds and validates command text per family
//! - [`decode`] turns reply payloads into typed values
//! - [`Device`] pairs the two into one method per operation

pub mod command;
pub mod config;
pub mod decode;
pub mod device;
pub mod driver;
pub mod error;
pub mod event;
pub mod status;
pub mod types;

pub use command::Command;
pub use config::{DriverConfig, DEFAULT_EVENT_QUEUE_CAPACITY, DEFAULT_TIMEOUT};
pub use device::{Device, GpsStart, RESET_SETTLE};
pub use driver::{Ack, Driver, Poll, Response, Transaction};
pub use error::{DriverError, ErrorKind, Result};
pub use event::{decode_rf_event, is_rf_event, RfEvent, RF_EVENT_PREFIX};
pub use status::Status;
pub use types::{
    Confirm, DeviceClass, FirmwareVersion, GpioGroup, GpsDataFormat, GpsMode, GpsSleep,
    GpsStartMode, JoinMode, LogLevel, Model, PinMode, SatelliteSystem, TxMode, UplinkFormat,
};
