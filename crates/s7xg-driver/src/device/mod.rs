//! Typed operations for the whole command set.
//!
//! [`Device`] pairs each command builder with the reply shape the module
//! uses for it. It adds nothing to the wire beyond what the builders produce.

mod gps;
mod mac;
mod rf;
mod sip;

use std::time::Duration;

use s7xg_transport::ByteLink;
use tracing::{debug, info};

use crate::command::{rf as rf_cmd, Command};
use crate::config::DriverConfig;
use crate::driver::{Driver, Poll, Response};
use crate::error::{DriverError, ErrorKind, Result};
use crate::event::RfEvent;
use crate::types::{FirmwareVersion, Model};

pub use gps::GpsStart;

/// Deadline for each quiescing command sent by [`Device::begin`].
const QUIESCE_TIMEOUT: Duration = Duration::from_secs(2);

/// Time the module needs to come back after `sip reset`.
pub const RESET_SETTLE: Duration = Duration::from_secs(1);

/// High-level handle to an S7xG module.
#[derive(Debug)]
pub struct Device<L> {
    driver: Driver<L>,
    model: Option<Model>,
    firmware: Option<FirmwareVersion>,
    reset_settle: Duration,
    quiesce_timeout: Duration,
}

impl<L: ByteLink> Device<L> {
    pub fn new(link: L) -> Self {
        Self::with_config(link, DriverConfig::default())
    }

    pub fn with_config(link: L, config: DriverConfig) -> Self {
        Self::from_driver(Driver::with_config(link, config))
    }

    pub fn from_driver(driver: Driver<L>) -> Self {
        Self {
            driver,
            model: None,
            firmware: None,
            reset_settle: RESET_SETTLE,
            quiesce_timeout: QUIESCE_TIMEOUT,
        }
    }

    /// Bring the module to a known state and identify it.
    ///
    /// Stops continuous receive and any radio operation in progress, resets
    /// the module, then reads the model and firmware version. Replies to the
    /// stop commands are optional; a silent module only costs their deadline.
    pub fn begin(&mut self) -> Result<Model> {
        self.quiesce(&rf_cmd::rx_con(false), 1)?;
        self.quiesce(&rf_cmd::lora_tx_stop(), 1)?;
        self.quiesce(&rf_cmd::lora_rx_stop(), 2)?;

        self.reset()?;

        let model = self.model()?;
        let version = self.firmware_version()?;
        self.firmware = crate::decode::sip::decode_firmware(&version);
        info!(%model, version = %version, "module identified");
        Ok(model)
    }

    /// Model read by the last [`begin`](Self::begin) or [`model`](Self::model).
    pub fn cached_model(&self) -> Option<Model> {
        self.model
    }

    /// Firmware build detected by [`begin`](Self::begin), if recognized.
    pub fn firmware(&self) -> Option<FirmwareVersion> {
        self.firmware
    }

    /// Override the post-reset settle time.
    pub fn set_reset_settle(&mut self, settle: Duration) {
        self.reset_settle = settle;
    }

    /// Override the per-frame deadline of the quiescing commands in `begin`.
    pub fn set_quiesce_timeout(&mut self, timeout: Duration) {
        self.quiesce_timeout = timeout;
    }

    pub fn poll(&mut self) -> Result<Poll> {
        self.driver.poll()
    }

    pub fn next_event(&mut self) -> Option<RfEvent> {
        self.driver.next_event()
    }

    pub fn drain_events(&mut self) -> Vec<RfEvent> {
        self.driver.drain_events()
    }

    /// Send an arbitrary command and return its reply unclassified.
    pub fn send_raw(&mut self, command: &Command) -> Result<Response> {
        self.driver.execute(command)
    }

    pub fn driver(&self) -> &Driver<L> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut Driver<L> {
        &mut self.driver
    }

    pub fn into_driver(self) -> Driver<L> {
        self.driver
    }

    /// Send `command` and read up to `frames` replies, tolerating silence.
    fn quiesce(&mut self, command: &Command, frames: usize) -> Result<()> {
        let timeout = self.quiesce_timeout;
        let mut tx = self.driver.transaction_with_timeout(command, timeout)?;
        for _ in 0..frames {
            match tx.next_frame() {
                Ok(reply) => debug!(command = %command, reply = %reply.text(), "quiesce reply"),
                Err(err) if err.kind() == ErrorKind::Timeout => break,
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Read the second frame of a two-stage reply after an `Ok`.
    fn two_stage(&mut self, command: &Command, expected: &str) -> Result<()> {
        let mut tx = self.driver.transaction(command)?;
        let first = tx.next_frame()?.check()?;
        if first.status().is_none() {
            return Err(unexpected(&first));
        }
        let second = tx.next_frame()?.check()?;
        if second.text() == expected {
            Ok(())
        } else {
            Err(unexpected(&second))
        }
    }
}

fn unexpected(response: &Response) -> DriverError {
    DriverError::UnexpectedReply {
        command: response.command().to_string(),
        reply: response.text().into_owned(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use bytes::BytesMut;
    use s7xg_frame::encode_frame;
    use s7xg_transport::MockLink;

    use super::*;

    pub fn frame(payload: &str) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(payload.as_bytes(), &mut buf);
        buf.to_vec()
    }

    pub fn frames(payloads: &[&str]) -> Vec<u8> {
        payloads.iter().flat_map(|p| frame(p)).collect()
    }

    pub fn device(link: MockLink) -> Device<MockLink> {
        let config = DriverConfig {
            timeout: Duration::from_millis(50),
            discard_window: Duration::from_millis(5),
            ..DriverConfig::default()
        };
        let mut device = Device::with_config(link, config);
        device.set_reset_settle(Duration::from_millis(5));
        device.set_quiesce_timeout(Duration::from_millis(20));
        device
    }
}

#[cfg(test)]
mod tests {
    use s7xg_transport::MockLink;

    use super::testing::{device, frame, frames};
    use super::*;
    use crate::status::Status;

    #[test]
    fn begin_identifies_module() {
        let mut link = MockLink::new();
        link.expect("rf rx_con off", &frame("Ok"));
        link.expect("rf lora_tx_stop", &frame("Ok"));
        link.expect("rf lora_rx_stop", &frames(&["Ok", "radio_rx_stop"]));
        link.expect("sip reset", &frame("boot banner"));
        link.expect("sip get_hw_model", &frame("S76G"));
        link.expect("sip get_ver", &frame("v1.6.6-g11"));
        let mut dev = device(link);

        assert_eq!(dev.begin().unwrap(), Model::S76G);
        assert_eq!(dev.cached_model(), Some(Model::S76G));
        assert_eq!(dev.firmware(), Some(FirmwareVersion::V166G11));
        assert_eq!(dev.driver().link().remaining_exchanges(), 0);
    }

    #[test]
    fn begin_tolerates_silent_stop_commands() {
        let mut link = MockLink::new();
        link.expect("rf rx_con off", b"");
        link.expect("rf lora_tx_stop", b"");
        link.expect("rf lora_rx_stop", b"");
        link.expect("sip reset", b"");
        link.expect("sip get_hw_model", &frame("S78G"));
        link.expect("sip get_ver", &frame("v9.9.9"));
        let mut dev = device(link);

        assert_eq!(dev.begin().unwrap(), Model::S78G);
        assert_eq!(dev.firmware(), None);
    }

    #[test]
    fn begin_rejects_unknown_model() {
        let mut link = MockLink::new();
        link.expect("rf rx_con off", &frame("Ok"));
        link.expect("rf lora_tx_stop", &frame("Ok"));
        link.expect("rf lora_rx_stop", &frames(&["Ok", "Ok"]));
        link.expect("sip reset", b"");
        link.expect("sip get_hw_model", &frame("S99X"));
        let mut dev = device(link);

        assert!(matches!(
            dev.begin(),
            Err(DriverError::UnexpectedReply { .. })
        ));
    }

    #[test]
    fn two_stage_reply_requires_ok_first() {
        let mut link = MockLink::new();
        link.expect("mac join otaa", &frame("no_free_ch"));
        let mut dev = device(link);

        let err = dev.join(crate::types::JoinMode::Otaa).unwrap_err();
        assert_eq!(err.status(), Some(Status::NoFreeChannel));
    }
}
