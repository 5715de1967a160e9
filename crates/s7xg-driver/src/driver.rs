use std::borrow::Cow;
use std::time::Duration;

use bytes::Bytes;
use s7xg_frame::{FrameError, FrameReader};
use s7xg_transport::ByteLink;
use tracing::{debug, trace, warn};

use crate::command::Command;
use crate::config::DriverConfig;
use crate::decode::scalar::{decode_bool, decode_scalar, decode_scalar_strict, Scalar};
use crate::error::{DriverError, Result};
use crate::event::{decode_rf_event, is_rf_event, EventQueue, RfEvent};
use crate::status::Status;

/// One reply frame, tied to the command that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    command: String,
    payload: Bytes,
}

impl Response {
    /// The command this frame answers, redacted if it carried keys.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload as text; non-ASCII bytes are replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// The status word this payload is, if any.
    pub fn status(&self) -> Option<Status> {
        Status::classify(&self.text())
    }

    /// Fail if the payload is a failure status; pass data and `Ok` through.
    pub fn check(self) -> Result<Response> {
        match self.status().and_then(|s| s.into_error(&self.command)) {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Outcome of a command under universal status classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// The module answered `Ok`.
    Ok,
    /// The payload is not a status word; decode it further.
    Other(Response),
}

/// Outcome of one [`Driver::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// No complete frame was buffered.
    Idle,
    /// An RF event was decoded and queued.
    Queued,
    /// A frame arrived that is not an RF event; it was discarded.
    Ignored,
    /// An RF event was malformed and discarded.
    Dropped,
}

/// Half-duplex command/response driver over a byte link.
///
/// Owns the link and the frame reader. At most one command is outstanding at
/// a time: a [`Transaction`] mutably borrows the driver, so RF events cannot
/// be polled while a reply is awaited, and every frame read during a
/// transaction is that command's reply.
pub struct Driver<L> {
    reader: FrameReader<L>,
    config: DriverConfig,
    events: EventQueue,
}

impl<L: ByteLink> Driver<L> {
    pub fn new(link: L) -> Self {
        Self::with_config(link, DriverConfig::default())
    }

    pub fn with_config(link: L, config: DriverConfig) -> Self {
        Self {
            reader: FrameReader::with_config(link, config.frame.clone()),
            events: EventQueue::new(config.event_queue_capacity),
            config,
        }
    }

    /// Write `command` and open a transaction for its reply frames.
    pub fn transaction(&mut self, command: &Command) -> Result<Transaction<'_, L>> {
        let timeout = self.config.timeout;
        self.transaction_with_timeout(command, timeout)
    }

    /// Like [`transaction`](Self::transaction) with an explicit per-frame deadline.
    pub fn transaction_with_timeout(
        &mut self,
        command: &Command,
        timeout: Duration,
    ) -> Result<Transaction<'_, L>> {
        debug!(command = %command, "sending command");
        let link = self.reader.get_mut();
        link.write_all(command.as_bytes())?;
        link.flush()?;
        Ok(Transaction {
            command: command.redacted(),
            timeout,
            driver: self,
        })
    }

    /// Send a command and return its single reply frame unclassified.
    pub fn execute(&mut self, command: &Command) -> Result<Response> {
        self.transaction(command)?.next_frame()
    }

    /// Send a command and classify the reply against the status words.
    ///
    /// `Ok` is [`Ack::Ok`]; `Invalid` and `Unknown command!` are
    /// [`DriverError::InvalidCommand`]; other status words are
    /// [`DriverError::Protocol`]; anything else is handed back as data.
    pub fn execute_ack(&mut self, command: &Command) -> Result<Ack> {
        let response = self.execute(command)?.check()?;
        if response.status() == Some(Status::Ok) {
            Ok(Ack::Ok)
        } else {
            Ok(Ack::Other(response))
        }
    }

    /// Send a command that must be answered with `Ok`.
    pub fn expect_ok(&mut self, command: &Command) -> Result<()> {
        match self.execute_ack(command)? {
            Ack::Ok => Ok(()),
            Ack::Other(response) => Err(DriverError::UnexpectedReply {
                command: response.command().to_string(),
                reply: response.text().into_owned(),
            }),
        }
    }

    /// Send a command and read its reply as a number.
    ///
    /// Failure status words are errors. Any other reply without a numeric
    /// prefix reads as zero.
    pub fn execute_scalar<T: Scalar>(&mut self, command: &Command) -> Result<T> {
        let response = self.execute(command)?.check()?;
        Ok(decode_scalar(&response.text()))
    }

    /// Like [`execute_scalar`](Self::execute_scalar), but a reply without a
    /// numeric prefix is a decode error.
    pub fn execute_scalar_strict<T: Scalar>(
        &mut self,
        command: &Command,
        what: &'static str,
    ) -> Result<T> {
        let response = self.execute(command)?.check()?;
        decode_scalar_strict(&response.text(), what)
    }

    /// Send a command and read its reply as on/off.
    ///
    /// Only `on` is true. `off`, status words and garbage are all false.
    pub fn execute_bool(&mut self, command: &Command) -> Result<bool> {
        let response = self.execute(command)?;
        Ok(decode_bool(&response.text()))
    }

    /// Send a command and return its reply text, failing on failure statuses.
    pub fn execute_text(&mut self, command: &Command) -> Result<String> {
        let response = self.execute(command)?.check()?;
        Ok(response.text().into_owned())
    }

    /// Drop bytes arriving within the configured discard window.
    pub fn discard_pending(&mut self) -> Result<usize> {
        let window = self.config.discard_window;
        Ok(self.reader.discard_pending(window)?)
    }

    /// Look for one unsolicited frame without waiting.
    ///
    /// Only a frame whose bytes have all arrived is processed; bytes of a
    /// frame still in flight are consumed and lost. RF events are queued for
    /// [`next_event`](Self::next_event); other frames and malformed events are
    /// discarded.
    pub fn poll(&mut self) -> Result<Poll> {
        let frame = match self.reader.read_frame(Duration::ZERO) {
            Ok(frame) => frame,
            Err(FrameError::Timeout(_)) => return Ok(Poll::Idle),
            Err(err) => return Err(err.into()),
        };

        let text = frame.text();
        if !is_rf_event(&text) {
            debug!(payload = %text, "ignoring unsolicited frame");
            return Ok(Poll::Ignored);
        }

        match decode_rf_event(&text, self.reader.config().capacity) {
            Ok(event) => {
                trace!(len = event.data.len(), rssi = event.rssi, snr = event.snr, "rf event");
                self.events.push(event);
                Ok(Poll::Queued)
            }
            Err(err) => {
                warn!(payload = %text, error = %err, "dropping malformed rf event");
                Ok(Poll::Dropped)
            }
        }
    }

    /// Oldest undelivered RF event.
    pub fn next_event(&mut self) -> Option<RfEvent> {
        self.events.pop()
    }

    /// Every undelivered RF event, oldest first.
    pub fn drain_events(&mut self) -> Vec<RfEvent> {
        self.events.drain().collect()
    }

    /// Number of undelivered RF events.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Reply deadline used by [`transaction`](Self::transaction).
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn link(&self) -> &L {
        self.reader.get_ref()
    }

    pub fn link_mut(&mut self) -> &mut L {
        self.reader.get_mut()
    }

    pub fn into_link(self) -> L {
        self.reader.into_inner()
    }

    fn read_reply(&mut self, command: &str, timeout: Duration) -> Result<Response> {
        match self.reader.read_frame(timeout) {
            Ok(frame) => {
                debug!(command, payload = %frame.text(), "reply frame");
                Ok(Response {
                    command: command.to_string(),
                    payload: frame.payload,
                })
            }
            Err(FrameError::Timeout(t)) => {
                warn!(command, timeout_ms = t.as_millis() as u64, "no reply before deadline");
                if self.config.discard_after_timeout {
                    if let Err(err) = self.reader.discard_pending(self.config.discard_window) {
                        warn!(error = %err, "discarding late bytes failed");
                    }
                }
                Err(FrameError::Timeout(t).into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl<L> std::fmt::Debug for Driver<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("reader", &self.reader)
            .field("config", &self.config)
            .field("events", &self.events)
            .finish()
    }
}

/// The outstanding command.
///
/// Created by [`Driver::transaction`] after the command is written. Multi-stage
/// replies (`mac join` answers `Ok` then `accepted`) are read with repeated
/// [`next_frame`](Self::next_frame) calls.
#[derive(Debug)]
pub struct Transaction<'a, L> {
    driver: &'a mut Driver<L>,
    command: String,
    timeout: Duration,
}

impl<L: ByteLink> Transaction<'_, L> {
    /// Wait for the next frame of this command's reply.
    pub fn next_frame(&mut self) -> Result<Response> {
        let timeout = self.timeout;
        self.next_frame_with_timeout(timeout)
    }

    /// Wait for the next reply frame with its own deadline; later stages of
    /// some replies come after network round trips.
    pub fn next_frame_with_timeout(&mut self, timeout: Duration) -> Result<Response> {
        self.driver.read_reply(&self.command, timeout)
    }

    /// The command text, redacted if it carried keys.
    pub fn command(&self) -> &str {
        &self.command
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use bytes::BytesMut;
    use s7xg_frame::encode_frame;
    use s7xg_transport::MockLink;

    use super::*;
    use crate::error::ErrorKind;

    fn frame(payload: &str) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(payload.as_bytes(), &mut buf);
        buf.to_vec()
    }

    fn frames(payloads: &[&str]) -> Vec<u8> {
        payloads.iter().flat_map(|p| frame(p)).collect()
    }

    fn quick_config() -> DriverConfig {
        DriverConfig {
            timeout: Duration::from_millis(40),
            discard_window: Duration::from_millis(20),
            ..DriverConfig::default()
        }
    }

    fn driver(link: MockLink) -> Driver<MockLink> {
        Driver::with_config(link, quick_config())
    }

    #[test]
    fn command_is_written_verbatim() {
        let mut link = MockLink::new();
        link.expect("sip get_ver", &frame("v1.6.5-g9"));
        let mut d = driver(link);

        let response = d.execute(&Command::raw("sip get_ver")).unwrap();
        assert_eq!(response.text(), "v1.6.5-g9");
        assert_eq!(response.command(), "sip get_ver");
        assert_eq!(d.link().written(), &[b"sip get_ver".to_vec()]);
    }

    #[test]
    fn universal_classification() {
        let mut link = MockLink::new();
        link.expect("rf save", &frame("Ok"));
        link.expect("rf sav", &frame("Invalid"));
        link.expect("mac join otaa", &frame("busy"));
        link.expect("sip get_ver", &frame("Okay"));
        let mut d = driver(link);

        assert_eq!(d.execute_ack(&Command::raw("rf save")).unwrap(), Ack::Ok);

        let err = d.execute_ack(&Command::raw("rf sav")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCommand);

        let err = d.execute_ack(&Command::raw("mac join otaa")).unwrap_err();
        assert_eq!(err.status(), Some(Status::Busy));

        match d.execute_ack(&Command::raw("sip get_ver")).unwrap() {
            Ack::Other(response) => assert_eq!(response.text(), "Okay"),
            Ack::Ok => panic!("unrecognized payload classified as success"),
        }
    }

    #[test]
    fn expect_ok_rejects_data() {
        let mut link = MockLink::new();
        link.expect("rf save", &frame("saved"));
        let mut d = driver(link);
        assert!(matches!(
            d.expect_ok(&Command::raw("rf save")),
            Err(DriverError::UnexpectedReply { .. })
        ));
    }

    #[test]
    fn scalar_replies() {
        let mut link = MockLink::new();
        link.expect("rf get_sf", &frame("7"));
        link.expect("rf get_pwr", &frame(""));
        link.expect("mac get_power", &frame("Invalid"));
        link.expect("mac get_upcnt", &frame("n/a"));
        let mut d = driver(link);

        assert_eq!(d.execute_scalar::<u8>(&Command::raw("rf get_sf")).unwrap(), 7);
        assert_eq!(d.execute_scalar::<u8>(&Command::raw("rf get_pwr")).unwrap(), 0);
        assert!(d.execute_scalar::<i32>(&Command::raw("mac get_power")).is_err());
        let err = d
            .execute_scalar_strict::<u32>(&Command::raw("mac get_upcnt"), "uplink counter")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn boolean_replies() {
        let mut link = MockLink::new();
        link.expect("mac get_adr", &frame("on"));
        link.expect("mac get_lbt", &frame("off"));
        link.expect("mac get_tx_confirm", &frame("Invalid"));
        let mut d = driver(link);

        assert!(d.execute_bool(&Command::raw("mac get_adr")).unwrap());
        assert!(!d.execute_bool(&Command::raw("mac get_lbt")).unwrap());
        assert!(!d.execute_bool(&Command::raw("mac get_tx_confirm")).unwrap());
    }

    #[test]
    fn timeout_is_reported_and_late_reply_discarded() {
        let mut link = MockLink::new();
        link.expect_delayed("gps get_data dd", &frame("late"), Duration::from_millis(50));
        link.expect("rf get_sf", &frame("9"));
        let config = DriverConfig {
            timeout: Duration::from_millis(20),
            discard_window: Duration::from_millis(80),
            ..DriverConfig::default()
        };
        let mut d = Driver::with_config(link, config);

        let started = Instant::now();
        let err = d.execute(&Command::raw("gps get_data dd")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(d.link().pending(), 0);

        let response = d.execute(&Command::raw("rf get_sf")).unwrap();
        assert_eq!(response.text(), "9");
    }

    #[test]
    fn late_reply_answers_next_command_without_discard() {
        let mut link = MockLink::new();
        link.expect_delayed("gps get_data dd", &frame("late"), Duration::from_millis(30));
        link.expect("rf get_sf", &frame("9"));
        let config = DriverConfig {
            timeout: Duration::from_millis(10),
            discard_after_timeout: false,
            ..DriverConfig::default()
        };
        let mut d = Driver::with_config(link, config);

        assert!(d.execute(&Command::raw("gps get_data dd")).is_err());
        std::thread::sleep(Duration::from_millis(40));
        d.set_timeout(Duration::from_millis(100));
        assert_eq!(d.execute(&Command::raw("rf get_sf")).unwrap().text(), "late");
    }

    #[test]
    fn transaction_reads_follow_up_frames() {
        let mut link = MockLink::new();
        link.expect("mac join otaa", &frames(&["Ok", "accepted"]));
        let mut d = driver(link);

        let mut tx = d.transaction(&Command::raw("mac join otaa")).unwrap();
        assert_eq!(tx.command(), "mac join otaa");
        assert_eq!(tx.next_frame().unwrap().status(), Some(Status::Ok));
        assert_eq!(tx.next_frame().unwrap().text(), "accepted");
        assert_eq!(
            tx.next_frame_with_timeout(Duration::from_millis(5))
                .unwrap_err()
                .kind(),
            ErrorKind::Timeout
        );
    }

    #[test]
    fn event_shaped_reply_goes_to_the_pending_command() {
        let mut link = MockLink::new();
        link.expect("rf get_sf", &frames(&["radio_rx 48656C6C6F -42 7", "7"]));
        let mut d = driver(link);

        let reply = d.execute(&Command::raw("rf get_sf")).unwrap();
        assert_eq!(reply.text(), "radio_rx 48656C6C6F -42 7");
        assert_eq!(d.pending_events(), 0);

        // The real answer is still buffered; the poll path sees it as noise.
        assert_eq!(d.poll().unwrap(), Poll::Ignored);
        assert!(d.next_event().is_none());
    }

    #[test]
    fn poll_queues_rf_events() {
        let mut link = MockLink::new();
        link.push_bytes(&frames(&[
            "radio_rx 48656C6C6F -42 7",
            "radio_rx 00 -90",
            "tx_ok",
            "radio_rx 0102 -60 -2",
        ]));
        let mut d = driver(link);

        assert_eq!(d.poll().unwrap(), Poll::Queued);
        assert_eq!(d.poll().unwrap(), Poll::Dropped);
        assert_eq!(d.poll().unwrap(), Poll::Ignored);
        assert_eq!(d.poll().unwrap(), Poll::Queued);
        assert_eq!(d.poll().unwrap(), Poll::Idle);

        let first = d.next_event().unwrap();
        assert_eq!(first.data.as_ref(), b"Hello");
        assert_eq!((first.rssi, first.snr), (-42, 7));
        let rest = d.drain_events();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].data.as_ref(), &[0x01, 0x02]);
        assert_eq!(rest[0].snr, -2);
    }

    #[test]
    fn poll_does_not_wait_for_frames_in_flight() {
        let mut link = MockLink::new();
        link.push_bytes_after(&frame("radio_rx 00 -1 1"), Duration::from_millis(30));
        let mut d = driver(link);

        let started = Instant::now();
        assert_eq!(d.poll().unwrap(), Poll::Idle);
        assert!(started.elapsed() < Duration::from_millis(30));
    }

    #[test]
    fn event_queue_is_bounded() {
        let mut link = MockLink::new();
        link.push_bytes(&frames(&[
            "radio_rx 01 -1 1",
            "radio_rx 02 -1 1",
            "radio_rx 03 -1 1",
        ]));
        let config = DriverConfig {
            event_queue_capacity: 2,
            ..quick_config()
        };
        let mut d = Driver::with_config(link, config);
        for _ in 0..3 {
            assert_eq!(d.poll().unwrap(), Poll::Queued);
        }
        let data: Vec<u8> = d.drain_events().iter().map(|e| e.data[0]).collect();
        assert_eq!(data, vec![2, 3]);
    }

    #[test]
    fn buffer_overflow_propagates() {
        let mut link = MockLink::new();
        let mut flood = vec![0x0A, 0x0D, 0x3E, 0x3E, b' '];
        flood.extend(std::iter::repeat(b'x').take(300));
        link.expect("sip get_uuid", &flood);
        let mut d = driver(link);

        let err = d.execute(&Command::raw("sip get_uuid")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferOverflow);
    }

    #[test]
    fn transport_failure_on_write() {
        let mut link = MockLink::new();
        link.expect("rf get_sf", &frame("7"));
        let mut d = driver(link);
        let err = d.execute(&Command::raw("rf get_pwr")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn secret_commands_are_redacted_in_responses() {
        let mut link = MockLink::new();
        let cmd = crate::command::mac::set_appkey("000102030405060708090A0B0C0D0E0F").unwrap();
        link.expect(cmd.text(), &frame("keys_not_init"));
        let mut d = driver(link);

        let err = d.execute_ack(&cmd).unwrap_err();
        assert!(!err.to_string().contains("0A0B"));
        assert_eq!(err.status(), Some(Status::KeysNotInit));
    }
}
