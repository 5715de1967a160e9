//! Unsolicited RF events.
//!
//! With continuous receive on (`rf rx_con on`) the module announces each
//! received packet as `radio_rx <hex> <rssi> <snr>` outside of any command
//! exchange. Decoded events are queued for the host to drain; malformed ones
//! are dropped and never surface as errors.

use std::collections::VecDeque;

use bytes::Bytes;
use s7xg_frame::hex;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::decode::fields::short_scan;
use crate::decode::scalar::decode_scalar;
use crate::error::Result;

/// Payload prefix that marks an RF event.
pub const RF_EVENT_PREFIX: &str = "radio_rx";

/// Fields start after the prefix and one separator.
const FIELDS_OFFSET: usize = RF_EVENT_PREFIX.len() + 1;

/// A received radio packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfEvent {
    #[serde(serialize_with = "as_hex")]
    pub data: Bytes,
    /// Received signal strength, dBm.
    pub rssi: i32,
    /// Signal-to-noise ratio, dB.
    pub snr: i32,
}

fn as_hex<S: Serializer>(data: &Bytes, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode_upper(data))
}

/// Whether a frame payload has the RF event shape.
pub fn is_rf_event(payload: &str) -> bool {
    payload.starts_with(RF_EVENT_PREFIX)
}

/// Decode an RF event payload.
///
/// The last space-separated token is the SNR and the one before it the RSSI;
/// what remains after the prefix is the hex packet, decoded into at most
/// `capacity` bytes.
pub fn decode_rf_event(payload: &str, capacity: usize) -> Result<RfEvent> {
    let malformed = |found| short_scan("rf event", 3, found, payload);

    let fields = payload.get(FIELDS_OFFSET..).ok_or_else(|| malformed(0))?;
    let (rest, snr) = fields.rsplit_once(' ').ok_or_else(|| malformed(0))?;
    let (packet, rssi) = rest.rsplit_once(' ').ok_or_else(|| malformed(1))?;

    let mut data = vec![0u8; capacity];
    let len = hex::decode_into(packet, &mut data)?;
    data.truncate(len);

    Ok(RfEvent {
        data: Bytes::from(data),
        rssi: decode_scalar(rssi),
        snr: decode_scalar(snr),
    })
}

/// Bounded FIFO of decoded events; the oldest is dropped when full.
#[derive(Debug)]
pub(crate) struct EventQueue {
    events: VecDeque<RfEvent>,
    capacity: usize,
}

impl EventQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, event: RfEvent) {
        if self.events.len() == self.capacity {
            if let Some(dropped) = self.events.pop_front() {
                warn!(
                    capacity = self.capacity,
                    dropped_len = dropped.data.len(),
                    "rf event queue full, dropping oldest event"
                );
            }
        }
        self.events.push_back(event);
    }

    pub(crate) fn pop(&mut self) -> Option<RfEvent> {
        self.events.pop_front()
    }

    pub(crate) fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, RfEvent> {
        self.events.drain(..)
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }
}
