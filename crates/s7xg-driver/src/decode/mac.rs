//! LoRaWAN MAC reply decoders.

use serde::Serialize;

use crate::decode::fields::{scan_fields, short_scan, FieldScanner};
use crate::decode::unexpected;
use crate::error::Result;
use crate::types::{DeviceClass, JoinMode, TxMode};

/// `mac get_join_status`: `joined` or `unjoined`.
pub fn decode_join_status(text: &str) -> Result<bool> {
    match text {
        "joined" => Ok(true),
        "unjoined" => Ok(false),
        other => Err(unexpected("mac get_join_status", other)),
    }
}

/// `mac get_class`: a single class letter.
pub fn decode_class(text: &str) -> Result<DeviceClass> {
    text.parse()
        .map_err(|_| unexpected("mac get_class", text))
}

/// `mac get_tx_mode`: `cycle` or `no_cycle`.
pub fn decode_tx_mode(text: &str) -> Result<TxMode> {
    text.parse()
        .map_err(|_| unexpected("mac get_tx_mode", text))
}

/// Automatic join behavior after power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AutoJoin {
    Off,
    On {
        mode: JoinMode,
        /// Join attempts, when the firmware reports them.
        attempts: Option<u8>,
    },
}

/// `mac get_auto_join`: `off`, a bare join mode, or `on <mode> <attempts>`.
pub fn decode_auto_join(text: &str) -> Result<AutoJoin> {
    let mut s = FieldScanner::new(text);
    let first = s.word().ok_or_else(|| unexpected("mac get_auto_join", text))?;
    let mode_word = match first {
        "off" => return Ok(AutoJoin::Off),
        "on" => s.word().ok_or_else(|| unexpected("mac get_auto_join", text))?,
        word => word,
    };
    let mode = mode_word
        .parse()
        .map_err(|_| unexpected("mac get_auto_join", text))?;
    Ok(AutoJoin::On {
        mode,
        attempts: s.field(),
    })
}

/// One channel's configuration from `mac get_ch_para <ch>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelParameters {
    pub uplink_freq: u32,
    pub min_data_rate: u8,
    pub max_data_rate: u8,
    pub band_id: u8,
    pub downlink_freq: u32,
}

pub fn decode_channel_parameters(text: &str) -> Result<ChannelParameters> {
    let mut s = FieldScanner::new(text);
    let short = |s: &FieldScanner<'_>| short_scan("channel parameters", 5, s.converted(), text);
    Ok(ChannelParameters {
        uplink_freq: s.field().ok_or_else(|| short(&s))?,
        min_data_rate: s.field().ok_or_else(|| short(&s))?,
        max_data_rate: s.field().ok_or_else(|| short(&s))?,
        band_id: s.field().ok_or_else(|| short(&s))?,
        downlink_freq: s.field().ok_or_else(|| short(&s))?,
    })
}

/// Second receive window from `mac get_rx2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rx2 {
    pub data_rate: u8,
    pub freq: u32,
}

pub fn decode_rx2(text: &str) -> Result<Rx2> {
    let mut s = FieldScanner::new(text);
    let short = |s: &FieldScanner<'_>| short_scan("rx2 parameters", 2, s.converted(), text);
    Ok(Rx2 {
        data_rate: s.field().ok_or_else(|| short(&s))?,
        freq: s.field().ok_or_else(|| short(&s))?,
    })
}

/// Receive window delays in milliseconds from `mac get_rxdelay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RxDelay {
    pub rx1_ms: u32,
    pub rx2_ms: u32,
}

pub fn decode_rx_delay(text: &str) -> Result<RxDelay> {
    let [rx1_ms, rx2_ms] = scan_fields::<u32, 2>(text, "rx delay")?;
    Ok(RxDelay { rx1_ms, rx2_ms })
}
