//! `rf` family: raw LoRa radio.

use s7xg_frame::hex;

use crate::command::{check_hex, check_range, Command};
use crate::error::{DriverError, Result};
use crate::types::on_off;

pub fn set_freq(hz: u32) -> Command {
    Command::raw(format!("rf set_freq {hz}"))
}

pub fn get_freq() -> Command {
    Command::raw("rf get_freq")
}

pub fn set_pwr(dbm: u8) -> Command {
    Command::raw(format!("rf set_pwr {dbm}"))
}

pub fn get_pwr() -> Command {
    Command::raw("rf get_pwr")
}

pub fn set_sf(factor: u8) -> Result<Command> {
    let factor = check_range("spreading factor", factor, 7..=12)?;
    Ok(Command::raw(format!("rf set_sf {factor}")))
}

pub fn get_sf() -> Command {
    Command::raw("rf get_sf")
}

/// Bandwidth in kHz.
pub fn set_bw(khz: u16) -> Command {
    Command::raw(format!("rf set_bw {khz}"))
}

/// Coding rate `4/denominator`, denominator 5 to 8.
pub fn set_cr(denominator: u8) -> Result<Command> {
    let denominator = check_range("coding rate denominator", denominator, 5..=8)?;
    Ok(Command::raw(format!("rf set_cr 4/{denominator}")))
}

pub fn set_prlen(symbols: u16) -> Command {
    Command::raw(format!("rf set_prlen {symbols}"))
}

pub fn set_crc(on: bool) -> Command {
    Command::raw(format!("rf set_crc {}", on_off(on)))
}

pub fn set_iqi(on: bool) -> Command {
    Command::raw(format!("rf set_iqi {}", on_off(on)))
}

/// Sync word, sent as lowercase hex without padding.
pub fn set_sync(word: u8) -> Command {
    Command::raw(format!("rf set_sync {word:x}"))
}

/// FSK frequency deviation in Hz.
pub fn set_fdev(hz: u16) -> Command {
    Command::raw(format!("rf set_fdev {hz}"))
}

/// Continuous receive; received packets arrive as `radio_rx` events.
pub fn rx_con(on: bool) -> Command {
    Command::raw(format!("rf rx_con {}", on_off(on)))
}

pub fn save() -> Command {
    Command::raw("rf save")
}

pub fn lora_tx_stop() -> Command {
    Command::raw("rf lora_tx_stop")
}

pub fn lora_rx_stop() -> Command {
    Command::raw("rf lora_rx_stop")
}

/// Transmit bytes; hex-encoded on the wire.
pub fn tx(payload: &[u8]) -> Result<Command> {
    if payload.is_empty() {
        return Err(DriverError::InvalidArgument(
            "rf tx payload must not be empty".to_string(),
        ));
    }
    Ok(Command::raw(format!("rf tx {}", hex::encode_upper(payload))))
}

/// Transmit an already hex-encoded payload.
pub fn tx_hex(payload: &str) -> Result<Command> {
    check_hex("payload", payload, None)?;
    Ok(Command::raw(format!("rf tx {payload}")))
}

/// Transmit the bytes of `text`.
pub fn tx_text(text: &str) -> Result<Command> {
    tx(text.as_bytes())
}
