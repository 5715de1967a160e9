//! `gps` family: GNSS receiver.

use crate::command::{check_range, Command};
use crate::error::Result;
use crate::types::{
    on_off, GpsDataFormat, GpsMode, GpsSleep, GpsStartMode, SatelliteSystem, UplinkFormat,
};

/// Route the GNSS UART through the level shifter; required before use.
pub fn set_level_shift(on: bool) -> Command {
    Command::raw(format!("gps set_level_shift {}", on_off(on)))
}

/// Only the RMC sentence is supported.
pub fn set_nmea_rmc() -> Command {
    Command::raw("gps set_nmea rmc")
}

pub fn set_port_uplink(port: u8) -> Result<Command> {
    let port = check_range("uplink port", port, 1..=223)?;
    Ok(Command::raw(format!("gps set_port_uplink {port}")))
}

pub fn set_format_uplink(format: UplinkFormat) -> Command {
    Command::raw(format!("gps set_format_uplink {format}"))
}

/// Positioning cycle in milliseconds, 1000 to 600000.
pub fn set_positioning_cycle(ms: u32) -> Result<Command> {
    let ms = check_range("positioning cycle", ms, 1000..=600_000)?;
    Ok(Command::raw(format!("gps set_positioning_cycle {ms}")))
}

pub fn set_mode(mode: GpsMode) -> Command {
    Command::raw(format!("gps set_mode {mode}"))
}

pub fn set_satellite_system(system: SatelliteSystem) -> Command {
    Command::raw(format!("gps set_satellite_system {system}"))
}

pub fn set_start(start: GpsStartMode) -> Command {
    Command::raw(format!("gps set_start {start}"))
}

pub fn get_mode() -> Command {
    Command::raw("gps get_mode")
}

pub fn get_data(format: GpsDataFormat) -> Command {
    Command::raw(format!("gps get_data {format}"))
}

pub fn reset() -> Command {
    Command::raw("gps reset")
}

pub fn sleep(depth: GpsSleep) -> Command {
    Command::raw(format!("gps sleep on {depth}"))
}

pub fn wakeup() -> Command {
    Command::raw("gps sleep off")
}
