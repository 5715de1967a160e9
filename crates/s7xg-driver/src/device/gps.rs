use s7xg_transport::ByteLink;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Device;
use crate::command::gps;
use crate::decode::gps::{decode_fix, decode_mode, GpsModeRecord, GpsReading};
use crate::error::Result;
use crate::types::{
    GpsDataFormat, GpsMode, GpsSleep, GpsStartMode, SatelliteSystem, UplinkFormat,
};

/// Receiver settings applied by [`Device::gps_start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpsStart {
    pub start: GpsStartMode,
    pub mode: GpsMode,
    pub satellite_system: SatelliteSystem,
    /// Positioning cycle in milliseconds, 1000 to 600000.
    pub cycle_ms: u32,
}

impl Default for GpsStart {
    fn default() -> Self {
        Self {
            start: GpsStartMode::Hot,
            mode: GpsMode::Manual,
            satellite_system: SatelliteSystem::Gps,
            cycle_ms: 1000,
        }
    }
}

impl<L: ByteLink> Device<L> {
    /// Power the receiver path and start positioning.
    ///
    /// Stops at the first command the module refuses.
    pub fn gps_start(&mut self, options: &GpsStart) -> Result<()> {
        let cycle = gps::set_positioning_cycle(options.cycle_ms)?;
        self.driver.expect_ok(&gps::set_level_shift(true))?;
        self.driver.expect_ok(&gps::set_start(options.start))?;
        self.driver
            .expect_ok(&gps::set_satellite_system(options.satellite_system))?;
        self.driver.expect_ok(&cycle)?;
        self.driver.expect_ok(&gps::set_mode(options.mode))?;
        info!(mode = %options.mode, start = %options.start, "gps started");
        Ok(())
    }

    /// Idle the receiver and release its UART. Both steps are attempted; the
    /// first failure is returned.
    pub fn gps_stop(&mut self) -> Result<()> {
        let idle = self.driver.expect_ok(&gps::set_mode(GpsMode::Idle));
        if let Err(err) = &idle {
            warn!(error = %err, "gps idle failed");
        }
        let shift = self.driver.expect_ok(&gps::set_level_shift(false));
        idle.and(shift)
    }

    /// Query the current position.
    ///
    /// `gps_not_init`, `gps_in_idle` and `gps_not_positioning` are protocol
    /// errors. A receiver still searching yields [`GpsReading::Acquiring`].
    pub fn gps_data(&mut self, format: GpsDataFormat) -> Result<GpsReading> {
        let response = self.driver.execute(&gps::get_data(format))?;
        decode_fix(&response.text(), format)
    }

    pub fn gps_mode(&mut self) -> Result<GpsModeRecord> {
        let response = self.driver.execute(&gps::get_mode())?;
        decode_mode(&response.text())
    }

    pub fn set_gps_level_shift(&mut self, on: bool) -> Result<()> {
        self.driver.expect_ok(&gps::set_level_shift(on))
    }

    pub fn set_gps_nmea_rmc(&mut self) -> Result<()> {
        self.driver.expect_ok(&gps::set_nmea_rmc())
    }

    pub fn set_gps_uplink_port(&mut self, port: u8) -> Result<()> {
        self.driver.expect_ok(&gps::set_port_uplink(port)?)
    }

    pub fn set_gps_uplink_format(&mut self, format: UplinkFormat) -> Result<()> {
        self.driver.expect_ok(&gps::set_format_uplink(format))
    }

    pub fn set_gps_mode(&mut self, mode: GpsMode) -> Result<()> {
        self.driver.expect_ok(&gps::set_mode(mode))
    }

    pub fn gps_reset(&mut self) -> Result<()> {
        self.driver.expect_ok(&gps::reset())
    }

    pub fn gps_sleep(&mut self, depth: GpsSleep) -> Result<()> {
        self.driver.expect_ok(&gps::sleep(depth))
    }

    pub fn gps_wakeup(&mut self) -> Result<()> {
        self.driver.expect_ok(&gps::wakeup())
    }
}
