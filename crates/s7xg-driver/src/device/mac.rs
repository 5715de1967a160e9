use s7xg_transport::ByteLink;
use tracing::info;

use super::Device;
use crate::command::mac::{self, Keys};
use crate::decode::mac::{
    decode_auto_join, decode_channel_parameters, decode_class, decode_join_status, decode_rx2,
    decode_rx_delay, decode_tx_mode, AutoJoin, ChannelParameters, Rx2, RxDelay,
};
use crate::error::Result;
use crate::types::{Confirm, DeviceClass, JoinMode, TxMode};

impl<L: ByteLink> Device<L> {
    /// Join the network; completes when the module reports `accepted`.
    pub fn join(&mut self, mode: JoinMode) -> Result<()> {
        self.two_stage(&mac::join(mode), "accepted")?;
        info!(%mode, "joined network");
        Ok(())
    }

    /// Uplink `payload` on `port` and wait for the transmission to finish.
    ///
    /// A module answering `err` after accepting the uplink fails with
    /// [`Status::TxFailed`](crate::Status::TxFailed).
    pub fn send(&mut self, confirm: Confirm, port: u8, payload: &[u8]) -> Result<()> {
        self.two_stage(&mac::tx(confirm, port, payload)?, "tx_ok")
    }

    pub fn send_hex(&mut self, confirm: Confirm, port: u8, payload: &str) -> Result<()> {
        self.two_stage(&mac::tx_hex(confirm, port, payload)?, "tx_ok")
    }

    pub fn joined(&mut self) -> Result<bool> {
        let text = self.driver.execute_text(&mac::get_join_status())?;
        decode_join_status(&text)
    }

    pub fn class(&mut self) -> Result<DeviceClass> {
        let text = self.driver.execute_text(&mac::get_class())?;
        decode_class(&text)
    }

    pub fn set_class(&mut self, class: DeviceClass) -> Result<()> {
        self.driver.expect_ok(&mac::set_class(class))
    }

    pub fn power(&mut self) -> Result<u8> {
        self.driver.execute_scalar(&mac::get_power())
    }

    pub fn set_power(&mut self, dbm: u8) -> Result<()> {
        self.driver.expect_ok(&mac::set_power(dbm))
    }

    /// Regional band plan identifier, e.g. `868` or `915`.
    pub fn band(&mut self) -> Result<u32> {
        self.driver.execute_scalar_strict(&mac::get_band(), "band")
    }

    pub fn adr(&mut self) -> Result<bool> {
        self.driver.execute_bool(&mac::get_adr())
    }

    pub fn tx_retry(&mut self) -> Result<u8> {
        self.driver.execute_scalar(&mac::get_txretry())
    }

    pub fn rx_delay(&mut self) -> Result<RxDelay> {
        let text = self.driver.execute_text(&mac::get_rxdelay())?;
        decode_rx_delay(&text)
    }

    pub fn data_rate(&mut self) -> Result<u8> {
        self.driver.execute_scalar(&mac::get_dr())
    }

    pub fn set_data_rate(&mut self, rate: u8) -> Result<()> {
        self.driver.expect_ok(&mac::set_dr(rate)?)
    }

    pub fn rx2(&mut self) -> Result<Rx2> {
        let text = self.driver.execute_text(&mac::get_rx2())?;
        decode_rx2(&text)
    }

    /// Network sync word, reported in hex.
    pub fn sync_word(&mut self) -> Result<String> {
        self.driver.execute_text(&mac::get_sync())
    }

    pub fn channel_parameters(&mut self, channel: u8) -> Result<ChannelParameters> {
        let text = self.driver.execute_text(&mac::get_ch_para(channel))?;
        decode_channel_parameters(&text)
    }

    pub fn channel_enabled(&mut self, channel: u8) -> Result<bool> {
        self.driver.execute_bool(&mac::get_ch_status(channel))
    }

    pub fn set_channel_freq(&mut self, channel: u8, freq: u32) -> Result<()> {
        self.driver.expect_ok(&mac::set_ch_freq(channel, freq))
    }

    pub fn duty_cycle(&mut self) -> Result<bool> {
        self.driver.execute_bool(&mac::get_dc_ctl())
    }

    pub fn duty_cycle_band(&mut self, band: u8) -> Result<u32> {
        self.driver.execute_scalar(&mac::get_dc_band(band))
    }

    pub fn set_dev_eui(&mut self, eui: &str) -> Result<()> {
        self.driver.expect_ok(&mac::set_deveui(eui)?)
    }

    pub fn set_app_eui(&mut self, eui: &str) -> Result<()> {
        self.driver.expect_ok(&mac::set_appeui(eui)?)
    }

    pub fn set_app_key(&mut self, key: &str) -> Result<()> {
        self.driver.expect_ok(&mac::set_appkey(key)?)
    }

    pub fn set_dev_addr(&mut self, addr: &str) -> Result<()> {
        self.driver.expect_ok(&mac::set_devaddr(addr)?)
    }

    pub fn set_nwk_s_key(&mut self, key: &str) -> Result<()> {
        self.driver.expect_ok(&mac::set_nwkskey(key)?)
    }

    pub fn set_app_s_key(&mut self, key: &str) -> Result<()> {
        self.driver.expect_ok(&mac::set_appskey(key)?)
    }

    pub fn set_keys(&mut self, keys: &Keys) -> Result<()> {
        self.driver.expect_ok(&mac::set_keys(keys)?)
    }

    pub fn dev_eui(&mut self) -> Result<String> {
        self.driver.execute_text(&mac::get_deveui())
    }

    pub fn app_eui(&mut self) -> Result<String> {
        self.driver.execute_text(&mac::get_appeui())
    }

    pub fn app_key(&mut self) -> Result<String> {
        self.driver.execute_text(&mac::get_appkey())
    }

    pub fn dev_addr(&mut self) -> Result<String> {
        self.driver.execute_text(&mac::get_devaddr())
    }

    pub fn nwk_s_key(&mut self) -> Result<String> {
        self.driver.execute_text(&mac::get_nwkskey())
    }

    pub fn app_s_key(&mut self) -> Result<String> {
        self.driver.execute_text(&mac::get_appskey())
    }

    pub fn uplink_counter(&mut self) -> Result<u32> {
        self.driver
            .execute_scalar_strict(&mac::get_upcnt(), "uplink counter")
    }

    pub fn downlink_counter(&mut self) -> Result<u32> {
        self.driver
            .execute_scalar_strict(&mac::get_downcnt(), "downlink counter")
    }

    pub fn tx_mode(&mut self) -> Result<TxMode> {
        let text = self.driver.execute_text(&mac::get_tx_mode())?;
        decode_tx_mode(&text)
    }

    pub fn set_tx_mode(&mut self, mode: TxMode) -> Result<()> {
        self.driver.expect_ok(&mac::set_tx_mode(mode))
    }

    pub fn battery_level(&mut self) -> Result<u8> {
        self.driver.execute_scalar(&mac::get_batt())
    }

    pub fn set_battery_level(&mut self, level: u8) -> Result<()> {
        self.driver.expect_ok(&mac::set_batt(level))
    }

    pub fn tx_confirm(&mut self) -> Result<bool> {
        self.driver.execute_bool(&mac::get_tx_confirm())
    }

    pub fn set_tx_confirm(&mut self, on: bool) -> Result<()> {
        self.driver.expect_ok(&mac::set_tx_confirm(on))
    }

    pub fn lbt(&mut self) -> Result<bool> {
        self.driver.execute_bool(&mac::get_lbt())
    }

    pub fn set_lbt(&mut self, on: bool) -> Result<()> {
        self.driver.expect_ok(&mac::set_lbt(on))
    }

    pub fn uplink_dwell(&mut self) -> Result<bool> {
        self.driver.execute_bool(&mac::get_uplink_dwell())
    }

    pub fn set_uplink_dwell(&mut self, on: bool) -> Result<()> {
        self.driver.expect_ok(&mac::set_uplink_dwell(on))
    }

    pub fn downlink_dwell(&mut self) -> Result<bool> {
        self.driver.execute_bool(&mac::get_downlink_dwell())
    }

    pub fn set_downlink_dwell(&mut self, on: bool) -> Result<()> {
        self.driver.expect_ok(&mac::set_downlink_dwell(on))
    }

    pub fn max_eirp(&mut self) -> Result<u8> {
        self.driver.execute_scalar(&mac::get_max_eirp())
    }

    pub fn set_max_eirp(&mut self, index: u8) -> Result<()> {
        self.driver.expect_ok(&mac::set_max_eirp(index)?)
    }

    /// Enabled channel counts for the 125 kHz and 500 kHz groups.
    pub fn channel_count(&mut self) -> Result<String> {
        self.driver.execute_text(&mac::get_ch_count())
    }

    pub fn set_channel_count(&mut self, count: u8, bandwidth_khz: u16) -> Result<()> {
        self.driver.expect_ok(&mac::set_ch_count(count, bandwidth_khz)?)
    }

    pub fn tx_interval(&mut self) -> Result<u32> {
        self.driver.execute_scalar(&mac::get_tx_interval())
    }

    pub fn set_tx_interval(&mut self, ms: u32) -> Result<()> {
        self.driver.expect_ok(&mac::set_tx_interval(ms))
    }

    pub fn rx1_freq(&mut self) -> Result<String> {
        self.driver.execute_text(&mac::get_rx1_freq())
    }

    pub fn set_rx1_freq(&mut self, begin_hz: u32, step_hz: u32, count: u8) -> Result<()> {
        self.driver
            .expect_ok(&mac::set_rx1_freq(begin_hz, step_hz, count))
    }

    pub fn auto_join(&mut self) -> Result<AutoJoin> {
        let text = self.driver.execute_text(&mac::get_auto_join())?;
        decode_auto_join(&text)
    }

    pub fn set_auto_join(&mut self, on: bool, mode: JoinMode, attempts: u8) -> Result<()> {
        self.driver
            .expect_ok(&mac::set_auto_join(on, mode, attempts))
    }

    pub fn power_index(&mut self) -> Result<u8> {
        self.driver.execute_scalar(&mac::get_power_index())
    }

    pub fn set_power_index(&mut self, index: u8) -> Result<()> {
        self.driver.expect_ok(&mac::set_power_index(index))
    }
}
