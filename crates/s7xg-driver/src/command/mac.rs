//! `mac` family: LoRaWAN stack.

use s7xg_frame::hex;

use crate::command::{check_hex, check_range, Command};
use crate::error::{DriverError, Result};
use crate::types::{on_off, Confirm, DeviceClass, JoinMode, TxMode};

/// Valid application ports for uplinks.
pub const PORTS: std::ops::RangeInclusive<u8> = 1..=223;

pub fn join(mode: JoinMode) -> Command {
    Command::raw(format!("mac join {mode}"))
}

/// Uplink `payload` on `port`; the payload is hex-encoded on the wire.
pub fn tx(confirm: Confirm, port: u8, payload: &[u8]) -> Result<Command> {
    let port = check_range("port", port, PORTS)?;
    Ok(Command::raw(format!(
        "mac tx {confirm} {port} {}",
        hex::encode_upper(payload)
    )))
}

/// Uplink an already hex-encoded payload.
pub fn tx_hex(confirm: Confirm, port: u8, payload: &str) -> Result<Command> {
    let port = check_range("port", port, PORTS)?;
    check_hex("payload", payload, None)?;
    Ok(Command::raw(format!("mac tx {confirm} {port} {payload}")))
}

pub fn get_join_status() -> Command {
    Command::raw("mac get_join_status")
}

pub fn get_class() -> Command {
    Command::raw("mac get_class")
}

pub fn set_class(class: DeviceClass) -> Command {
    Command::raw(format!("mac set_class {class}"))
}

pub fn get_power() -> Command {
    Command::raw("mac get_power")
}

/// Transmit power in dBm; the allowed set depends on the band.
pub fn set_power(dbm: u8) -> Command {
    Command::raw(format!("mac set_power {dbm}"))
}

pub fn get_band() -> Command {
    Command::raw("mac get_band")
}

pub fn get_adr() -> Command {
    Command::raw("mac get_adr")
}

pub fn get_txretry() -> Command {
    Command::raw("mac get_txretry")
}

pub fn get_rxdelay() -> Command {
    Command::raw("mac get_rxdelay")
}

pub fn get_dr() -> Command {
    Command::raw("mac get_dr")
}

/// Data rate 0 to 6. US915 stops at 4 and CN470 at 5; the module enforces that.
pub fn set_dr(rate: u8) -> Result<Command> {
    let rate = check_range("data rate", rate, 0..=6)?;
    Ok(Command::raw(format!("mac set_dr {rate}")))
}

pub fn get_rx2() -> Command {
    Command::raw("mac get_rx2")
}

pub fn get_sync() -> Command {
    Command::raw("mac get_sync")
}

pub fn get_ch_para(channel: u8) -> Command {
    Command::raw(format!("mac get_ch_para {channel}"))
}

pub fn get_ch_status(channel: u8) -> Command {
    Command::raw(format!("mac get_ch_status {channel}"))
}

pub fn set_ch_freq(channel: u8, freq: u32) -> Command {
    Command::raw(format!("mac set_ch_freq {channel} {freq}"))
}

pub fn get_dc_ctl() -> Command {
    Command::raw("mac get_dc_ctl")
}

pub fn get_dc_band(band: u8) -> Command {
    Command::raw(format!("mac get_dc_band {band}"))
}

pub fn set_deveui(eui: &str) -> Result<Command> {
    check_hex("deveui", eui, Some(16))?;
    Ok(Command::secret(format!("mac set_deveui {eui}")))
}

pub fn set_appeui(eui: &str) -> Result<Command> {
    check_hex("appeui", eui, Some(16))?;
    Ok(Command::secret(format!("mac set_appeui {eui}")))
}

pub fn set_appkey(key: &str) -> Result<Command> {
    check_hex("appkey", key, Some(32))?;
    Ok(Command::secret(format!("mac set_appkey {key}")))
}

pub fn set_devaddr(addr: &str) -> Result<Command> {
    check_hex("devaddr", addr, Some(8))?;
    Ok(Command::secret(format!("mac set_devaddr {addr}")))
}

pub fn set_nwkskey(key: &str) -> Result<Command> {
    check_hex("nwkskey", key, Some(32))?;
    Ok(Command::secret(format!("mac set_nwkskey {key}")))
}

pub fn set_appskey(key: &str) -> Result<Command> {
    check_hex("appskey", key, Some(32))?;
    Ok(Command::secret(format!("mac set_appskey {key}")))
}

/// Every LoRaWAN identity and key in one command.
#[derive(Clone, Default)]
pub struct Keys {
    pub devaddr: String,
    pub deveui: String,
    pub appeui: String,
    pub appkey: String,
    pub appskey: String,
    pub nwkskey: String,
}

impl std::fmt::Debug for Keys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keys")
            .field("devaddr", &self.devaddr)
            .field("deveui", &self.deveui)
            .field("appeui", &self.appeui)
            .field("appkey", &"<redacted>")
            .field("appskey", &"<redacted>")
            .field("nwkskey", &"<redacted>")
            .finish()
    }
}

pub fn set_keys(keys: &Keys) -> Result<Command> {
    check_hex("devaddr", &keys.devaddr, Some(8))?;
    check_hex("deveui", &keys.deveui, Some(16))?;
    check_hex("appeui", &keys.appeui, Some(16))?;
    check_hex("appkey", &keys.appkey, Some(32))?;
    check_hex("appskey", &keys.appskey, Some(32))?;
    check_hex("nwkskey", &keys.nwkskey, Some(32))?;
    Ok(Command::secret(format!(
        "mac set_keys {} {} {} {} {} {}",
        keys.devaddr, keys.deveui, keys.appeui, keys.appkey, keys.appskey, keys.nwkskey
    )))
}

pub fn get_deveui() -> Command {
    Command::raw("mac get_deveui")
}

pub fn get_appeui() -> Command {
    Command::raw("mac get_appeui")
}

pub fn get_appkey() -> Command {
    Command::raw("mac get_appkey")
}

pub fn get_devaddr() -> Command {
    Command::raw("mac get_devaddr")
}

pub fn get_nwkskey() -> Command {
    Command::raw("mac get_nwkskey")
}

pub fn get_appskey() -> Command {
    Command::raw("mac get_appskey")
}

pub fn get_upcnt() -> Command {
    Command::raw("mac get_upcnt")
}

pub fn get_downcnt() -> Command {
    Command::raw("mac get_downcnt")
}

pub fn set_tx_mode(mode: TxMode) -> Command {
    Command::raw(format!("mac set_tx_mode {mode}"))
}

pub fn get_tx_mode() -> Command {
    Command::raw("mac get_tx_mode")
}

/// Battery level reported in DevStatusAns.
pub fn set_batt(level: u8) -> Command {
    Command::raw(format!("mac set_batt {level}"))
}

pub fn get_batt() -> Command {
    Command::raw("mac get_batt")
}

pub fn set_tx_confirm(on: bool) -> Command {
    Command::raw(format!("mac set_tx_confirm {}", on_off(on)))
}

pub fn get_tx_confirm() -> Command {
    Command::raw("mac get_tx_confirm")
}

pub fn set_lbt(on: bool) -> Command {
    Command::raw(format!("mac set_lbt {}", on_off(on)))
}

pub fn get_lbt() -> Command {
    Command::raw("mac get_lbt")
}

pub fn set_uplink_dwell(on: bool) -> Command {
    Command::raw(format!("mac set_uplink_dwell {}", on_off(on)))
}

pub fn get_uplink_dwell() -> Command {
    Command::raw("mac get_uplink_dwell")
}

pub fn set_downlink_dwell(on: bool) -> Command {
    Command::raw(format!("mac set_downlink_dwell {}", on_off(on)))
}

pub fn get_downlink_dwell() -> Command {
    Command::raw("mac get_downlink_dwell")
}

/// MaxEIRP index 0 to 15.
pub fn set_max_eirp(index: u8) -> Result<Command> {
    let index = check_range("max eirp index", index, 0..=15)?;
    Ok(Command::raw(format!("mac set_max_eirp {index}")))
}

pub fn get_max_eirp() -> Command {
    Command::raw("mac get_max_eirp")
}

/// Enabled channel count for the 125 kHz or 500 kHz group.
pub fn set_ch_count(count: u8, bandwidth_khz: u16) -> Result<Command> {
    if !matches!(count, 0..=8 | 16 | 32 | 48 | 64 | 80 | 96) {
        return Err(DriverError::InvalidArgument(format!(
            "channel count must be 0..=8, 16, 32, 48, 64, 80 or 96, got {count}"
        )));
    }
    if !matches!(bandwidth_khz, 125 | 500) {
        return Err(DriverError::InvalidArgument(format!(
            "channel group bandwidth must be 125 or 500 kHz, got {bandwidth_khz}"
        )));
    }
    Ok(Command::raw(format!("mac set_ch_count {count} {bandwidth_khz}")))
}

pub fn get_ch_count() -> Command {
    Command::raw("mac get_ch_count")
}

pub fn set_tx_interval(ms: u32) -> Command {
    Command::raw(format!("mac set_tx_interval {ms}"))
}

pub fn get_tx_interval() -> Command {
    Command::raw("mac get_tx_interval")
}

pub fn set_rx1_freq(begin_hz: u32, step_hz: u32, count: u8) -> Command {
    Command::raw(format!("mac set_rx1_freq {begin_hz} {step_hz} {count}"))
}

pub fn get_rx1_freq() -> Command {
    Command::raw("mac get_rx1_freq")
}

pub fn set_auto_join(on: bool, mode: JoinMode, attempts: u8) -> Command {
    Command::raw(format!("mac set_auto_join {} {mode} {attempts}", on_off(on)))
}

pub fn get_auto_join() -> Command {
    Command::raw("mac get_auto_join")
}

pub fn set_power_index(index: u8) -> Command {
    Command::raw(format!("mac set_power_index {index}"))
}

pub fn get_power_index() -> Command {
    Command::raw("mac get_power_index")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_encodes_payload_as_hex() {
        let cmd = tx(Confirm::Unconfirmed, 10, &[0x01, 0xAB]).unwrap();
        assert_eq!(cmd.text(), "mac tx ucnf 10 01AB");
        let cmd = tx_hex(Confirm::Confirmed, 1, "cafe").unwrap();
        assert_eq!(cmd.text(), "mac tx cnf 1 cafe");
    }

    #[test]
    fn tx_port_is_checked_before_anything_is_built() {
        assert!(matches!(
            tx(Confirm::Confirmed, 0, b"x"),
            Err(DriverError::InvalidArgument(_))
        ));
        assert!(tx(Confirm::Confirmed, 224, b"x").is_err());
        assert!(tx_hex(Confirm::Confirmed, 2, "xyz").is_err());
    }

    #[test]
    fn join_and_class() {
        assert_eq!(join(JoinMode::Otaa).text(), "mac join otaa");
        assert_eq!(set_class(DeviceClass::C).text(), "mac set_class C");
    }

    #[test]
    fn key_setters_validate_and_redact() {
        let cmd = set_deveui("0011223344556677").unwrap();
        assert!(cmd.is_secret());
        assert_eq!(cmd.to_string(), "mac set_deveui <redacted:31 bytes>");
        assert!(set_appkey("00").is_err());
        assert!(set_devaddr("0011223Z").is_err());
    }

    #[test]
    fn set_keys_orders_fields() {
        let keys = Keys {
            devaddr: "01020304".into(),
            deveui: "0000000000000001".into(),
            appeui: "0000000000000002".into(),
            appkey: "00000000000000000000000000000003".into(),
            appskey: "00000000000000000000000000000004".into(),
            nwkskey: "00000000000000000000000000000005".into(),
        };
        let cmd = set_keys(&keys).unwrap();
        let words: Vec<&str> = cmd.text().split(' ').collect();
        assert_eq!(words[2], "01020304");
        assert!(words[7].ends_with('5'));
        assert!(!format!("{keys:?}").contains("00000003"));
    }

    #[test]
    fn channel_count_values() {
        assert_eq!(set_ch_count(8, 125).unwrap().text(), "mac set_ch_count 8 125");
        assert!(set_ch_count(64, 500).is_ok());
        assert!(set_ch_count(9, 125).is_err());
        assert!(set_ch_count(8, 250).is_err());
    }

    #[test]
    fn ranges() {
        assert!(set_dr(7).is_err());
        assert_eq!(set_max_eirp(15).unwrap().text(), "mac set_max_eirp 15");
        assert!(set_max_eirp(16).is_err());
        assert_eq!(
            set_auto_join(true, JoinMode::Abp, 3).text(),
            "mac set_auto_join on abp 3"
        );
    }
}
