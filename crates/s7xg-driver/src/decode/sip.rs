//! System reply decoders.

use crate::decode::fields::{short_scan, FieldScanner};
use crate::decode::unexpected;
use crate::error::Result;
use crate::types::{FirmwareVersion, Model};

/// `sip get_uuid`: the text after the first `=`.
pub fn decode_uuid(text: &str) -> Result<String> {
    text.split_once('=')
        .map(|(_, uuid)| uuid.to_string())
        .ok_or_else(|| unexpected("sip get_uuid", text))
}

/// `sip get_hw_model`: `S76G` or `S78G`.
pub fn decode_model(text: &str) -> Result<Model> {
    text.parse()
        .map_err(|_| unexpected("sip get_hw_model", text))
}

/// `sip get_ver`; `None` for builds this driver does not distinguish.
pub fn decode_firmware(text: &str) -> Option<FirmwareVersion> {
    text.parse().ok()
}

/// Whether a `sip get_batt_volt` frame is the `adc volt` preamble some
/// firmware sends ahead of the battery reading.
pub fn is_adc_preamble(text: &str) -> bool {
    text.starts_with("adc volt")
}

/// `battery volt <n> mV`, in millivolts.
pub fn decode_battery_voltage(text: &str) -> Result<u16> {
    let mut s = FieldScanner::new(text);
    s.literal("battery volt ")
        .ok_or_else(|| unexpected("sip get_batt_volt", text))?;
    let millivolts = s
        .field::<u16>()
        .ok_or_else(|| short_scan("battery voltage", 1, 0, text))?;
    s.literal(" mV")
        .ok_or_else(|| short_scan("battery voltage", 2, 1, text))?;
    Ok(millivolts)
}

/// `sip get_gpio`: `1` is high, anything else low.
pub fn decode_gpio_level(text: &str) -> bool {
    text == "1"
}
