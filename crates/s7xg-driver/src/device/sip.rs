use std::thread;

use s7xg_transport::ByteLink;
use tracing::debug;

use super::{unexpected, Device};
use crate::command::sip;
use crate::decode::fields::scan_fields;
use crate::decode::sip::{
    decode_battery_voltage, decode_gpio_level, decode_model, decode_uuid, is_adc_preamble,
};
use crate::error::Result;
use crate::types::{GpioGroup, LogLevel, Model, PinMode};

impl<L: ByteLink> Device<L> {
    /// Reboot the module and throw away whatever it prints while starting.
    pub fn reset(&mut self) -> Result<()> {
        drop(self.driver.transaction(&sip::reset())?);
        thread::sleep(self.reset_settle);
        let dropped = self.driver.discard_pending()?;
        debug!(dropped, "module reset");
        Ok(())
    }

    pub fn factory_reset(&mut self) -> Result<()> {
        self.driver.expect_ok(&sip::factory_reset())
    }

    /// Read and remember the hardware model.
    pub fn model(&mut self) -> Result<Model> {
        let text = self.driver.execute_text(&sip::get_hw_model())?;
        let model = decode_model(&text)?;
        self.model = Some(model);
        Ok(model)
    }

    pub fn firmware_version(&mut self) -> Result<String> {
        self.driver.execute_text(&sip::get_ver())
    }

    pub fn hardware_version(&mut self) -> Result<String> {
        self.driver.execute_text(&sip::get_hw_model_ver())
    }

    pub fn uuid(&mut self) -> Result<String> {
        let text = self.driver.execute_text(&sip::get_uuid())?;
        decode_uuid(&text)
    }

    pub fn set_echo(&mut self, on: bool) -> Result<()> {
        self.driver.expect_ok(&sip::set_echo(on))
    }

    pub fn set_log(&mut self, level: LogLevel) -> Result<()> {
        self.driver.expect_ok(&sip::set_log(level))
    }

    /// Put the module to sleep; it acknowledges with a `sleep ...` line.
    pub fn sleep(&mut self, seconds: u32, uart_wake: bool) -> Result<()> {
        let response = self.driver.execute(&sip::sleep(seconds, uart_wake)?)?.check()?;
        if response.text().starts_with("sleep") {
            Ok(())
        } else {
            Err(unexpected(&response))
        }
    }

    /// Change the UART speed; takes effect after the reply.
    pub fn set_baudrate(&mut self, baud: u32, password: &str) -> Result<()> {
        self.driver.expect_ok(&sip::set_baudrate(baud, password))
    }

    pub fn set_gpio_mode(&mut self, group: GpioGroup, pin: u8, mode: PinMode) -> Result<()> {
        self.driver.expect_ok(&sip::set_gpio_mode(group, pin, mode)?)
    }

    pub fn set_gpio(&mut self, group: GpioGroup, pin: u8, high: bool) -> Result<()> {
        self.driver.expect_ok(&sip::set_gpio(group, pin, high)?)
    }

    pub fn gpio(&mut self, group: GpioGroup, pin: u8) -> Result<bool> {
        let text = self.driver.execute_text(&sip::get_gpio(group, pin)?)?;
        Ok(decode_gpio_level(&text))
    }

    pub fn set_battery_resistors(&mut self, r1: u32, r2: u32) -> Result<()> {
        self.driver.expect_ok(&sip::set_batt_resistor(r1, r2))
    }

    /// Divider resistors `(r1, r2)` in ohms.
    pub fn battery_resistors(&mut self) -> Result<(u32, u32)> {
        let text = self.driver.execute_text(&sip::get_batt_resistor())?;
        let [r1, r2] = scan_fields::<u32, 2>(&text, "battery resistors")?;
        Ok((r1, r2))
    }

    /// Battery voltage in millivolts. Some firmware sends an `adc volt`
    /// line first, which is skipped.
    pub fn battery_voltage(&mut self) -> Result<u16> {
        let mut tx = self.driver.transaction(&sip::get_batt_volt())?;
        let mut response = tx.next_frame()?.check()?;
        if is_adc_preamble(&response.text()) {
            debug!(preamble = %response.text(), "skipping adc reading");
            response = tx.next_frame()?.check()?;
        }
        decode_battery_voltage(&response.text())
    }
}
