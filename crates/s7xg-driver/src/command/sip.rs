//! `sip` family: system control, GPIO, battery.

use crate::command::{check_range, Command};
use crate::error::{DriverError, Result};
use crate::types::{on_off, GpioGroup, LogLevel, PinMode};

pub fn reset() -> Command {
    Command::raw("sip reset")
}

pub fn factory_reset() -> Command {
    Command::raw("sip factory_reset")
}

pub fn get_hw_model() -> Command {
    Command::raw("sip get_hw_model")
}

pub fn get_ver() -> Command {
    Command::raw("sip get_ver")
}

pub fn get_hw_model_ver() -> Command {
    Command::raw("sip get_hw_model_ver")
}

pub fn get_uuid() -> Command {
    Command::raw("sip get_uuid")
}

pub fn set_echo(on: bool) -> Command {
    Command::raw(format!("sip set_echo {}", on_off(on)))
}

pub fn set_log(level: LogLevel) -> Command {
    Command::raw(format!("sip set_log {level}"))
}

/// Sleep for `seconds`, which must be a multiple of 10. With `uart_wake`
/// any UART traffic wakes the module early.
pub fn sleep(seconds: u32, uart_wake: bool) -> Result<Command> {
    if seconds % 10 != 0 {
        return Err(DriverError::InvalidArgument(format!(
            "sleep seconds must be a multiple of 10, got {seconds}"
        )));
    }
    let wake = if uart_wake { "uart_on" } else { "uart_off" };
    Ok(Command::raw(format!("sip sleep {seconds} {wake}")))
}

pub fn set_baudrate(baud: u32, password: &str) -> Command {
    Command::secret(format!("sip set_baudrate {baud} {password}"))
}

const PINS: std::ops::RangeInclusive<u8> = 1..=16;

pub fn set_gpio_mode(group: GpioGroup, pin: u8, mode: PinMode) -> Result<Command> {
    let pin = check_range("gpio pin", pin, PINS)?;
    Ok(Command::raw(format!("sip set_gpio_mode {group} {pin} {mode}")))
}

pub fn set_gpio(group: GpioGroup, pin: u8, high: bool) -> Result<Command> {
    let pin = check_range("gpio pin", pin, PINS)?;
    Ok(Command::raw(format!(
        "sip set_gpio {group} {pin} {}",
        u8::from(high)
    )))
}

pub fn get_gpio(group: GpioGroup, pin: u8) -> Result<Command> {
    let pin = check_range("gpio pin", pin, PINS)?;
    Ok(Command::raw(format!("sip get_gpio {group} {pin}")))
}

/// Battery divider resistors, in ohms.
pub fn set_batt_resistor(r1: u32, r2: u32) -> Command {
    Command::raw(format!("sip set_batt_resistor {r1} {r2}"))
}

pub fn get_batt_resistor() -> Command {
    Command::raw("sip get_batt_resistor")
}

pub fn get_batt_volt() -> Command {
    Command::raw("sip get_batt_volt")
}
