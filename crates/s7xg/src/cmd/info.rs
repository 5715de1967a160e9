use s7xg_driver::{FirmwareVersion, Model};
use serde::Serialize;
use tracing::warn;

use crate::cmd::{InfoArgs, LinkArgs};
use crate::exit::{driver_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct InfoOutput {
    port: String,
    model: Model,
    firmware: String,
    firmware_build: Option<FirmwareVersion>,
    hardware_version: Option<String>,
    uuid: Option<String>,
    battery_mv: Option<u16>,
}

pub fn run(args: InfoArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut device = link.open()?;

    let model = if args.no_init {
        device.model()
    } else {
        device.begin()
    }
    .map_err(|err| driver_error("initialization failed", err))?;

    let firmware = device
        .firmware_version()
        .map_err(|err| driver_error("firmware query failed", err))?;

    // Older builds lack some of these queries; report them as unavailable.
    let hardware_version = optional("hardware version", device.hardware_version());
    let uuid = optional("uuid", device.uuid());
    let battery_mv = optional("battery voltage", device.battery_voltage());

    let out = InfoOutput {
        port: device.driver().link().path().display().to_string(),
        model,
        firmware_build: firmware.parse().ok(),
        firmware,
        hardware_version,
        uuid,
        battery_mv,
    };

    let fields = [
        ("Port", out.port.clone()),
        ("Model", out.model.to_string()),
        ("Firmware", out.firmware.clone()),
        ("Hardware", display(&out.hardware_version)),
        ("UUID", display(&out.uuid)),
        (
            "Battery",
            out.battery_mv
                .map(|mv| format!("{mv} mV"))
                .unwrap_or_else(|| "unavailable".to_string()),
        ),
    ];
    print_record(&out, &fields, &out.model.to_string(), format);
    Ok(SUCCESS)
}

fn optional<T>(what: &str, result: s7xg_driver::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(what, error = %err, "query failed");
            None
        }
    }
}

fn display(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "unavailable".to_string())
}
