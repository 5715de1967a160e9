use tracing::info;

use crate::cmd::{LinkArgs, RfTxArgs};
use crate::exit::{driver_error, CliError, CliResult, SUCCESS};

pub fn run(args: RfTxArgs, link: &LinkArgs) -> CliResult<i32> {
    let payload = Payload::from_args(&args)?;
    let mut device = link.open()?;

    let result = match &payload {
        Payload::Text(text) => device.rf_send_text(text),
        Payload::Hex(hex) => device.rf_send_hex(hex),
    };
    result.map_err(|err| driver_error("rf tx failed", err))?;

    info!(bytes = payload.len(), "packet sent");
    Ok(SUCCESS)
}

enum Payload<'a> {
    Text(&'a str),
    Hex(&'a str),
}

impl<'a> Payload<'a> {
    fn from_args(args: &'a RfTxArgs) -> CliResult<Self> {
        match (&args.text, &args.hex) {
            (Some(text), None) => Ok(Payload::Text(text)),
            (None, Some(hex)) => Ok(Payload::Hex(hex)),
            _ => Err(CliError::usage("exactly one of --text or --hex is required")),
        }
    }

    fn len(&self) -> usize {
        match self {
            Payload::Text(text) => text.len(),
            Payload::Hex(hex) => hex.len() / 2,
        }
    }
}
