use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Args, Subcommand, ValueEnum};
use s7xg_driver::{Device, DriverConfig, GpsDataFormat};
use s7xg_transport::{SerialLink, DEFAULT_BAUD_RATE};
use tracing::debug;

use crate::exit::{io_error, transport_error, CliError, CliResult, DATA_INVALID};
use crate::output::OutputFormat;

pub mod gps;
pub mod info;
pub mod listen;
pub mod rf_tx;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one command line and print the reply.
    Send(SendArgs),
    /// Initialize the module and print its identity.
    Info(InfoArgs),
    /// Query the GNSS receiver for a position.
    Gps(GpsArgs),
    /// Enable continuous receive and print radio packets.
    Listen(ListenArgs),
    /// Transmit one raw LoRa packet.
    RfTx(RfTxArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, link, format),
        Command::Info(args) => info::run(args, link, format),
        Command::Gps(args) => gps::run(args, link, format),
        Command::Listen(args) => listen::run(args, link, format),
        Command::RfTx(args) => rf_tx::run(args, link),
        Command::Version(args) => version::run(args),
    }
}

/// How to reach the module; shared by every subcommand that talks to it.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Serial device of the module (e.g. /dev/ttyUSB0).
    #[arg(long, short = 'p', env = "S7XG_PORT", global = true)]
    pub port: Option<PathBuf>,
    /// UART speed.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,
    /// Reply timeout (e.g. 5s, 500ms). Overrides the config file.
    #[arg(long, global = true)]
    pub timeout: Option<String>,
    /// Driver settings as JSON.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

impl LinkArgs {
    pub fn driver_config(&self) -> CliResult<DriverConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|err| {
                    io_error(&format!("failed reading {}", path.display()), err)
                })?;
                serde_json::from_str(&text).map_err(|err| {
                    CliError::new(
                        DATA_INVALID,
                        format!("{} is not a valid driver config: {err}", path.display()),
                    )
                })?
            }
            None => DriverConfig::default(),
        };
        if let Some(timeout) = &self.timeout {
            config.timeout = parse_duration(timeout)?;
        }
        Ok(config)
    }

    pub fn open(&self) -> CliResult<Device<SerialLink>> {
        let config = self.driver_config()?;
        let port = self
            .port
            .as_ref()
            .ok_or_else(|| CliError::usage("no serial port given (use --port or S7XG_PORT)"))?;
        let mut link = SerialLink::open(port, self.baud)
            .map_err(|err| transport_error("open failed", err))?;
        // Output the module produced before we attached is not ours to read.
        link.clear()
            .map_err(|err| transport_error("clearing port buffers failed", err))?;
        debug!(path = ?link.path(), ?config, "driver configured");
        Ok(Device::with_config(link, config))
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Command line, e.g. "sip get_ver". Quote it or pass the words separately.
    #[arg(required = true, num_args = 1..)]
    pub command: Vec<String>,
    /// Print the reply as-is; status words are not treated as failures.
    #[arg(long)]
    pub raw: bool,
    /// Number of reply frames to read (multi-stage commands answer twice).
    #[arg(long, default_value_t = 1)]
    pub frames: usize,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Skip the stop/reset sequence and only query identity.
    #[arg(long)]
    pub no_init: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum FixFormat {
    Raw,
    Dd,
    Dms,
}

impl From<FixFormat> for GpsDataFormat {
    fn from(format: FixFormat) -> Self {
        match format {
            FixFormat::Raw => GpsDataFormat::Raw,
            FixFormat::Dd => GpsDataFormat::Dd,
            FixFormat::Dms => GpsDataFormat::Dms,
        }
    }
}

#[derive(Args, Debug)]
pub struct GpsArgs {
    /// Coordinate representation of the fix.
    #[arg(long, value_enum, default_value = "dd")]
    pub fix_format: FixFormat,
    /// Run the start sequence (level shift, hot start, manual mode) first.
    #[arg(long)]
    pub start: bool,
    /// Keep querying until a fix arrives or this much time passes (e.g. 60s).
    #[arg(long)]
    pub wait: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Exit after receiving N packets.
    #[arg(long)]
    pub count: Option<usize>,
    /// Stop listening after this long (e.g. 10s).
    #[arg(long)]
    pub duration: Option<String>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("payload").required(true).args(["text", "hex"])))]
pub struct RfTxArgs {
    /// Text payload, sent as its bytes.
    #[arg(long)]
    pub text: Option<String>,
    /// Hex payload.
    #[arg(long)]
    pub hex: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `500ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
