mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, LinkArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "s7xg", version, about = "AcSIP S7xG LoRa/GNSS module CLI")]
struct Cli {
    #[command(flatten)]
    link: LinkArgs,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.link, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "s7xg",
            "--port",
            "/dev/ttyUSB0",
            "send",
            "mac",
            "get_class",
            "--raw",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.command, vec!["mac", "get_class"]);
                assert!(args.raw);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rf_tx_requires_exactly_one_payload() {
        let err = Cli::try_parse_from(["s7xg", "rf-tx", "--text", "hi", "--hex", "6869"])
            .expect_err("conflicting payloads should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let err = Cli::try_parse_from(["s7xg", "rf-tx"]).expect_err("payload is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn global_link_options_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "s7xg",
            "gps",
            "--fix-format",
            "dms",
            "--baud",
            "9600",
            "--timeout",
            "3s",
        ])
        .expect("gps args should parse");
        assert_eq!(cli.link.baud, 9600);
        assert_eq!(cli.link.timeout.as_deref(), Some("3s"));
        assert!(matches!(cli.command, Command::Gps(_)));
    }
}
