use s7xg_driver::Command;

use crate::cmd::{LinkArgs, SendArgs};
use crate::exit::{driver_error, CliError, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: SendArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let command = command_line(&args.command)?;
    if args.frames == 0 {
        return Err(CliError::usage("--frames must be at least 1"));
    }

    let mut device = link.open()?;
    let driver = device.driver_mut();
    let mut tx = driver
        .transaction(&command)
        .map_err(|err| driver_error("send failed", err))?;

    for _ in 0..args.frames {
        let mut response = tx
            .next_frame()
            .map_err(|err| driver_error("no reply", err))?;
        if !args.raw {
            response = response
                .check()
                .map_err(|err| driver_error("command failed", err))?;
        }
        print_reply(tx.command(), &response.text(), format);
    }

    Ok(SUCCESS)
}

fn command_line(words: &[String]) -> CliResult<Command> {
    let line = words.join(" ");
    let line = line.trim();
    if line.is_empty() {
        return Err(CliError::usage("command must not be empty"));
    }
    if line.contains(['\r', '\n']) {
        return Err(CliError::usage("command must be a single line"));
    }
    Ok(Command::raw(line))
}
