use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use s7xg_driver::Poll;
use tracing::{info, warn};

use crate::cmd::{parse_duration, LinkArgs, ListenArgs};
use crate::exit::{driver_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_event, OutputFormat};

const IDLE_SLEEP: Duration = Duration::from_millis(5);

pub fn run(args: ListenArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let duration = args.duration.as_deref().map(parse_duration).transpose()?;
    let mut device = link.open()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    device
        .rf_receive(true)
        .map_err(|err| driver_error("enabling receive failed", err))?;
    info!("listening for radio packets");

    let started = Instant::now();
    let mut printed = 0usize;

    'listen: while running.load(Ordering::SeqCst) {
        if duration.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }

        let outcome = device
            .poll()
            .map_err(|err| driver_error("receive failed", err))?;
        if outcome == Poll::Idle {
            thread::sleep(IDLE_SLEEP);
            continue;
        }

        while let Some(event) = device.next_event() {
            print_event(&event, format);
            printed = printed.saturating_add(1);
            if args.count.is_some_and(|count| printed >= count) {
                break 'listen;
            }
        }
    }

    if let Err(err) = device.rf_receive(false) {
        warn!(error = %err, "disabling receive failed");
    }
    info!(printed, "stopped listening");
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
