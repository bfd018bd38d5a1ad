use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::cmd::{open, parse_duration, MonitorArgs};
use crate::exit::{robot_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_velocity, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let (connection, port) = open(&args.line)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        if args.query {
            connection
                .current_position()
                .map_err(|err| robot_error("position request failed", err))?;
        }
        std::thread::sleep(interval);

        if !connection.is_polling() {
            warn!("poll loop ended");
            break;
        }

        print_velocity(&connection.velocity_state(), &port, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    connection
        .shutdown()
        .map_err(|err| robot_error("read failed", err))?;
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
