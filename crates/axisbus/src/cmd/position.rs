use crate::cmd::{open, parse_duration, PositionArgs};
use crate::exit::{robot_error, CliResult, SUCCESS};
use crate::output::{print_velocity, OutputFormat};

pub fn run(args: PositionArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = parse_duration(&args.wait)?;
    let (connection, port) = open(&args.line)?;

    connection
        .current_position()
        .map_err(|err| robot_error("position request failed", err))?;
    // Replies are pushed back asynchronously; give the poll loop time to see them.
    std::thread::sleep(wait);

    let snapshot = connection.velocity_state();
    connection
        .shutdown()
        .map_err(|err| robot_error("read failed", err))?;

    print_velocity(&snapshot, &port, format);
    Ok(SUCCESS)
}
