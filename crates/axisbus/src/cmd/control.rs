use axisbus_robot::{parse_row, Connection, Robot, SetPoint};
use axisbus_transport::SerialStream;

use crate::cmd::{
    open, Direction, JogArgs, LineArgs, MoveToArgs, PauseArgs, ServoArgs, SetToArgs, Switch,
};
use crate::exit::{robot_error, CliResult, SUCCESS};

/// Open the line, run one operation, then close it.
fn with_robot(
    line: &LineArgs,
    context: &str,
    op: impl FnOnce(&Robot<SerialStream>) -> axisbus_robot::Result<()>,
) -> CliResult<i32> {
    let (connection, _port) = open(line)?;
    op(&*connection).map_err(|err| robot_error(context, err))?;
    close(connection, context)?;
    Ok(SUCCESS)
}

fn close(connection: Connection, context: &str) -> CliResult<()> {
    connection
        .shutdown()
        .map_err(|err| robot_error(context, err))
}

pub fn servo(args: ServoArgs) -> CliResult<i32> {
    with_robot(&args.line, "servo failed", |robot| {
        robot.servo(args.state == Switch::On)
    })
}

pub fn alarm_reset(args: LineArgs) -> CliResult<i32> {
    with_robot(&args, "alarm reset failed", Robot::alarm_reset)
}

pub fn pause(args: PauseArgs) -> CliResult<i32> {
    with_robot(&args.line, "pause failed", |robot| robot.pause(!args.resume))
}

pub fn home(args: LineArgs) -> CliResult<i32> {
    with_robot(&args, "home failed", Robot::home)
}

pub fn jog(args: JogArgs) -> CliResult<i32> {
    let positive_side = args.direction == Direction::Positive;
    with_robot(&args.line, "jog failed", |robot| {
        robot.jog(args.slave, positive_side, !args.stop)
    })
}

pub fn move_to(args: MoveToArgs) -> CliResult<i32> {
    let row = parse_row(&args.row).map_err(|err| robot_error("move-to", err))?;
    with_robot(&args.line, "move-to failed", |robot| robot.move_to(row))
}

pub fn set_to(args: SetToArgs) -> CliResult<i32> {
    let row = parse_row(&args.row).map_err(|err| robot_error("set-to", err))?;
    let point = SetPoint {
        position: args.position,
        speed: args.speed,
        acc: args.acc,
        dec: args.dec,
    };
    // Checked before the port is opened so bad input never touches the line.
    axisbus_robot::requests::set_to(args.slave, row, &point)
        .map_err(|err| robot_error("set-to", err))?;
    with_robot(&args.line, "set-to failed", |robot| {
        robot.set_to(args.slave, row, &point)
    })
}
