use std::time::Duration;

use axisbus_frame::SlaveAddress;
use axisbus_robot::{connect_with_config, Connection, RobotConfig};
use axisbus_transport::{find_port, SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_PORT_DESCRIPTIONS};
use clap::{Args, Subcommand, ValueEnum};
use tracing::info;

use crate::exit::{robot_error, transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod control;
pub mod monitor;
pub mod ports;
pub mod position;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Switch every servo on or off.
    Servo(ServoArgs),
    /// Clear latched alarms on every slave.
    AlarmReset(LineArgs),
    /// Pause motion on every slave (or resume with --resume).
    Pause(PauseArgs),
    /// Return every slave to its home position.
    Home(LineArgs),
    /// Start or stop jogging one slave.
    Jog(JogArgs),
    /// Request positions and print the velocity each slave reports.
    Position(PositionArgs),
    /// Move every slave to a stored point table row.
    MoveTo(MoveToArgs),
    /// Store a target in one slave's point table row.
    SetTo(SetToArgs),
    /// Print velocity snapshots until interrupted.
    Monitor(MonitorArgs),
    /// List attached serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Servo(args) => control::servo(args),
        Command::AlarmReset(args) => control::alarm_reset(args),
        Command::Pause(args) => control::pause(args),
        Command::Home(args) => control::home(args),
        Command::Jog(args) => control::jog(args),
        Command::Position(args) => position::run(args, format),
        Command::MoveTo(args) => control::move_to(args),
        Command::SetTo(args) => control::set_to(args),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// How to reach the controller line.
#[derive(Args, Debug, Clone)]
pub struct LineArgs {
    /// Serial device path (e.g. /dev/ttyUSB0, COM13).
    #[arg(long, env = "AXISBUS_PORT")]
    pub port: Option<String>,
    /// Pick the first port whose USB description contains this text.
    /// Repeatable; tried in order.
    #[arg(long, value_name = "DESCRIPTION")]
    pub find: Vec<String>,
    /// Line speed.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Args, Debug)]
pub struct ServoArgs {
    pub state: Switch,
    #[command(flatten)]
    pub line: LineArgs,
}

#[derive(Args, Debug)]
pub struct PauseArgs {
    /// Release a previous pause instead.
    #[arg(long)]
    pub resume: bool,
    #[command(flatten)]
    pub line: LineArgs,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Positive,
    Negative,
}

#[derive(Args, Debug)]
pub struct JogArgs {
    /// Slave address (01..04).
    pub slave: SlaveAddress,
    #[arg(long, short = 'd')]
    pub direction: Direction,
    /// Stop a jog in progress instead of starting one.
    #[arg(long)]
    pub stop: bool,
    #[command(flatten)]
    pub line: LineArgs,
}

#[derive(Args, Debug)]
pub struct PositionArgs {
    /// How long to collect replies before printing (e.g. 200ms, 1s).
    #[arg(long, default_value = "200ms")]
    pub wait: String,
    #[command(flatten)]
    pub line: LineArgs,
}

#[derive(Args, Debug)]
pub struct MoveToArgs {
    /// Point table row.
    pub row: String,
    #[command(flatten)]
    pub line: LineArgs,
}

#[derive(Args, Debug)]
pub struct SetToArgs {
    /// Slave address (01..04).
    pub slave: SlaveAddress,
    /// Point table row.
    pub row: String,
    /// Target position (mm).
    #[arg(allow_negative_numbers = true)]
    pub position: f64,
    /// Speed (mm/s).
    #[arg(allow_negative_numbers = true)]
    pub speed: f64,
    /// Acceleration (G).
    #[arg(allow_negative_numbers = true)]
    pub acc: f64,
    /// Deceleration (G).
    #[arg(allow_negative_numbers = true)]
    pub dec: f64,
    #[command(flatten)]
    pub line: LineArgs,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Time between snapshots (e.g. 500ms, 2s).
    #[arg(long, default_value = "500ms")]
    pub interval: String,
    /// Exit after printing N snapshots.
    #[arg(long)]
    pub count: Option<usize>,
    /// Request positions before each snapshot.
    #[arg(long)]
    pub query: bool,
    #[command(flatten)]
    pub line: LineArgs,
}

#[derive(Args, Debug)]
pub struct PortsArgs {
    /// Only list ports whose USB description contains this text.
    #[arg(long, value_name = "DESCRIPTION")]
    pub find: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Resolve the device path: `--port` wins, else USB description lookup.
pub fn resolve_port(line: &LineArgs) -> CliResult<String> {
    if let Some(port) = &line.port {
        return Ok(port.clone());
    }
    let found = if line.find.is_empty() {
        find_port(DEFAULT_PORT_DESCRIPTIONS)
    } else {
        find_port(line.find.as_slice())
    };
    found.map_err(|err| transport_error("port lookup failed", err))
}

/// Open the line and start the telemetry poll loop.
pub fn open(line: &LineArgs) -> CliResult<(Connection, String)> {
    let port = resolve_port(line)?;
    let config = RobotConfig {
        serial: SerialConfig {
            baud_rate: line.baud,
            ..SerialConfig::default()
        },
        ..RobotConfig::default()
    };
    let connection =
        connect_with_config(&port, &config).map_err(|err| robot_error("connect failed", err))?;
    info!(port = %port, "line open");
    Ok((connection, port))
}

/// Parse `500ms`, `2s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
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
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
    }

    #[test]
    fn parse_duration_rejects_bad_input() {
        for bad in ["", "0ms", "fast", "-1s"] {
            assert_eq!(parse_duration(bad).unwrap_err().code, USAGE, "{bad:?}");
        }
    }

    #[test]
    fn explicit_port_skips_lookup() {
        let line = LineArgs {
            port: Some("/dev/ttyUSB3".to_string()),
            find: Vec::new(),
            baud: DEFAULT_BAUD_RATE,
        };
        assert_eq!(resolve_port(&line).unwrap(), "/dev/ttyUSB3");
    }
}
