mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "axisbus", version, about = "Four-axis motor controller CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

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
    use crate::cmd::{Direction, Switch};

    #[test]
    fn parses_servo_subcommand() {
        let cli = Cli::try_parse_from(["axisbus", "servo", "on", "--port", "/dev/ttyUSB0"])
            .expect("servo args should parse");
        match cli.command {
            Command::Servo(args) => {
                assert_eq!(args.state, Switch::On);
                assert_eq!(args.line.port.as_deref(), Some("/dev/ttyUSB0"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_jog_with_direction() {
        let cli = Cli::try_parse_from(["axisbus", "jog", "03", "--direction", "negative", "--stop"])
            .expect("jog args should parse");
        match cli.command {
            Command::Jog(args) => {
                assert_eq!(args.slave.id(), 3);
                assert_eq!(args.direction, Direction::Negative);
                assert!(args.stop);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_slave() {
        let err = Cli::try_parse_from(["axisbus", "jog", "05", "--direction", "positive"])
            .expect_err("slave 05 is not on the bus");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn set_to_accepts_negative_position() {
        let cli = Cli::try_parse_from(["axisbus", "set-to", "01", "2", "-10.5", "50", "0.1", "0.1"])
            .expect("set-to args should parse");
        match cli.command {
            Command::SetTo(args) => {
                assert_eq!(args.position, -10.5);
                assert_eq!(args.row, "2");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn find_is_repeatable() {
        let cli = Cli::try_parse_from([
            "axisbus",
            "home",
            "--find",
            "ATEN",
            "--find",
            "Prolific",
        ])
        .expect("home args should parse");
        match cli.command {
            Command::Home(line) => assert_eq!(line.find, ["ATEN", "Prolific"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
