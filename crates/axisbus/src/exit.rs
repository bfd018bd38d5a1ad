use std::fmt;
use std::io;

use axisbus_frame::FrameError;
use axisbus_robot::RobotError;
use axisbus_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::BrokenPipe | io::ErrorKind::NotFound => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::GateTimeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        TransportError::PortNotFound { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::ConnectionClosed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        FrameError::OddLength { .. } | FrameError::InvalidHex { .. } | FrameError::Address(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn robot_error(context: &str, err: RobotError) -> CliError {
    match err {
        RobotError::Transport(err) => transport_error(context, err),
        RobotError::Frame(err) => frame_error(context, err),
        RobotError::InvalidSlave(_) | RobotError::OutOfRange { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        RobotError::PollerPanicked => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn validation_errors_are_usage() {
        let err = RobotError::OutOfRange {
            field: "row",
            value: "9999".to_string(),
            min: "0".to_string(),
            max: "3839".to_string(),
        };
        assert_eq!(robot_error("set-to", err).code, USAGE);
    }

    #[test]
    fn gate_timeout_is_timeout() {
        let err = RobotError::Frame(FrameError::Transport(TransportError::GateTimeout(
            Duration::from_millis(5),
        )));
        assert_eq!(robot_error("servo", err).code, TIMEOUT);
    }

    #[test]
    fn closed_line_is_transport_error() {
        let err = RobotError::Frame(FrameError::ConnectionClosed);
        let cli = robot_error("home", err);
        assert_eq!(cli.code, TRANSPORT_ERROR);
        assert!(cli.message.starts_with("home: "));
    }
}
