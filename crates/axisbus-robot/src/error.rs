/// Errors that can occur in robot operations.
#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    /// Transport-level error (opening or configuring the port).
    #[error("transport error: {0}")]
    Transport(#[from] axisbus_transport::TransportError),

    /// Frame-level error (encoding, writing or reading frames).
    #[error("frame error: {0}")]
    Frame(#[from] axisbus_frame::FrameError),

    /// Slave address not on the bus.
    #[error(transparent)]
    InvalidSlave(#[from] axisbus_frame::AddressError),

    /// A numeric argument does not fit its wire field.
    #[error("{field} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    /// The poll loop thread panicked.
    #[error("poll loop panicked")]
    PollerPanicked,
}

impl RobotError {
    pub(crate) fn out_of_range(
        field: &'static str,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
    ) -> Self {
        RobotError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Whether the caller supplied bad input (nothing was transmitted).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RobotError::InvalidSlave(_) | RobotError::OutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RobotError>;
