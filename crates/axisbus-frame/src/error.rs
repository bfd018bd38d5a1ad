use crate::address::AddressError;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The message hex does not split into whole bytes.
    #[error("odd-length message ({len} hex digits)")]
    OddLength { len: usize },

    /// A field that must be hexadecimal contains something else.
    #[error("invalid hex in {field}: {value:?}")]
    InvalidHex { field: &'static str, value: String },

    /// An inbound candidate failed the telemetry shape checks.
    #[error("malformed frame: {reason}")]
    Malformed { reason: &'static str },

    /// Undelimited bytes piled up past the configured limit and were dropped.
    #[error("receive buffer overflow ({size} bytes without delimiter, max {max})")]
    BufferOverflow { size: usize, max: usize },

    /// Slave address outside the bus.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The send gate or serial layer refused the operation.
    #[error("transport error: {0}")]
    Transport(#[from] axisbus_transport::TransportError),

    /// The line accepted zero bytes of a frame.
    #[error("line closed (write accepted no bytes)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
