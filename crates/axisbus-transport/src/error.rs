use std::time::Duration;

/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// The serial driver rejected a configuration or query call.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// An I/O error occurred on the serial stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No attached port matched any of the requested descriptions.
    #[error("no serial port matches {}", .descriptions.join(", "))]
    PortNotFound { descriptions: Vec<String> },

    /// The send gate could not grant a slot before the deadline.
    #[error("send slot not available within {0:?}")]
    GateTimeout(Duration),
}

pub type Result<T> = std::result::Result<T, TransportError>;
