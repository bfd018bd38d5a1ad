//! Command and telemetry layer for four-axis motor controllers on a
//! Modbus-ASCII serial line.
//!
//! # Crate Structure
//!
//! - [`transport`] — Serial port access, port discovery and send pacing
//! - [`frame`] — ASCII framing, LRC checksums and telemetry decoding
//! - [`robot`] — Motor-control operations and velocity tracking (behind `robot` feature)

/// Re-export transport types.
pub mod transport {
    pub use axisbus_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use axisbus_frame::*;
}

/// Re-export robot types (requires `robot` feature).
#[cfg(feature = "robot")]
pub mod robot {
    pub use axisbus_robot::*;
}
