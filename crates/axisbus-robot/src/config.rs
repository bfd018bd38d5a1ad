use std::time::Duration;

use axisbus_frame::FrameConfig;
use axisbus_transport::SerialConfig;

/// Configuration for a robot connection.
#[derive(Debug, Clone)]
pub struct RobotConfig {
    /// Serial device settings (baud rate, read timeout).
    pub serial: SerialConfig,
    /// Framing settings (send spacing, receive buffer cap).
    pub frame: FrameConfig,
    /// Pause after a point table write while the controller commits it.
    /// Default: 500 ms.
    pub set_to_settle: Duration,
    /// Sleep between poll loop iterations that read nothing. Default: 1 ms.
    pub poll_interval: Duration,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            frame: FrameConfig::default(),
            set_to_settle: Duration::from_millis(500),
            poll_interval: Duration::from_millis(1),
        }
    }
}
