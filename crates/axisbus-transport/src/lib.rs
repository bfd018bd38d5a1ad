//! Serial line transport for axisbus.
//!
//! This is the lowest layer of axisbus. It owns the physical channel to the
//! motor-control nodes and paces outbound traffic:
//! - [`SerialStream`] wraps an opened serial device as `Read + Write`
//! - [`SendGate`] enforces the minimum spacing between transmitted frames
//! - [`list_ports`] / [`find_port`] locate the adapter by its USB description
//!
//! Everything above (framing, the robot facade) builds on these types.

pub mod error;
pub mod gate;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use gate::SendGate;
pub use serial::{
    find_port, list_ports, open, PortInfo, PortKind, SerialConfig, DEFAULT_BAUD_RATE,
    DEFAULT_PORT_DESCRIPTIONS,
};
pub use traits::SerialStream;
