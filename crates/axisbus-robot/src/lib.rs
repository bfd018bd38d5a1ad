//! Motor-control command layer for the axisbus line.
//!
//! [`Robot`] turns operations (servo, jog, point table moves, ...) into
//! paced command frames for the four slaves on the bus. A [`Poller`] reads
//! telemetry pushed back by the slaves and keeps the shared
//! [`VelocityState`] current. [`connect`] wires both to a serial device.

pub mod config;
pub mod connector;
pub mod error;
pub mod poller;
pub mod requests;
pub mod robot;
pub mod session;
pub mod velocity;

pub use config::RobotConfig;
pub use connector::{connect, connect_with_config, Connection};
pub use error::{Result, RobotError};
pub use poller::{pump, Poller, Pumped};
pub use requests::{parse_row, Request, SetPoint};
pub use robot::Robot;
pub use session::Session;
pub use velocity::{VelocitySnapshot, VelocityState};
