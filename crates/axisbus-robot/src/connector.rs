use std::io::{Read, Write};
use std::ops::Deref;
use std::sync::Arc;

use axisbus_frame::{FrameReader, FrameWriter};
use axisbus_transport::SerialStream;
use tracing::info;

use crate::config::RobotConfig;
use crate::error::Result;
use crate::poller::Poller;
use crate::robot::Robot;
use crate::velocity::VelocityState;

/// A robot with its poll loop running.
///
/// Dereferences to [`Robot`], so commands can be issued directly. The poll
/// loop stops when the connection is shut down or dropped.
#[derive(Debug)]
pub struct Connection<W = SerialStream> {
    robot: Arc<Robot<W>>,
    poller: Poller,
}

impl<W: Write> Connection<W> {
    /// Wire a reader/writer pair into a running robot.
    pub fn attach<R>(reader: R, writer: W, config: &RobotConfig) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let velocity = VelocityState::new();
        let poller = Poller::spawn(
            FrameReader::with_config(reader, config.frame.clone()),
            velocity.clone(),
            config.poll_interval,
        )?;
        let robot = Robot::from_parts(
            FrameWriter::with_config(writer, config.frame.clone()),
            velocity,
            config,
        );
        Ok(Self {
            robot: Arc::new(robot),
            poller,
        })
    }

    /// Shared handle to the robot, for use from other threads.
    pub fn robot(&self) -> Arc<Robot<W>> {
        Arc::clone(&self.robot)
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Stop the poll loop and report any line error it hit.
    pub fn shutdown(self) -> Result<()> {
        self.poller.join()
    }
}

impl<W> Deref for Connection<W> {
    type Target = Robot<W>;

    fn deref(&self) -> &Robot<W> {
        &self.robot
    }
}

/// Open a serial device with default settings and start polling it.
pub fn connect(path: &str) -> Result<Connection> {
    connect_with_config(path, &RobotConfig::default())
}

/// Open a serial device with explicit configuration and start polling it.
pub fn connect_with_config(path: &str, config: &RobotConfig) -> Result<Connection> {
    let writer = axisbus_transport::open(path, &config.serial)?;
    let reader = writer.try_clone()?;
    let connection = Connection::attach(reader, writer, config)?;
    info!(port = path, "robot connected");
    Ok(connection)
}
