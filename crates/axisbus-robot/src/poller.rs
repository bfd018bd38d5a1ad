use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use axisbus_frame::{FrameError, FrameReader};
use tracing::{debug, trace, warn};

use crate::error::{Result, RobotError};
use crate::velocity::VelocityState;

/// Outcome of one [`pump`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pumped {
    /// Bytes read from the line.
    pub bytes: usize,
    /// Telemetry frames applied to the velocity state.
    pub updates: usize,
}

/// Read once from the line and apply every complete telemetry frame.
///
/// Frames that are not velocity telemetry are dropped. A receive buffer
/// overflow discards the partial line and is not fatal.
pub fn pump<R: Read>(reader: &mut FrameReader<R>, velocity: &VelocityState) -> Result<Pumped> {
    let bytes = match reader.fill() {
        Ok(n) => n,
        Err(FrameError::BufferOverflow { size, max }) => {
            warn!(size, max, "receive buffer overflow, partial line dropped");
            0
        }
        Err(err) => return Err(err.into()),
    };

    let mut updates = 0;
    for frame in reader.frames() {
        match frame.telemetry() {
            Ok(telemetry) => {
                debug!(
                    slave = %telemetry.slave,
                    velocity = telemetry.velocity,
                    "telemetry"
                );
                velocity.apply(&telemetry);
                updates += 1;
            }
            Err(err) => {
                trace!(frame = %frame.text().trim_end(), error = %err, "ignored frame");
            }
        }
    }

    Ok(Pumped { bytes, updates })
}

/// Background thread that keeps the velocity state current.
///
/// The loop runs until [`stop`](Self::stop) is called, the handle is dropped,
/// or the line fails. A line failure ends the loop and is returned by
/// [`join`](Self::join).
#[derive(Debug)]
pub struct Poller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl Poller {
    /// Start polling `reader` on a dedicated thread.
    pub fn spawn<R>(
        mut reader: FrameReader<R>,
        velocity: VelocityState,
        idle: Duration,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = std::thread::Builder::new()
            .name("axisbus-poll".to_string())
            .spawn(move || -> Result<()> {
                debug!("poll loop started");
                while !flag.load(Ordering::SeqCst) {
                    let pumped = pump(&mut reader, &velocity).inspect_err(|err| {
                        warn!(error = %err, "poll loop stopped on line error");
                    })?;
                    if pumped.bytes == 0 && !idle.is_zero() {
                        std::thread::sleep(idle);
                    }
                }
                debug!("poll loop stopped");
                Ok(())
            })
            .map_err(FrameError::Io)?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Ask the loop to exit after its current pass.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the loop and wait for it, returning any line error it hit.
    pub fn join(mut self) -> Result<()> {
        self.stop();
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| RobotError::PollerPanicked)?,
            None => Ok(()),
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}
