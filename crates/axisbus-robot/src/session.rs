use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use axisbus_frame::FrameWriter;

use crate::error::Result;
use crate::requests::Request;

/// Send side of the line, shared by every caller.
///
/// A request is encoded for all of its slaves before the first byte goes out,
/// and its frames are written back to back under one lock, so broadcasts from
/// concurrent callers never interleave.
pub struct Session<W> {
    writer: Mutex<FrameWriter<W>>,
}

impl<W: Write> Session<W> {
    pub fn new(writer: FrameWriter<W>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Transmit one request (one frame per addressed slave).
    pub fn send(&self, request: &Request) -> Result<()> {
        let frames = request.frames()?;
        let mut writer = self.lock();
        for frame in &frames {
            writer.write_frame(frame)?;
        }
        Ok(())
    }

    /// Transmit several requests in order.
    pub fn send_all(&self, requests: &[Request]) -> Result<()> {
        requests.iter().try_for_each(|request| self.send(request))
    }

    /// Run `f` with exclusive access to the writer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut FrameWriter<W>) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, FrameWriter<W>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W> std::fmt::Debug for Session<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
