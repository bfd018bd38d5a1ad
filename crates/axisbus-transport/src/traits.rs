use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use crate::error::Result;

/// An opened serial device — implements Read + Write.
///
/// This is the I/O type handed to the frame reader and writer. Both halves of
/// a session are obtained from one open port via [`SerialStream::try_clone`].
pub struct SerialStream {
    inner: Box<dyn SerialPort>,
    name: String,
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for SerialStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl SerialStream {
    pub(crate) fn from_port(inner: Box<dyn SerialPort>, name: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
        }
    }

    /// Device path this stream was opened from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of received bytes waiting in the driver buffer.
    pub fn bytes_to_read(&self) -> Result<u32> {
        Ok(self.inner.bytes_to_read()?)
    }

    /// Baud rate currently configured on the device.
    pub fn baud_rate(&self) -> Result<u32> {
        Ok(self.inner.baud_rate()?)
    }

    /// Set how long a read blocks before returning `TimedOut`.
    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        Ok(self.inner.set_timeout(timeout)?)
    }

    /// Open a second handle on the same device.
    ///
    /// Used to give the poll loop its own reader while commands keep writing.
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self::from_port(cloned, self.name.clone()))
    }
}

impl std::fmt::Debug for SerialStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialStream")
            .field("name", &self.name)
            .finish()
    }
}
