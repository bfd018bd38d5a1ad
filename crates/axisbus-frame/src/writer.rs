use std::io::{ErrorKind, Write};

use axisbus_transport::SendGate;
use bytes::BytesMut;
use tracing::debug;

use crate::address::SlaveAddress;
use crate::codec::{encode_frame, CommandFrame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::function::FunctionCode;

const INITIAL_BUFFER_CAPACITY: usize = 128;

/// Writes complete frames to any `Write` stream, paced by a [`SendGate`].
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    gate: SendGate,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            gate: SendGate::new(config.min_spacing),
            config,
        }
    }

    /// Encode and send one command frame.
    ///
    /// Encoding happens before the gate is entered, so a malformed command
    /// never takes a send slot.
    pub fn send<S: AsRef<str>>(
        &mut self,
        slave: SlaveAddress,
        function: FunctionCode,
        register: u16,
        data: &[S],
    ) -> Result<()> {
        self.buf.clear();
        encode_frame(slave, function, register, data, &mut self.buf)?;
        self.transmit()
    }

    /// Write an already encoded frame.
    pub fn write_frame(&mut self, frame: &CommandFrame) -> Result<()> {
        self.buf.clear();
        self.buf.extend_from_slice(frame.as_bytes());
        self.transmit()
    }

    fn transmit(&mut self) -> Result<()> {
        let Self {
            inner,
            buf,
            gate,
            config,
        } = self;

        debug!(
            frame = %String::from_utf8_lossy(buf).trim_end(),
            len = buf.len(),
            "sending frame"
        );

        match config.send_timeout {
            Some(timeout) => gate.transmit_within(timeout, || write_all(inner, buf))?,
            None => gate.transmit(|| write_all(inner, buf)),
        }
    }

    /// The gate pacing this writer.
    pub fn gate(&self) -> &SendGate {
        &self.gate
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

fn write_all<T: Write>(inner: &mut T, buf: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match inner.write(&buf[offset..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }

    loop {
        match inner.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::codec::checksum_ok;

    fn slave(id: u8) -> SlaveAddress {
        SlaveAddress::new(id).unwrap()
    }

    fn fast() -> FrameConfig {
        FrameConfig {
            min_spacing: Duration::from_millis(1),
            ..FrameConfig::default()
        }
    }

    #[test]
    fn writes_exact_wire_bytes() {
        let mut writer = FrameWriter::with_config(Vec::new(), fast());
        writer
            .send(slave(1), FunctionCode::WriteSingleCoil, 0x0403, &["FF00"])
            .unwrap();
        assert_eq!(writer.get_ref().as_slice(), b":01050403FF00F4\r\n");
    }

    #[test]
    fn write_frame_matches_send() {
        let frame =
            CommandFrame::encode(slave(2), FunctionCode::ReadRegisters, 0x9000, &["0002"]).unwrap();
        let mut writer = FrameWriter::with_config(Vec::new(), fast());
        writer.write_frame(&frame).unwrap();
        assert_eq!(writer.get_ref().as_slice(), frame.as_bytes());
        assert!(checksum_ok(writer.get_ref()));
    }

    #[test]
    fn encoding_error_sends_nothing() {
        let mut writer = FrameWriter::new(Vec::new());
        let err = writer
            .send(slave(1), FunctionCode::WriteSingleRegister, 0x9800, &["ABC"])
            .unwrap_err();
        assert!(matches!(err, FrameError::OddLength { .. }));
        assert!(writer.get_ref().is_empty());
        assert!(writer.gate().last_send().is_none());
    }

    #[test]
    fn consecutive_sends_respect_spacing() {
        let mut writer = FrameWriter::new(TimedSink::default());
        for id in 1..=3 {
            writer
                .send(slave(id), FunctionCode::WriteSingleCoil, 0x040A, &["0000"])
                .unwrap();
        }
        let stamps = &writer.get_ref().writes;
        assert_eq!(stamps.len(), 3);
        for pair in stamps.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(20));
        }
    }

    #[test]
    fn short_writes_are_completed() {
        let mut writer = FrameWriter::with_config(TwoBytesAtATime(Vec::new()), fast());
        writer
            .send(slave(4), FunctionCode::WriteSingleCoil, 0x040B, &["FF00"])
            .unwrap();
        assert!(checksum_ok(&writer.get_ref().0));
    }

    #[test]
    fn zero_length_write_is_closed_line() {
        let mut writer = FrameWriter::with_config(ClosedSink, fast());
        let err = writer
            .send(slave(1), FunctionCode::WriteSingleCoil, 0x0403, &["FF00"])
            .unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn send_timeout_surfaces_gate_timeout() {
        let config = FrameConfig {
            min_spacing: Duration::from_millis(500),
            send_timeout: Some(Duration::from_millis(5)),
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(Vec::new(), config);
        writer
            .send(slave(1), FunctionCode::WriteSingleCoil, 0x0403, &["FF00"])
            .unwrap();
        let err = writer
            .send(slave(2), FunctionCode::WriteSingleCoil, 0x0403, &["FF00"])
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(axisbus_transport::TransportError::GateTimeout(_))
        ));
        assert_eq!(writer.get_ref().len(), 17);
    }

    #[derive(Default)]
    struct TimedSink {
        writes: Vec<Instant>,
    }

    impl Write for TimedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes.push(Instant::now());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct TwoBytesAtATime(Vec<u8>);

    impl Write for TwoBytesAtATime {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(2);
            self.0.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
