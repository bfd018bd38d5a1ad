use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::warn;

use crate::codec::{decode_frame, Frame, FrameConfig, DELIMITER};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 1024;

/// Accumulates raw line bytes and hands out complete frames.
///
/// Bytes without a trailing delimiter stay buffered until a later chunk
/// completes them.
#[derive(Debug, Default)]
pub struct Reassembler {
    buf: BytesMut,
    max_buffered: Option<usize>,
}

impl Reassembler {
    pub fn new(max_buffered: Option<usize>) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            max_buffered,
        }
    }

    /// Append a chunk of received bytes.
    ///
    /// With a `max_buffered` limit, an undelimited tail longer than the limit
    /// is dropped and reported as [`FrameError::BufferOverflow`]. Complete
    /// frames ahead of it are kept.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(chunk);

        let Some(max) = self.max_buffered else {
            return Ok(());
        };
        let tail_start = self
            .buf
            .windows(DELIMITER.len())
            .rposition(|w| w == DELIMITER)
            .map_or(0, |pos| pos + DELIMITER.len());
        let tail = self.buf.len() - tail_start;
        if tail > max {
            self.buf.truncate(tail_start);
            warn!(size = tail, max, "dropping undelimited receive bytes");
            return Err(FrameError::BufferOverflow { size: tail, max });
        }
        Ok(())
    }

    /// Drain complete frames currently buffered.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { buf: &mut self.buf }
    }

    /// Append a chunk and drain the frames it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Frames<'_>> {
        self.push(chunk)?;
        Ok(self.frames())
    }

    /// Bytes held back waiting for a delimiter (or not yet drained).
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}

/// Lazy iterator over buffered frames; stops at the first incomplete one.
#[derive(Debug)]
pub struct Frames<'a> {
    buf: &'a mut BytesMut,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        decode_frame(self.buf)
    }
}

/// Reads frames from any `Read` stream.
///
/// Each [`fill`](Self::fill) performs at most one read. A read that times out
/// counts as zero bytes, so a serial port with a short timeout can be polled
/// in a loop.
pub struct FrameReader<T> {
    inner: T,
    reassembler: Reassembler,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            reassembler: Reassembler::new(config.max_buffered),
            config,
        }
    }

    /// Read whatever bytes are available into the buffer.
    ///
    /// Returns the number of bytes read; `0` when nothing arrived before the
    /// stream's read timeout.
    pub fn fill(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let read = match self.inner.read(&mut chunk) {
            Ok(n) => n,
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                0
            }
            Err(err) => return Err(FrameError::Io(err)),
        };
        self.reassembler.push(&chunk[..read])?;
        Ok(read)
    }

    /// Drain complete frames buffered so far.
    pub fn frames(&mut self) -> Frames<'_> {
        self.reassembler.frames()
    }

    /// Read once, then drain complete frames.
    pub fn poll(&mut self) -> Result<Frames<'_>> {
        self.fill()?;
        Ok(self.frames())
    }

    /// Bytes waiting for a delimiter.
    pub fn buffered(&self) -> usize {
        self.reassembler.buffered()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::decode_telemetry;

    const PUSH: &[u8] = b":01030400000005F3\r\n";

    #[test]
    fn frame_split_across_two_chunks() {
        let mut r = Reassembler::default();
        for split in 1..PUSH.len() {
            let (a, b) = PUSH.split_at(split);
            assert_eq!(r.feed(a).unwrap().count(), 0, "split at {split}");
            let frames: Vec<_> = r.feed(b).unwrap().collect();
            assert_eq!(frames.len(), 1, "split at {split}");
            assert_eq!(decode_telemetry(frames[0].as_bytes()).unwrap().velocity, 5);
            assert_eq!(r.buffered(), 0);
        }
    }

    #[test]
    fn many_frames_in_one_chunk() {
        let mut r = Reassembler::default();
        let wire = PUSH.repeat(50);
        assert_eq!(r.feed(&wire).unwrap().count(), 50);
        assert_eq!(r.buffered(), 0);
    }

    #[test]
    fn trailing_partial_is_kept() {
        let mut r = Reassembler::default();
        let mut wire = PUSH.to_vec();
        wire.extend_from_slice(b":0203");
        assert_eq!(r.feed(&wire).unwrap().count(), 1);
        assert_eq!(r.buffered(), 5);
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        let mut r = Reassembler::default();
        assert_eq!(r.feed(&[]).unwrap().count(), 0);
    }

    #[test]
    fn noise_lines_are_dropped() {
        let mut r = Reassembler::default();
        let mut wire = b"\x00\xffjunk\r\n".to_vec();
        wire.extend_from_slice(PUSH);
        let frames: Vec<_> = r.feed(&wire).unwrap().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &PUSH[..PUSH.len() - 2]);
    }

    #[test]
    fn delimiter_split_between_chunks() {
        let mut r = Reassembler::default();
        assert_eq!(r.feed(b":0103040000000AF3\r").unwrap().count(), 0);
        assert_eq!(r.feed(b"\n").unwrap().count(), 1);
    }

    #[test]
    fn unbounded_by_default() {
        let mut r = Reassembler::default();
        r.feed(&vec![b'A'; 64 * 1024]).unwrap();
        assert_eq!(r.buffered(), 64 * 1024);
    }

    #[test]
    fn overflow_drops_tail_but_keeps_frames() {
        let mut r = Reassembler::new(Some(32));
        let mut wire = PUSH.to_vec();
        wire.extend_from_slice(&[b'x'; 40]);

        let err = r.feed(&wire).unwrap_err();
        assert!(matches!(err, FrameError::BufferOverflow { size: 40, max: 32 }));
        assert_eq!(r.frames().count(), 1);
        assert_eq!(r.buffered(), 0);
    }

    #[test]
    fn overflow_limit_applies_to_tail_only() {
        let mut r = Reassembler::new(Some(20));
        let wire = PUSH.repeat(4);
        assert_eq!(r.feed(&wire).unwrap().count(), 4);
    }

    #[test]
    fn reader_polls_cursor() {
        let mut wire = PUSH.to_vec();
        wire.extend_from_slice(PUSH);
        let mut reader = FrameReader::new(Cursor::new(wire));
        assert_eq!(reader.poll().unwrap().count(), 2);
        assert_eq!(reader.fill().unwrap(), 0);
    }

    #[test]
    fn reader_handles_byte_by_byte_stream() {
        let mut reader = FrameReader::new(ByteByByteReader {
            bytes: PUSH.to_vec(),
            pos: 0,
        });
        let mut seen = 0;
        for _ in 0..PUSH.len() {
            seen += reader.poll().unwrap().count();
        }
        assert_eq!(seen, 1);
    }

    #[test]
    fn read_timeout_counts_as_empty() {
        let mut reader = FrameReader::new(ErrThenData {
            kind: ErrorKind::TimedOut,
            failed: false,
            bytes: PUSH.to_vec(),
        });
        assert_eq!(reader.fill().unwrap(), 0);
        assert_eq!(reader.poll().unwrap().count(), 1);
    }

    #[test]
    fn hard_read_error_propagates() {
        let mut reader = FrameReader::new(ErrThenData {
            kind: ErrorKind::BrokenPipe,
            failed: false,
            bytes: Vec::new(),
        });
        let err = reader.fill().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        assert!(reader.config().max_buffered.is_none());
        let _inner = reader.into_inner();
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct ErrThenData {
        kind: ErrorKind,
        failed: bool,
        bytes: Vec<u8>,
    }

    impl Read for ErrThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(std::io::Error::from(self.kind));
            }
            let n = self.bytes.len().min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[..n]);
            self.bytes.drain(..n);
            Ok(n)
        }
    }
}
