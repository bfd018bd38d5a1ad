use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, CommandFrame, Frame};
use crate::error::FrameError;

/// `tokio_util` codec for the ASCII line protocol.
///
/// Decoding follows the same rules as [`Reassembler`](crate::Reassembler):
/// CR LF delimits frames, candidates without the start marker are skipped.
/// Sending pace is not enforced here; callers on the async path must space
/// frames themselves.
#[derive(Debug, Clone, Default)]
pub struct AsciiCodec {
    max_buffered: Option<usize>,
}

impl AsciiCodec {
    pub fn new(max_buffered: Option<usize>) -> Self {
        Self { max_buffered }
    }
}

impl Decoder for AsciiCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        if let Some(frame) = decode_frame(src) {
            return Ok(Some(frame));
        }
        if let Some(max) = self.max_buffered {
            if src.len() > max {
                let size = src.len();
                src.clear();
                return Err(FrameError::BufferOverflow { size, max });
            }
        }
        Ok(None)
    }
}

impl Encoder<CommandFrame> for AsciiCodec {
    type Error = FrameError;

    fn encode(&mut self, item: CommandFrame, dst: &mut BytesMut) -> Result<(), FrameError> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}

impl Encoder<&CommandFrame> for AsciiCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &CommandFrame, dst: &mut BytesMut) -> Result<(), FrameError> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}
