use std::fmt::Write as _;
use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::address::SlaveAddress;
use crate::error::{FrameError, Result};
use crate::function::{FunctionCode, TELEMETRY_TAG};

/// Start marker of every frame.
pub const START: u8 = b':';

/// Frame terminator.
pub const DELIMITER: [u8; 2] = *b"\r\n";

/// Length of a telemetry push without its delimiter:
/// `:` + slave (2) + tag (4) + value (8) + checksum (2).
pub const TELEMETRY_FRAME_LEN: usize = 17;

/// Longitudinal redundancy check over a message of hex byte pairs.
///
/// The result is the two's complement of the byte sum, so that message bytes
/// plus checksum add up to zero modulo 256.
pub fn lrc(message: &str) -> Result<u8> {
    if message.len() % 2 != 0 {
        return Err(FrameError::OddLength { len: message.len() });
    }
    let mut sum = 0u8;
    for pair in message.as_bytes().chunks_exact(2) {
        sum = sum.wrapping_add(hex_byte(pair).ok_or_else(|| FrameError::InvalidHex {
            field: "message",
            value: message.to_string(),
        })?);
    }
    Ok(sum.wrapping_neg())
}

/// Whether a complete frame (start marker to checksum, delimiter optional)
/// sums to zero modulo 256.
pub fn checksum_ok(frame: &[u8]) -> bool {
    let body = frame.strip_suffix(&DELIMITER).unwrap_or(frame);
    let Some(hex) = body.strip_prefix(&[START]) else {
        return false;
    };
    if hex.is_empty() || hex.len() % 2 != 0 {
        return false;
    }
    let mut sum = 0u8;
    for pair in hex.chunks_exact(2) {
        match hex_byte(pair) {
            Some(b) => sum = sum.wrapping_add(b),
            None => return false,
        }
    }
    sum == 0
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    let hi = (pair[0] as char).to_digit(16)?;
    let lo = (pair[1] as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Encode a command into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────┬───────┬──────────┬──────────┬───────────┬─────┬───────┐
/// │ ':' │ Slave │ Function │ Register │ Data      │ LRC │ CR LF │
/// │     │ (2)   │ (2)      │ (4)      │ (2n)      │ (2) │       │
/// └─────┴───────┴──────────┴──────────┴───────────┴─────┴───────┘
/// ```
/// `data` fields are hex text already formatted by the caller and are copied
/// verbatim.
pub fn encode_frame<S: AsRef<str>>(
    slave: SlaveAddress,
    function: FunctionCode,
    register: u16,
    data: &[S],
    dst: &mut BytesMut,
) -> Result<()> {
    let data_len: usize = data.iter().map(|d| d.as_ref().len()).sum();
    let mut message = String::with_capacity(8 + data_len);
    message.push_str(slave.as_hex());
    message.push_str(function.as_hex());
    let _ = write!(message, "{register:04X}");
    for field in data {
        message.push_str(field.as_ref());
    }

    let check = lrc(&message)?;

    dst.reserve(1 + message.len() + 2 + DELIMITER.len());
    dst.put_u8(START);
    dst.put_slice(message.as_bytes());
    dst.put_slice(format!("{check:02X}").as_bytes());
    dst.put_slice(&DELIMITER);
    Ok(())
}

/// A fully encoded outbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    slave: SlaveAddress,
    bytes: Bytes,
}

impl CommandFrame {
    /// Encode a command for one slave.
    pub fn encode<S: AsRef<str>>(
        slave: SlaveAddress,
        function: FunctionCode,
        register: u16,
        data: &[S],
    ) -> Result<Self> {
        let mut buf = BytesMut::new();
        encode_frame(slave, function, register, data, &mut buf)?;
        Ok(Self {
            slave,
            bytes: buf.freeze(),
        })
    }

    pub fn slave(&self) -> SlaveAddress {
        self.slave
    }

    /// Raw ASCII bytes including start marker and delimiter.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The frame as text, delimiter included.
    pub fn as_str(&self) -> &str {
        // Built from ASCII only.
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Hex between the start marker and the checksum.
    pub fn message(&self) -> &str {
        let text = self.as_str();
        &text[1..text.len() - 4]
    }

    /// Checksum field (two hex digits).
    pub fn checksum(&self) -> &str {
        let text = self.as_str();
        &text[text.len() - 4..text.len() - 2]
    }

    /// Data fields after the register, as one hex string.
    pub fn data(&self) -> &str {
        &self.message()[8..]
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        self.bytes.len()
    }
}

/// A delimited inbound candidate that starts with the start marker.
///
/// The delimiter has been stripped. Nothing about the content is known yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub line: Bytes,
}

impl Frame {
    pub fn new(line: impl Into<Bytes>) -> Self {
        Self { line: line.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.line
    }

    /// Lossy text view for logging.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.line)
    }

    /// Decode this candidate as a telemetry push.
    pub fn telemetry(&self) -> Result<Telemetry> {
        decode_telemetry(&self.line)
    }
}

/// Split the next candidate frame off the front of a buffer.
///
/// Returns `None` once no delimiter remains; the undelimited tail stays in
/// `src`. Candidates that do not begin with the start marker are consumed and
/// skipped as line noise.
pub fn decode_frame(src: &mut BytesMut) -> Option<Frame> {
    loop {
        let pos = src.windows(DELIMITER.len()).position(|w| w == DELIMITER)?;
        let line = src.split_to(pos).freeze();
        src.advance(DELIMITER.len());

        if line.first() == Some(&START) {
            return Some(Frame { line });
        }
        trace!(len = line.len(), "discarding undelimited noise");
    }
}

/// A velocity report pushed by one slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub slave: SlaveAddress,
    pub velocity: i32,
}

/// Decode a telemetry push.
///
/// Accepts only frames of exactly [`TELEMETRY_FRAME_LEN`] characters carrying
/// [`TELEMETRY_TAG`] at offsets 3..7. The value field (offsets 7..15) is a
/// 32-bit two's complement integer. The trailing checksum is not verified.
pub fn decode_telemetry(frame: &[u8]) -> Result<Telemetry> {
    if frame.first() != Some(&START) {
        return Err(FrameError::Malformed {
            reason: "missing start marker",
        });
    }
    if frame.len() != TELEMETRY_FRAME_LEN {
        return Err(FrameError::Malformed {
            reason: "unexpected length",
        });
    }
    if &frame[3..7] != TELEMETRY_TAG.as_bytes() {
        return Err(FrameError::Malformed {
            reason: "not a telemetry push",
        });
    }

    let slave = std::str::from_utf8(&frame[1..3])
        .ok()
        .and_then(|s| s.parse::<SlaveAddress>().ok())
        .ok_or(FrameError::Malformed {
            reason: "unknown slave",
        })?;

    let value = &frame[7..TELEMETRY_FRAME_LEN - 2];
    if !value.iter().all(u8::is_ascii_hexdigit) {
        return Err(FrameError::Malformed {
            reason: "value is not hex",
        });
    }
    let raw = value
        .chunks_exact(2)
        .filter_map(hex_byte)
        .fold(0u32, |acc, b| (acc << 8) | u32::from(b));

    Ok(Telemetry {
        slave,
        velocity: raw as i32,
    })
}

/// Configuration for the frame reader and writer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Cap on buffered bytes that have not yet seen a delimiter.
    /// Default: `None` (unbounded).
    pub max_buffered: Option<usize>,
    /// Minimum spacing between transmitted frames. Default: 20 ms.
    pub min_spacing: Duration,
    /// Give up on a send if no slot frees up in time. Default: wait forever.
    pub send_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_buffered: None,
            min_spacing: axisbus_transport::SendGate::DEFAULT_MIN_SPACING,
            send_timeout: None,
        }
    }
}
