//! ASCII command framing for the axisbus motor-control line.
//!
//! Every frame on the wire is printable text:
//! - a `:` start marker
//! - slave address, function code, register and data as uppercase hex pairs
//! - a one-byte LRC checksum as two hex digits
//! - a CR LF terminator
//!
//! Outbound frames go through [`FrameWriter`], which paces them with the
//! transport's send gate. Inbound bytes go through [`FrameReader`], which
//! reassembles delimiter-framed candidates across arbitrary read boundaries.

pub mod address;
#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod error;
pub mod function;
pub mod reader;
pub mod writer;

pub use address::{AddressError, SlaveAddress, Target};
#[cfg(feature = "async")]
pub use async_codec::AsciiCodec;
pub use codec::{
    checksum_ok, decode_frame, decode_telemetry, encode_frame, lrc, CommandFrame, Frame,
    FrameConfig, Telemetry, DELIMITER, START, TELEMETRY_FRAME_LEN,
};
pub use error::{FrameError, Result};
pub use function::FunctionCode;
pub use reader::{FrameReader, Frames, Reassembler};
pub use writer::FrameWriter;
