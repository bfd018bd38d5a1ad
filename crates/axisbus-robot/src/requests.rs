//! The operation catalogue, as plain data.
//!
//! Each builder returns the requests an operation transmits, in order. Nothing
//! here touches the line; [`Robot`](crate::Robot) sends exactly these.

use axisbus_frame::function::{
    coil, point_table_register, ALARM_RESET, CURRENT_POSITION, HOME, JOG_NEGATIVE, JOG_POSITIVE,
    MOVE_TO_ROW, PAUSE, POINT_TABLE_MAX_ROW, SERVO,
};
use axisbus_frame::{CommandFrame, FunctionCode, SlaveAddress, Target};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RobotError};

/// One command, addressed to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub target: Target,
    pub function: FunctionCode,
    pub register: u16,
    /// Hex data fields, concatenated on the wire.
    pub data: Vec<String>,
}

impl Request {
    pub fn new(target: Target, function: FunctionCode, register: u16) -> Self {
        Self {
            target,
            function,
            register,
            data: Vec::new(),
        }
    }

    /// Append a hex data field.
    pub fn with(mut self, field: impl Into<String>) -> Self {
        self.data.push(field.into());
        self
    }

    /// Encode one frame per addressed slave, in transmission order.
    pub fn frames(&self) -> axisbus_frame::Result<Vec<CommandFrame>> {
        self.target
            .addresses()
            .into_iter()
            .map(|slave| CommandFrame::encode(slave, self.function, self.register, &self.data))
            .collect()
    }
}

fn coil_write(target: Target, register: u16, on: bool) -> Request {
    Request::new(target, FunctionCode::WriteSingleCoil, register).with(coil(on))
}

fn pulse(register: u16) -> [Request; 2] {
    [
        coil_write(Target::All, register, true),
        coil_write(Target::All, register, false),
    ]
}

/// Enable or disable the servo on every slave.
pub fn servo(on: bool) -> Request {
    coil_write(Target::All, SERVO, on)
}

/// Pulse the alarm reset coil on every slave.
pub fn alarm_reset() -> [Request; 2] {
    pulse(ALARM_RESET)
}

/// Hold or release motion on every slave.
pub fn pause(flag: bool) -> Request {
    coil_write(Target::All, PAUSE, flag)
}

/// Pulse the home return coil on every slave.
pub fn home() -> [Request; 2] {
    pulse(HOME)
}

/// Start or stop jogging one slave.
pub fn jog(slave: SlaveAddress, positive_side: bool, move_: bool) -> Request {
    let register = if positive_side {
        JOG_POSITIVE
    } else {
        JOG_NEGATIVE
    };
    coil_write(Target::One(slave), register, move_)
}

/// Ask every slave for its position monitor; replies arrive as telemetry.
pub fn current_position() -> Request {
    Request::new(Target::All, FunctionCode::ReadRegisters, CURRENT_POSITION).with("0002")
}

/// Start a positioning move to a point table row on every slave.
pub fn move_to(row: u16) -> Request {
    Request::new(Target::All, FunctionCode::WriteSingleRegister, MOVE_TO_ROW)
        .with(format!("{row:04X}"))
}

/// Target values for one point table row, in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetPoint {
    /// Target position (mm).
    pub position: f64,
    /// Speed (mm/s).
    pub speed: f64,
    /// Acceleration (G).
    pub acc: f64,
    /// Deceleration (G).
    pub dec: f64,
}

/// Scale by 100 and truncate toward zero, as the controller stores values.
fn scaled(field: &'static str, value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(RobotError::out_of_range(field, value, "finite", "finite"));
    }
    Ok((value * 100.0) as i64)
}

fn unsigned<T: TryFrom<i64> + ToString + Copy>(
    field: &'static str,
    value: f64,
    max: T,
) -> Result<T> {
    let raw = scaled(field, value)?;
    T::try_from(raw).map_err(|_| RobotError::out_of_range(field, value, 0, max.to_string()))
}

/// Write a point table row on one slave.
///
/// The row starts at register `0x1000 + row * 16` and is written as fifteen
/// registers: position, two fixed fields, speed, four fixed fields,
/// acceleration, deceleration and three zero fields.
pub fn set_to(slave: SlaveAddress, row: u16, point: &SetPoint) -> Result<Request> {
    let register = point_table_register(row)
        .ok_or_else(|| RobotError::out_of_range("row", row, 0, POINT_TABLE_MAX_ROW))?;

    // Position wraps into 32 bits; negative targets become two's complement.
    let position = scaled("position", point.position)? as u32;
    let speed: u32 = unsigned("speed", point.speed, u32::MAX)?;
    let acc: u16 = unsigned("acc", point.acc, u16::MAX)?;
    let dec: u16 = unsigned("dec", point.dec, u16::MAX)?;

    Ok(Request::new(
        Target::One(slave),
        FunctionCode::WriteMultipleRegisters,
        register,
    )
    .with("000F")
    .with("1E")
    .with(format!("{position:08X}"))
    .with("0000")
    .with("000A")
    .with(format!("{speed:08X}"))
    .with("0000")
    .with("1770")
    .with("0000")
    .with("0FA0")
    .with(format!("{acc:04X}"))
    .with(format!("{dec:04X}"))
    .with("0000")
    .with("0000")
    .with("0000"))
}

/// Parse a point table row from caller text (decimal).
pub fn parse_row(text: &str) -> Result<u16> {
    let trimmed = text.trim();
    trimmed
        .parse::<u16>()
        .map_err(|_| RobotError::out_of_range("row", trimmed, 0, u16::MAX))
}
