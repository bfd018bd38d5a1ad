//! Function codes and the register map of the motor controllers.
//!
//! Registers are 16-bit offsets rendered as four hex digits on the wire.
//! Coils are switched by writing [`COIL_ON`] or [`COIL_OFF`].

/// Operation selector carried in every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCode {
    /// Read holding registers (`03`).
    ReadRegisters,
    /// Write single coil (`05`).
    WriteSingleCoil,
    /// Write single holding register (`06`).
    WriteSingleRegister,
    /// Write multiple holding registers (`10`).
    WriteMultipleRegisters,
}

impl FunctionCode {
    pub fn code(self) -> u8 {
        match self {
            FunctionCode::ReadRegisters => 0x03,
            FunctionCode::WriteSingleCoil => 0x05,
            FunctionCode::WriteSingleRegister => 0x06,
            FunctionCode::WriteMultipleRegisters => 0x10,
        }
    }

    /// Wire form: two uppercase hex digits.
    pub fn as_hex(self) -> &'static str {
        match self {
            FunctionCode::ReadRegisters => "03",
            FunctionCode::WriteSingleCoil => "05",
            FunctionCode::WriteSingleRegister => "06",
            FunctionCode::WriteMultipleRegisters => "10",
        }
    }

    /// Returns a human-readable name for the function code.
    pub fn name(self) -> &'static str {
        match self {
            FunctionCode::ReadRegisters => "read-registers",
            FunctionCode::WriteSingleCoil => "write-coil",
            FunctionCode::WriteSingleRegister => "write-register",
            FunctionCode::WriteMultipleRegisters => "write-registers",
        }
    }
}

/// Servo enable coil.
pub const SERVO: u16 = 0x0403;

/// Alarm reset coil (pulsed).
pub const ALARM_RESET: u16 = 0x0407;

/// Pause coil.
pub const PAUSE: u16 = 0x040A;

/// Home return coil (pulsed).
pub const HOME: u16 = 0x040B;

/// Jog towards the positive end while set.
pub const JOG_POSITIVE: u16 = 0x0416;

/// Jog towards the negative end while set.
pub const JOG_NEGATIVE: u16 = 0x0417;

/// Current position monitor (two registers).
pub const CURRENT_POSITION: u16 = 0x9000;

/// Point table row selector for positioning moves.
pub const MOVE_TO_ROW: u16 = 0x9800;

/// First point table row; each row spans 16 registers.
pub const POINT_TABLE_BASE: u16 = 0x1000;

/// Highest row addressable in the point table.
pub const POINT_TABLE_MAX_ROW: u16 = 0x0EFF;

/// Field at offsets 3..7 of a telemetry push (read reply with four data bytes).
pub const TELEMETRY_TAG: &str = "0304";

/// Coil data to set a coil.
pub const COIL_ON: &str = "FF00";

/// Coil data to clear a coil.
pub const COIL_OFF: &str = "0000";

/// Coil data for a boolean state.
pub fn coil(on: bool) -> &'static str {
    if on {
        COIL_ON
    } else {
        COIL_OFF
    }
}

/// Starting register of a point table row, or `None` past the last row.
pub fn point_table_register(row: u16) -> Option<u16> {
    if row > POINT_TABLE_MAX_ROW {
        return None;
    }
    Some(POINT_TABLE_BASE + (row << 4))
}
