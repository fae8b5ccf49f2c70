//! Error classification shared by every layer of the simulator.

use std::fmt;
use serde::{Serialize, Deserialize};

/// The kind of failure behind an error.
///
/// Each module has its own error enum; `kind()` on those maps them onto
/// this flat classification so a driver can decide what to do without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// An operand that is neither a known register nor a valid integer.
    InvalidOperand,
    /// A `save` target that is not one of R1..R4.
    UnknownRegister,
    /// A bit string that cannot be decoded.
    InvalidEncoding,
    /// A line with a missing opcode, a missing operand, or extra operands.
    MalformedInstruction,
    /// An opcode the machine does not know (strict mode only).
    UnknownOpcode,
    /// A value that does not fit the requested word width.
    Overflow,
    /// A word width outside 1..=64.
    InvalidWidth,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidOperand => "invalid operand",
            ErrorKind::UnknownRegister => "unknown register",
            ErrorKind::InvalidEncoding => "invalid encoding",
            ErrorKind::MalformedInstruction => "malformed instruction",
            ErrorKind::UnknownOpcode => "unknown opcode",
            ErrorKind::Overflow => "overflow",
            ErrorKind::InvalidWidth => "invalid width",
        };
        f.write_str(name)
    }
}
