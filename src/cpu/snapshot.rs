//! Machine state captured after each instruction.

use std::fmt;
use serde::{Serialize, Deserialize};
use crate::binary::Word;
use crate::cpu::registers::{Register, Registers};

/// Separator printed after every state dump.
pub const SEPARATOR: &str = "----------------------------------------";

/// Full processor state after one cycle.
///
/// `Display` produces the state dump, one field per line:
///
/// ```text
/// Komanda = mov 5
/// A = 0101
/// R1 = 0000
/// R2 = 0000
/// R3 = 0000
/// R4 = 0000
/// Ins = mov 5
/// PC = 1
/// TC = 1
/// PS = 0
/// ----------------------------------------
/// ```
///
/// The instruction text appears twice (`Komanda` and `Ins`) so existing
/// transcripts compare equal.
///
/// Values are kept at full `i64` precision and only their low `bit_size`
/// bits are printed. `PS` follows the sign of the full value, so at 4 bits
/// an accumulator of 15 prints as `A = 1111` with `PS = 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The program line as given to the processor.
    pub instruction: String,
    /// Display width in bits.
    pub bit_size: u32,
    pub accumulator: i64,
    /// R1..R4, in order.
    pub registers: [i64; 4],
    pub pc: u64,
    pub tc: u64,
    pub sign: u8,
}

impl Snapshot {
    /// Capture the register file.
    pub fn capture(instruction: &str, bit_size: u32, regs: &Registers) -> Self {
        let mut registers = [0; 4];
        for (slot, (_, value)) in registers.iter_mut().zip(regs.general()) {
            *slot = value;
        }
        Self {
            instruction: instruction.to_string(),
            bit_size,
            accumulator: regs.acc,
            registers,
            pc: regs.pc,
            tc: regs.tc,
            sign: regs.sign_bit(),
        }
    }

    /// Value of a general register.
    pub fn register(&self, reg: Register) -> i64 {
        self.registers[reg as usize]
    }

    /// The accumulator as a display word.
    pub fn accumulator_word(&self) -> Word {
        Word::wrapping(self.accumulator, self.bit_size)
    }

    /// A general register as a display word.
    pub fn register_word(&self, reg: Register) -> Word {
        Word::wrapping(self.register(reg), self.bit_size)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Komanda = {}", self.instruction)?;
        writeln!(f, "A = {}", self.accumulator_word())?;
        for reg in Register::ALL {
            writeln!(f, "{} = {}", reg, self.register_word(reg))?;
        }
        writeln!(f, "Ins = {}", self.instruction)?;
        writeln!(f, "PC = {}", self.pc)?;
        writeln!(f, "TC = {}", self.tc)?;
        writeln!(f, "PS = {}", self.sign)?;
        f.write_str(SEPARATOR)
    }
}
