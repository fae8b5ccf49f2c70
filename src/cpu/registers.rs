//! Processor registers.
//!
//! The machine has:
//! - A: the accumulator (working register for arithmetic)
//! - R1..R4: four general registers, written only by `save`
//! - PS: the sign flag, set by `add`/`sub`
//! - PC: program counter, one tick per instruction
//! - TC: cycle counter within the current instruction

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::cpu::decode::DecodeError;

/// One of the four general registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Register {
    R1,
    R2,
    R3,
    R4,
}

impl Register {
    /// All registers, in display order.
    pub const ALL: [Register; 4] = [Register::R1, Register::R2, Register::R3, Register::R4];

    /// The register name as written in programs.
    pub const fn name(self) -> &'static str {
        match self {
            Register::R1 => "R1",
            Register::R2 => "R2",
            Register::R3 => "R3",
            Register::R4 => "R4",
        }
    }

    /// Look up a register by exact (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| DecodeError::UnknownRegister(s.to_string()))
    }
}

/// The register file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// A: accumulator
    pub acc: i64,

    /// R1..R4, indexed by [`Register`]
    gp: [i64; 4],

    /// PS: sign flag, true when the last arithmetic result was negative
    pub sign: bool,

    /// PC: number of instructions fetched so far
    pub pc: u64,

    /// TC: cycle counter, 0 while an instruction is in flight, 1 once it retires
    pub tc: u64,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Read a general register.
    #[inline]
    pub fn get(&self, reg: Register) -> i64 {
        self.gp[reg.index()]
    }

    /// Write a general register.
    #[inline]
    pub fn set(&mut self, reg: Register, value: i64) {
        self.gp[reg.index()] = value;
    }

    /// General registers in R1..R4 order.
    pub fn general(&self) -> impl Iterator<Item = (Register, i64)> + '_ {
        Register::ALL.into_iter().map(move |r| (r, self.get(r)))
    }

    /// The sign flag as a bit.
    #[inline]
    pub const fn sign_bit(&self) -> u8 {
        self.sign as u8
    }

    /// Set the sign flag from a result value.
    pub fn set_sign_from(&mut self, value: i64) {
        self.sign = value < 0;
    }

    /// Start a new instruction: TC goes back to 0 and PC advances.
    /// Returns the new PC.
    pub fn begin_cycle(&mut self) -> u64 {
        self.tc = 0;
        self.pc += 1;
        self.pc
    }

    /// Retire the current instruction.
    pub fn end_cycle(&mut self) {
        self.tc += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_names() {
        for reg in Register::ALL {
            assert_eq!(reg.name().parse::<Register>().unwrap(), reg);
        }
        assert!(Register::from_name("r1").is_none());
        assert!(Register::from_name("R5").is_none());
        assert!(matches!("A".parse::<Register>(), Err(DecodeError::UnknownRegister(_))));
    }

    #[test]
    fn test_general_registers() {
        let mut regs = Registers::new();
        regs.set(Register::R3, -4);
        assert_eq!(regs.get(Register::R3), -4);

        let values: Vec<_> = regs.general().collect();
        assert_eq!(
            values,
            vec![
                (Register::R1, 0),
                (Register::R2, 0),
                (Register::R3, -4),
                (Register::R4, 0),
            ]
        );
    }

    #[test]
    fn test_sign_from_value() {
        let mut regs = Registers::new();

        regs.set_sign_from(-1);
        assert!(regs.sign);
        assert_eq!(regs.sign_bit(), 1);

        regs.set_sign_from(0);
        assert_eq!(regs.sign_bit(), 0);

        regs.set_sign_from(100);
        assert_eq!(regs.sign_bit(), 0);
    }

    #[test]
    fn test_cycle_counters() {
        let mut regs = Registers::new();
        regs.tc = 1;

        assert_eq!(regs.begin_cycle(), 1);
        assert_eq!(regs.tc, 0);
        regs.end_cycle();
        assert_eq!(regs.tc, 1);

        assert_eq!(regs.begin_cycle(), 2);
        assert_eq!(regs.tc, 0);
    }

    #[test]
    fn test_reset() {
        let mut regs = Registers::new();
        regs.acc = 9;
        regs.set(Register::R2, 9);
        regs.sign = true;
        regs.begin_cycle();
        regs.reset();
        assert_eq!(regs, Registers::new());
    }
}
