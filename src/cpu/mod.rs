//! Accumulator processor emulation.
//!
//! This module implements the complete machine:
//! - A (accumulator), four general registers R1..R4
//! - PS (sign flag), PC (program counter), TC (cycle counter)
//! - 4-instruction set: `mov`, `save`, `add`, `sub`

pub mod registers;
pub mod decode;
pub mod execute;
pub mod snapshot;

pub use registers::{Register, Registers};
pub use decode::{decode, DecodeError, Instruction, Operand};
pub use execute::{bitwise_add, CpuError, Processor};
pub use snapshot::Snapshot;
