//! # Accumulator Machine Simulator
//!
//! A cycle-by-cycle simulator of a small educational processor with one
//! accumulator, four general registers, and a sign flag.
//!
//! Programs are text, one instruction per line. After every instruction the
//! full machine state is available as a [`Snapshot`], with values rendered
//! as fixed-width two's-complement bit strings. Addition and subtraction
//! are both bitwise addition modulo 2 (XOR).

pub mod binary;
pub mod config;
pub mod cpu;
pub mod error;
pub mod program;
pub mod runner;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export commonly used types
pub use binary::{decode, encode, encode_wrapping, CodecError, Word};
pub use config::{Config, ConfigError, ErrorPolicy, UnknownOpcodePolicy};
pub use cpu::{CpuError, DecodeError, Instruction, Operand, Processor, Register, Registers, Snapshot};
pub use error::ErrorKind;
pub use program::{load_program, Program, ProgramError};
pub use runner::{run, OutputFormat, Pace, Pacer, RunError, RunSummary};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
