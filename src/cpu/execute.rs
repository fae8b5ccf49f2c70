//! Execution engine.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.
//! One call to [`Processor::step`] is one complete instruction: PC and TC
//! move first, then the line is decoded and applied.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::config::{Config, ConfigError, UnknownOpcodePolicy};
use crate::cpu::decode::{self, DecodeError, Instruction, Operand};
use crate::cpu::registers::{Register, Registers};
use crate::cpu::snapshot::Snapshot;
use crate::error::ErrorKind;

/// Addition modulo 2 per bit.
///
/// Both `add` and `sub` use this; there is no carry chain in this machine.
#[inline]
pub fn bitwise_add(a: i64, b: i64) -> i64 {
    a ^ b
}

/// The accumulator processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Processor {
    /// Processor registers.
    pub regs: Registers,
    config: Config,
    /// Last successfully executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Processor {
    /// Create a processor with zeroed state.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            regs: Registers::new(),
            config,
            last_instr: None,
        })
    }

    /// Create a processor with default settings and the given word width.
    pub fn with_bit_size(bit_size: u32) -> Result<Self, ConfigError> {
        Self::new(Config::with_bit_size(bit_size))
    }

    /// Reset to the initial zeroed state. The configuration is kept.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.last_instr = None;
    }

    /// Word width used for display.
    pub fn bit_size(&self) -> u32 {
        self.config.bit_size
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Last successfully executed instruction.
    pub fn last_instruction(&self) -> Option<&Instruction> {
        self.last_instr.as_ref()
    }

    /// Execute one program line.
    ///
    /// PC advances and TC resets before decoding, so a failing line still
    /// consumes a cycle. On failure TC stays at 0 and no other register
    /// changes.
    pub fn step(&mut self, line: &str) -> Result<Snapshot, CpuError> {
        let pc = self.regs.begin_cycle();
        let instr = decode::decode(line)?;
        self.retire(instr, pc, line)
    }

    /// Execute an already decoded instruction.
    pub fn execute(&mut self, instr: &Instruction) -> Result<Snapshot, CpuError> {
        let pc = self.regs.begin_cycle();
        let text = instr.to_string();
        self.retire(instr.clone(), pc, &text)
    }

    /// Capture the current state, labelled with `line`.
    pub fn snapshot(&self, line: &str) -> Snapshot {
        Snapshot::capture(line, self.config.bit_size, &self.regs)
    }

    fn retire(&mut self, instr: Instruction, pc: u64, line: &str) -> Result<Snapshot, CpuError> {
        self.apply(&instr)?;
        self.regs.end_cycle();
        tracing::debug!(pc, instruction = %instr, acc = self.regs.acc, sign = self.regs.sign_bit(), "executed");
        self.last_instr = Some(instr);
        Ok(self.snapshot(line))
    }

    fn apply(&mut self, instr: &Instruction) -> Result<(), CpuError> {
        match instr {
            Instruction::Mov(value) => {
                self.regs.acc = *value;
            }

            Instruction::Save(reg) => {
                let acc = self.regs.acc;
                self.regs.set(*reg, acc);
            }

            Instruction::Add(operand) | Instruction::Sub(operand) => {
                let value = self.resolve(*operand);
                self.regs.acc = bitwise_add(self.regs.acc, value);
            }

            Instruction::Unknown { opcode, .. } => match self.config.unknown_opcodes {
                UnknownOpcodePolicy::Ignore => {
                    tracing::warn!(pc = self.regs.pc, opcode = %opcode, "ignoring unknown opcode");
                }
                UnknownOpcodePolicy::Reject => {
                    return Err(CpuError::UnknownOpcode(opcode.clone()));
                }
            },
        }
        if instr.is_arithmetic() {
            self.regs.set_sign_from(self.regs.acc);
        }
        Ok(())
    }

    fn resolve(&self, operand: Operand) -> i64 {
        match operand {
            Operand::Register(reg) => self.regs.get(reg),
            Operand::Immediate(value) => value,
        }
    }

    /// Read a general register.
    pub fn register(&self, reg: Register) -> i64 {
        self.regs.get(reg)
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self {
            regs: Registers::new(),
            config: Config::default(),
            last_instr: None,
        }
    }
}

/// Errors from executing an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("unknown opcode {0:?}")]
    UnknownOpcode(String),
}

impl CpuError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CpuError::DecodeError(e) => e.kind(),
            CpuError::UnknownOpcode(_) => ErrorKind::UnknownOpcode,
        }
    }
}
