//! Instruction decoder.
//!
//! A program line is an opcode followed by whitespace-separated operands:
//!
//! | Opcode | Operand              | Effect              |
//! |--------|----------------------|---------------------|
//! | `mov`  | integer              | A := integer        |
//! | `save` | register             | register := A       |
//! | `add`  | register or integer  | A := A XOR operand  |
//! | `sub`  | register or integer  | A := A XOR operand  |
//!
//! Anything else decodes to [`Instruction::Unknown`]; the processor decides
//! what to do with it.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::cpu::registers::Register;
use crate::error::ErrorKind;

/// Source operand of `add`/`sub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// Value of a general register at execution time
    Register(Register),
    /// Literal signed integer
    Immediate(i64),
}

impl Operand {
    /// Resolve operand text: register names win, then integer literals.
    fn parse(opcode: &'static str, token: &str) -> Result<Self, DecodeError> {
        if let Some(reg) = Register::from_name(token) {
            return Ok(Operand::Register(reg));
        }
        parse_int(opcode, token).map(Operand::Immediate)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(reg) => write!(f, "{reg}"),
            Operand::Immediate(value) => write!(f, "{value}"),
        }
    }
}

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Load an immediate: A := value
    Mov(i64),

    /// Store the accumulator: reg := A
    Save(Register),

    /// Bitwise add: A := A XOR operand
    Add(Operand),

    /// Bitwise subtract, identical to `Add`: A := A XOR operand
    Sub(Operand),

    /// Unrecognized opcode, kept verbatim
    Unknown { opcode: String, operands: Vec<String> },
}

impl Instruction {
    /// The opcode as written in programs.
    pub fn mnemonic(&self) -> &str {
        match self {
            Instruction::Mov(_) => "mov",
            Instruction::Save(_) => "save",
            Instruction::Add(_) => "add",
            Instruction::Sub(_) => "sub",
            Instruction::Unknown { opcode, .. } => opcode,
        }
    }

    /// Whether this instruction updates the sign flag.
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Instruction::Add(_) | Instruction::Sub(_))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Mov(value) => write!(f, "mov {value}"),
            Instruction::Save(reg) => write!(f, "save {reg}"),
            Instruction::Add(op) => write!(f, "add {op}"),
            Instruction::Sub(op) => write!(f, "sub {op}"),
            Instruction::Unknown { opcode, operands } => {
                write!(f, "{opcode}")?;
                for operand in operands {
                    write!(f, " {operand}")?;
                }
                Ok(())
            }
        }
    }
}

/// Decode one program line.
pub fn decode(line: &str) -> Result<Instruction, DecodeError> {
    let mut tokens = line.split_whitespace();
    let opcode = tokens.next().ok_or(DecodeError::EmptyLine)?;
    let operands: Vec<&str> = tokens.collect();

    let instruction = match opcode {
        "mov" => Instruction::Mov(parse_int("mov", single_operand("mov", &operands)?)?),
        "save" => Instruction::Save(single_operand("save", &operands)?.parse()?),
        "add" => Instruction::Add(Operand::parse("add", single_operand("add", &operands)?)?),
        "sub" => Instruction::Sub(Operand::parse("sub", single_operand("sub", &operands)?)?),
        _ => Instruction::Unknown {
            opcode: opcode.to_string(),
            operands: operands.iter().map(|s| s.to_string()).collect(),
        },
    };

    Ok(instruction)
}

fn single_operand<'a>(opcode: &'static str, operands: &[&'a str]) -> Result<&'a str, DecodeError> {
    match operands {
        [] => Err(DecodeError::MissingOperand { opcode }),
        [token] => Ok(*token),
        [_, extra, ..] => Err(DecodeError::UnexpectedOperand {
            opcode,
            token: extra.to_string(),
        }),
    }
}

fn parse_int(opcode: &'static str, token: &str) -> Result<i64, DecodeError> {
    token.parse::<i64>().map_err(|_| DecodeError::InvalidOperand {
        opcode,
        token: token.to_string(),
    })
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty instruction line")]
    EmptyLine,

    #[error("`{opcode}` requires an operand")]
    MissingOperand { opcode: &'static str },

    #[error("`{opcode}` takes one operand, found extra {token:?}")]
    UnexpectedOperand { opcode: &'static str, token: String },

    #[error("invalid operand {token:?} for `{opcode}`")]
    InvalidOperand { opcode: &'static str, token: String },

    #[error("unknown register {0:?}")]
    UnknownRegister(String),
}

impl DecodeError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::EmptyLine
            | DecodeError::MissingOperand { .. }
            | DecodeError::UnexpectedOperand { .. } => ErrorKind::MalformedInstruction,
            DecodeError::InvalidOperand { .. } => ErrorKind::InvalidOperand,
            DecodeError::UnknownRegister(_) => ErrorKind::UnknownRegister,
        }
    }
}
