//! Program files.
//!
//! A program is plain text with one instruction per line. Each line is
//! trimmed of surrounding whitespace; nothing else is filtered, so a blank
//! line is an (empty, and therefore malformed) instruction.

use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use crate::cpu::decode::{decode, DecodeError, Instruction};

/// A loaded program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Instruction lines, trimmed.
    pub lines: Vec<String>,
}

impl Program {
    /// Create a new empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split source text into instruction lines.
    pub fn from_source(source: &str) -> Self {
        source.lines().collect()
    }

    /// Add an instruction line.
    pub fn push(&mut self, line: &str) {
        self.lines.push(line.trim().to_string());
    }

    /// Get the number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate over the lines.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Decode every line without executing anything.
    ///
    /// Returns `(line number, decode result)` pairs, numbered from 1.
    pub fn check(&self) -> Vec<(usize, Result<Instruction, DecodeError>)> {
        self.iter()
            .enumerate()
            .map(|(i, line)| (i + 1, decode(line)))
            .collect()
    }

    /// Numbered listing of the decoded program, one line per instruction.
    pub fn listing(&self) -> String {
        let mut output = String::new();
        for (line_num, result) in self.check() {
            let text = match result {
                Ok(Instruction::Unknown { .. }) => format!("{}  ; unknown opcode", self.lines[line_num - 1]),
                Ok(instr) => instr.to_string(),
                Err(e) => format!("???  ; {e}"),
            };
            output.push_str(&format!("{line_num:03}: {text}\n"));
        }
        output
    }
}

impl<'a> FromIterator<&'a str> for Program {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut program = Program::new();
        for line in iter {
            program.push(line);
        }
        program
    }
}

/// Load a program file from disk.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Program, ProgramError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| ProgramError::IoError(format!("{}: {}", path.display(), e)))?;
    let reader = BufReader::new(file);

    let mut program = Program::new();
    for line_result in reader.lines() {
        let line = line_result.map_err(|e| ProgramError::IoError(e.to_string()))?;
        program.push(&line);
    }

    tracing::debug!(path = %path.display(), lines = program.len(), "loaded program");
    Ok(program)
}

/// Errors that can occur while loading a program.
#[derive(Debug, Clone, Error)]
pub enum ProgramError {
    #[error("I/O error: {0}")]
    IoError(String),
}
