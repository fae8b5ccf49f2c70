//! Program driver.
//!
//! Feeds a [`Program`] through a [`Processor`] one line at a time, writes
//! the state after every cycle, and asks a [`Pacer`] whether to go on.

use std::io::{self, BufRead, Write};
use std::time::Duration;
use thiserror::Error;
use crate::config::ErrorPolicy;
use crate::cpu::{CpuError, Processor, Snapshot};
use crate::program::Program;

/// Decision returned by a pacer after each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Continue,
    Stop,
}

/// Called between cycles, after the state has been written.
pub trait Pacer {
    fn pause(&mut self, snapshot: &Snapshot) -> io::Result<Pace>;
}

/// Runs straight through without waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unattended;

impl Pacer for Unattended {
    fn pause(&mut self, _snapshot: &Snapshot) -> io::Result<Pace> {
        Ok(Pace::Continue)
    }
}

/// Sleeps for a fixed time between cycles.
#[derive(Debug, Clone, Copy)]
pub struct Delay(pub Duration);

impl Pacer for Delay {
    fn pause(&mut self, _snapshot: &Snapshot) -> io::Result<Pace> {
        std::thread::sleep(self.0);
        Ok(Pace::Continue)
    }
}

/// Prompts and waits for a line of input. End of input stops the run.
#[derive(Debug)]
pub struct EnterKey<R, W> {
    input: R,
    prompt: W,
}

/// Prompt shown while waiting for the next cycle.
pub const PROMPT: &str = "Press Enter for next cycle...";

impl<R: BufRead, W: Write> EnterKey<R, W> {
    pub fn new(input: R, prompt: W) -> Self {
        Self { input, prompt }
    }
}

impl EnterKey<io::StdinLock<'static>, io::Stdout> {
    /// Wait on the terminal.
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Pacer for EnterKey<R, W> {
    fn pause(&mut self, _snapshot: &Snapshot) -> io::Result<Pace> {
        write!(self.prompt, "{PROMPT}")?;
        self.prompt.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            writeln!(self.prompt)?;
            return Ok(Pace::Stop);
        }
        Ok(Pace::Continue)
    }
}

/// Adapts a closure into a pacer.
pub struct PaceWith<F>(pub F);

impl<F: FnMut(&Snapshot) -> Pace> Pacer for PaceWith<F> {
    fn pause(&mut self, snapshot: &Snapshot) -> io::Result<Pace> {
        Ok((self.0)(snapshot))
    }
}

/// How snapshots are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The labelled state dump.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// A line that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Line number, from 1.
    pub line: usize,
    pub text: String,
    pub error: CpuError,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines that executed successfully.
    pub executed: usize,
    /// Lines that failed under [`ErrorPolicy::Skip`].
    pub failures: Vec<StepFailure>,
    /// True if the pacer ended the run before the last line.
    pub stopped: bool,
}

/// Run a whole program.
///
/// The processor's [`ErrorPolicy`] decides whether a failing line halts the
/// run or is recorded and skipped.
pub fn run<W, P>(
    cpu: &mut Processor,
    program: &Program,
    out: &mut W,
    format: OutputFormat,
    pacer: &mut P,
) -> Result<RunSummary, RunError>
where
    W: Write,
    P: Pacer + ?Sized,
{
    let policy = cpu.config().on_error;
    let mut summary = RunSummary::default();

    for (index, text) in program.iter().enumerate() {
        let line = index + 1;
        let snapshot = match cpu.step(text) {
            Ok(snapshot) => {
                summary.executed += 1;
                snapshot
            }
            Err(error) => match policy {
                ErrorPolicy::Halt => {
                    return Err(RunError::Halted { line, text: text.to_string(), source: error });
                }
                ErrorPolicy::Skip => {
                    tracing::warn!(line, text, %error, "skipping failed instruction");
                    summary.failures.push(StepFailure { line, text: text.to_string(), error });
                    cpu.snapshot(text)
                }
            },
        };

        write_snapshot(out, &snapshot, format)?;

        if pacer.pause(&snapshot)? == Pace::Stop {
            tracing::debug!(line, "run stopped by pacer");
            summary.stopped = index + 1 < program.len();
            break;
        }
    }

    Ok(summary)
}

/// Write one snapshot in the given format.
pub fn write_snapshot<W: Write>(out: &mut W, snapshot: &Snapshot, format: OutputFormat) -> Result<(), RunError> {
    match format {
        OutputFormat::Text => writeln!(out, "{snapshot}")?,
        OutputFormat::Json => {
            let json = serde_json::to_string(snapshot).map_err(|e| RunError::Serialize(e.to_string()))?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("line {line} ({text:?}): {source}")]
    Halted {
        line: usize,
        text: String,
        #[source]
        source: CpuError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ErrorPolicy};
    use crate::cpu::Register;
    use crate::error::ErrorKind;

    fn cpu(config: Config) -> Processor {
        Processor::new(config).unwrap()
    }

    fn run_text(cpu: &mut Processor, source: &str) -> (Result<RunSummary, RunError>, String) {
        let program = Program::from_source(source);
        let mut out = Vec::new();
        let result = run(cpu, &program, &mut out, OutputFormat::Text, &mut Unattended);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_run_example_transcript() {
        let mut cpu = cpu(Config::with_bit_size(4));
        let (result, out) = run_text(&mut cpu, "mov 5\nsave R1\nadd R1\n");
        let summary = result.unwrap();
        assert_eq!(summary.executed, 3);
        assert!(summary.failures.is_empty());
        assert!(!summary.stopped);

        let expected = "\
Komanda = mov 5
A = 0101
R1 = 0000
R2 = 0000
R3 = 0000
R4 = 0000
Ins = mov 5
PC = 1
TC = 1
PS = 0
----------------------------------------
Komanda = save R1
A = 0101
R1 = 0101
R2 = 0000
R3 = 0000
R4 = 0000
Ins = save R1
PC = 2
TC = 1
PS = 0
----------------------------------------
Komanda = add R1
A = 0000
R1 = 0101
R2 = 0000
R3 = 0000
R4 = 0000
Ins = add R1
PC = 3
TC = 1
PS = 0
----------------------------------------
";
        assert_eq!(out, expected);
        assert_eq!(cpu.register(Register::R1), 5);
    }

    #[test]
    fn test_halt_policy_stops_at_failure() {
        let mut cpu = cpu(Config::with_bit_size(4));
        let (result, out) = run_text(&mut cpu, "mov 1\nsave R9\nmov 2");
        match result {
            Err(RunError::Halted { line, text, source }) => {
                assert_eq!(line, 2);
                assert_eq!(text, "save R9");
                assert_eq!(source.kind(), ErrorKind::UnknownRegister);
            }
            other => panic!("expected halt, got {other:?}"),
        }
        assert_eq!(out.matches("Komanda").count(), 1);
        assert_eq!(cpu.regs.acc, 1);
        assert_eq!(cpu.regs.pc, 2);
    }

    #[test]
    fn test_skip_policy_continues() {
        let config = Config { on_error: ErrorPolicy::Skip, ..Config::with_bit_size(4) };
        let mut cpu = cpu(config);
        let (result, out) = run_text(&mut cpu, "mov 1\nmov x\n\nmov 2");
        let summary = result.unwrap();
        assert_eq!(summary.executed, 2);
        assert_eq!(summary.failures.len(), 2);
        assert_eq!(summary.failures[0].line, 2);
        assert_eq!(summary.failures[0].error.kind(), ErrorKind::InvalidOperand);
        assert_eq!(summary.failures[1].error.kind(), ErrorKind::MalformedInstruction);
        assert_eq!(cpu.regs.acc, 2);
        assert_eq!(cpu.regs.pc, 4);
        // Failed lines still show their state, with TC left at 0.
        assert!(out.contains("Komanda = mov x\nA = 0001"));
        assert_eq!(out.matches("TC = 0").count(), 2);
    }

    #[test]
    fn test_enter_key_pacer() {
        let mut cpu = cpu(Config::with_bit_size(4));
        let program = Program::from_source("mov 1\nmov 2\nmov 3");
        let mut prompt = Vec::new();
        let mut pacer = EnterKey::new(&b"\n"[..], &mut prompt);
        let mut out = Vec::new();

        let summary = run(&mut cpu, &program, &mut out, OutputFormat::Text, &mut pacer).unwrap();
        // One Enter, then end of input.
        assert_eq!(summary.executed, 2);
        assert!(summary.stopped);
        assert_eq!(cpu.regs.acc, 2);
        assert_eq!(String::from_utf8(prompt).unwrap(), format!("{PROMPT}{PROMPT}\n"));
    }

    #[test]
    fn test_closure_pacer_sees_snapshots() {
        let mut cpu = cpu(Config::with_bit_size(8));
        let program = Program::from_source("mov 3\nadd 1\nadd 1");
        let mut seen = Vec::new();
        let mut pacer = PaceWith(|snap: &Snapshot| {
            seen.push((snap.pc, snap.accumulator));
            Pace::Continue
        });
        let summary = run(&mut cpu, &program, &mut io::sink(), OutputFormat::Text, &mut pacer).unwrap();
        assert_eq!(summary.executed, 3);
        assert_eq!(seen, vec![(1, 3), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_stop_on_last_line_is_not_early() {
        let mut cpu = cpu(Config::default());
        let program = Program::from_source("mov 1");
        let mut pacer = PaceWith(|_: &Snapshot| Pace::Stop);
        let summary = run(&mut cpu, &program, &mut io::sink(), OutputFormat::Text, &mut pacer).unwrap();
        assert!(!summary.stopped);
    }

    #[test]
    fn test_json_output() {
        let mut cpu = cpu(Config::with_bit_size(4));
        let program = Program::from_source("mov -2\nsave R4");
        let mut out = Vec::new();
        run(&mut cpu, &program, &mut out, OutputFormat::Json, &mut Unattended).unwrap();

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<Snapshot> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].accumulator, -2);
        assert_eq!(lines[1].register(Register::R4), -2);
        assert_eq!(lines[1].instruction, "save R4");
    }

    #[test]
    fn test_empty_program() {
        let mut cpu = cpu(Config::default());
        let (result, out) = run_text(&mut cpu, "");
        assert_eq!(result.unwrap(), RunSummary::default());
        assert!(out.is_empty());
    }
}
