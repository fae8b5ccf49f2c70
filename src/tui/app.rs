//! Debugger application state and logic.

use std::collections::HashSet;
use crate::config::ErrorPolicy;
use crate::cpu::{Processor, Snapshot};
use crate::program::Program;

/// Execution status of one program line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Pending,
    Done,
    Failed,
}

/// Debugger application state.
pub struct DebuggerApp {
    /// The processor being stepped.
    pub cpu: Processor,
    /// The program being run.
    pub program: Program,
    /// Index of the next line to execute.
    pub next_line: usize,
    /// Per-line status, parallel to `program.lines`.
    pub lines: Vec<LineStatus>,
    /// State after the most recent cycle.
    pub last: Option<Snapshot>,
    /// Breakpoints (by line index).
    pub breakpoints: HashSet<usize>,
    /// Set when a line fails under the halt policy.
    pub halted: bool,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
}

impl DebuggerApp {
    /// Create a new debugger for a program.
    pub fn new(cpu: Processor, program: Program) -> Self {
        let lines = vec![LineStatus::Pending; program.len()];
        Self {
            cpu,
            program,
            next_line: 0,
            lines,
            last: None,
            breakpoints: HashSet::new(),
            halted: false,
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
        }
    }

    /// Whether every line has been executed.
    pub fn finished(&self) -> bool {
        self.next_line >= self.program.len()
    }

    /// Execute the next line.
    pub fn step(&mut self) {
        if self.halted {
            self.status = "Halted on error. Press 'x' to reset.".into();
            self.running = false;
            return;
        }
        if self.finished() {
            self.status = format!("End of program (PC={})", self.cpu.regs.pc);
            self.running = false;
            return;
        }

        let index = self.next_line;
        let text = self.program.lines[index].clone();
        match self.cpu.step(&text) {
            Ok(snapshot) => {
                self.lines[index] = LineStatus::Done;
                if let Some(instr) = self.cpu.last_instruction() {
                    self.status = format!("PC={}: {}", snapshot.pc, instr);
                }
                self.last = Some(snapshot);
            }
            Err(e) => {
                self.lines[index] = LineStatus::Failed;
                self.status = format!("Error on line {}: {}", index + 1, e);
                self.last = Some(self.cpu.snapshot(&text));
                if self.cpu.config().on_error == ErrorPolicy::Halt {
                    self.halted = true;
                    self.running = false;
                }
            }
        }
        self.next_line += 1;
    }

    /// Run until the end, a breakpoint, or a halting error.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
        // Leave the breakpoint we are parked on.
        self.step();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if self.finished() {
            self.running = false;
            self.status = format!("End of program (PC={})", self.cpu.regs.pc);
            return;
        }

        if self.breakpoints.contains(&self.next_line) {
            self.running = false;
            self.status = format!("Breakpoint at line {}", self.next_line + 1);
            return;
        }

        self.step();
    }

    /// Toggle a breakpoint on the next line.
    pub fn toggle_breakpoint(&mut self) {
        let line = self.next_line;
        if self.breakpoints.remove(&line) {
            self.status = format!("Removed breakpoint at line {}", line + 1);
        } else {
            self.breakpoints.insert(line);
            self.status = format!("Set breakpoint at line {}", line + 1);
        }
    }

    /// Reset the processor and rewind the program.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.next_line = 0;
        self.lines.fill(LineStatus::Pending);
        self.last = None;
        self.halted = false;
        self.running = false;
        self.status = "Reset. Ready.".into();
    }
}

/// Run the debugger on a program.
pub fn run_debugger(cpu: Processor, program: Program) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(cpu, program);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                        KeyCode::Char('s') | KeyCode::Enter => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn app(source: &str, config: Config) -> DebuggerApp {
        DebuggerApp::new(Processor::new(config).unwrap(), Program::from_source(source))
    }

    #[test]
    fn test_step_through() {
        let mut app = app("mov 5\nsave R1\nadd R1", Config::with_bit_size(4));
        app.step();
        app.step();
        assert_eq!(app.last.as_ref().unwrap().pc, 2);
        assert_eq!(app.status, "PC=2: save R1");
        app.step();
        assert!(app.finished());
        assert_eq!(app.lines, vec![LineStatus::Done; 3]);
        assert_eq!(app.cpu.regs.acc, 0);

        app.step();
        assert!(app.status.starts_with("End of program"));
        assert_eq!(app.cpu.regs.pc, 3);
    }

    #[test]
    fn test_halt_on_error() {
        let mut app = app("mov q\nmov 1", Config::with_bit_size(4));
        app.step();
        assert!(app.halted);
        assert_eq!(app.lines[0], LineStatus::Failed);
        app.step();
        assert_eq!(app.next_line, 1);
        assert_eq!(app.cpu.regs.pc, 1);

        app.reset();
        assert!(!app.halted);
        assert_eq!(app.next_line, 0);
        assert_eq!(app.cpu.regs.pc, 0);
        assert_eq!(app.lines, vec![LineStatus::Pending; 2]);
    }

    #[test]
    fn test_skip_on_error() {
        let config = Config { on_error: ErrorPolicy::Skip, ..Config::with_bit_size(4) };
        let mut app = app("mov q\nmov 1", config);
        app.run();
        while app.running {
            app.tick();
        }
        assert_eq!(app.lines, vec![LineStatus::Failed, LineStatus::Done]);
        assert_eq!(app.cpu.regs.acc, 1);
    }

    #[test]
    fn test_breakpoint_stops_run() {
        let mut app = app("mov 1\nmov 2\nmov 3", Config::with_bit_size(4));
        app.breakpoints.insert(2);
        app.run();
        while app.running {
            app.tick();
        }
        assert_eq!(app.next_line, 2);
        assert_eq!(app.cpu.regs.acc, 2);

        // Resuming moves past the breakpoint.
        app.run();
        while app.running {
            app.tick();
        }
        assert!(app.finished());
        assert_eq!(app.cpu.regs.acc, 3);
    }

    #[test]
    fn test_toggle_breakpoint() {
        let mut app = app("mov 1", Config::default());
        app.toggle_breakpoint();
        assert!(app.breakpoints.contains(&0));
        app.toggle_breakpoint();
        assert!(app.breakpoints.is_empty());
    }
}
