//! Terminal stepper for the accumulator machine.
//!
//! Provides an interactive debugger with:
//! - Program listing with the next line highlighted
//! - Registers in binary at the configured width
//! - The state dump of the last cycle
//! - Step/run/breakpoint controls

mod app;
mod ui;

pub use app::{DebuggerApp, LineStatus, run_debugger};
