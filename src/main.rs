//! Accumulator Machine Simulator - CLI Entry Point
//!
//! Commands:
//! - `acc-sim run <program>` - Execute a program, showing state after each cycle
//! - `acc-sim debug <program>` - Interactive stepper
//! - `acc-sim check <program>` - Decode a program without running it
//! - `acc-sim encode <value>` / `acc-sim decode <bits>` - Word codec

use std::path::{Path, PathBuf};
use std::time::Duration;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use accsim::{Config, ErrorPolicy, Processor, Program, UnknownOpcodePolicy};

#[derive(Parser)]
#[command(name = "acc-sim")]
#[command(version)]
#[command(about = "A cycle-by-cycle simulator of a single-accumulator processor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Machine settings shared by `run` and `debug`.
#[derive(clap::Args)]
struct MachineArgs {
    /// Word width in bits (default: 30)
    #[arg(short, long)]
    bits: Option<u32>,
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// What to do when an instruction fails
    #[arg(long, value_enum)]
    on_error: Option<ErrorPolicy>,
    /// Reject unknown opcodes instead of ignoring them
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program, printing the machine state after every instruction
    Run {
        /// Path to the program file
        program: PathBuf,
        #[command(flatten)]
        machine: MachineArgs,
        /// Do not wait for Enter between cycles
        #[arg(long)]
        batch: bool,
        /// Sleep between cycles instead of waiting for Enter
        #[arg(long, value_name = "MS", conflicts_with = "batch")]
        delay_ms: Option<u64>,
        /// Print one JSON object per cycle
        #[arg(long)]
        json: bool,
    },
    /// Step through a program in a terminal UI
    Debug {
        /// Path to the program file
        program: PathBuf,
        #[command(flatten)]
        machine: MachineArgs,
    },
    /// Decode a program and list it without executing
    Check {
        /// Path to the program file
        program: PathBuf,
    },
    /// Encode an integer as a two's-complement bit string
    Encode {
        #[arg(allow_hyphen_values = true)]
        value: i64,
        /// Word width in bits
        #[arg(short, long, default_value = "30")]
        bits: u32,
    },
    /// Decode a two's-complement bit string
    Decode {
        /// Bits, most significant first, optionally prefixed with 0b
        bits: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { program, machine, batch, delay_ms, json }) => {
            init_tracing("warn");
            run_program(&program, &machine, batch, delay_ms, json);
        }
        Some(Commands::Debug { program, machine }) => {
            // Log output would tear the terminal UI.
            init_tracing("off");
            debug_program(&program, &machine);
        }
        Some(Commands::Check { program }) => {
            init_tracing("warn");
            check_program(&program);
        }
        Some(Commands::Encode { value, bits }) => match accsim::encode(value, bits) {
            Ok(encoded) => println!("{encoded}"),
            Err(e) => fail(&format!("Cannot encode: {e}")),
        },
        Some(Commands::Decode { bits }) => match accsim::Word::parse(&bits) {
            Ok(word) => println!("{}", word.value()),
            Err(e) => fail(&format!("Cannot decode: {e}")),
        },
        None => {
            println!("Accumulator Machine Simulator v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: &str) -> ! {
    eprintln!("❌ {message}");
    std::process::exit(1);
}

/// Build the processor: defaults, then the config file, then flags.
fn build_processor(machine: &MachineArgs) -> Processor {
    let mut config = match &machine.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| fail(&e.to_string())),
        None => Config::default(),
    };
    if let Some(bits) = machine.bits {
        config.bit_size = bits;
    }
    if let Some(policy) = machine.on_error {
        config.on_error = policy;
    }
    if machine.strict {
        config.unknown_opcodes = UnknownOpcodePolicy::Reject;
    }

    Processor::new(config).unwrap_or_else(|e| fail(&e.to_string()))
}

fn load(path: &Path) -> Program {
    let program = accsim::load_program(path).unwrap_or_else(|e| fail(&format!("Failed to load program: {e}")));
    if program.is_empty() {
        fail("No instructions to execute");
    }
    program
}

fn run_program(path: &Path, machine: &MachineArgs, batch: bool, delay_ms: Option<u64>, json: bool) {
    use accsim::runner::{self, Delay, EnterKey, OutputFormat, Pacer, Unattended};

    let program = load(path);
    let mut cpu = build_processor(machine);

    let format = if json { OutputFormat::Json } else { OutputFormat::Text };
    let mut pacer: Box<dyn Pacer> = match (batch || json, delay_ms) {
        (_, Some(ms)) => Box::new(Delay(Duration::from_millis(ms))),
        (true, None) => Box::new(Unattended),
        (false, None) => Box::new(EnterKey::stdin()),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match runner::run(&mut cpu, &program, &mut out, format, pacer.as_mut()) {
        Ok(summary) => {
            if !summary.failures.is_empty() {
                eprintln!("⚠️  {} of {} instructions failed", summary.failures.len(), program.len());
                for failure in &summary.failures {
                    eprintln!("   line {}: {}", failure.line, failure.error);
                }
                std::process::exit(1);
            }
        }
        Err(e) => fail(&format!("Run failed: {e}")),
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &Path, machine: &MachineArgs) {
    let program = load(path);
    let cpu = build_processor(machine);

    if let Err(e) = accsim::run_debugger(cpu, program) {
        fail(&format!("Debugger error: {e}"));
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &Path, _machine: &MachineArgs) {
    fail("This build has no terminal UI (enable the `tui` feature)");
}

fn check_program(path: &Path) {
    let program = load(path);
    print!("{}", program.listing());

    let errors = program.check().into_iter().filter(|(_, r)| r.is_err()).count();
    if errors > 0 {
        fail(&format!("{errors} of {} lines failed to decode", program.len()));
    }
    println!("✓ {} lines OK", program.len());
}
