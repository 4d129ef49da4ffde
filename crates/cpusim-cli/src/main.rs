//! Computer Simulator - CLI
//!
//! Command-line front end over a JSON computer store: create computers, move
//! their write pointer, insert instructions, execute and inspect them.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cpusim_core::{Computer, DebugSnapshot, ProgramLoader, SimConfig, SimError, SimResult};
use cpusim_store::ComputerStore;

#[derive(Parser, Debug)]
#[command(name = "cpusim")]
#[command(about = "Build and run programs on a simulated stack computer")]
struct Cli {
    /// Path to the JSON computer store
    #[arg(long, global = true, default_value = "computers.json")]
    store: PathBuf,

    /// Reject unknown or incomplete instructions instead of ignoring them
    #[arg(long, global = true)]
    strict: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Json)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a computer and print its id
    Create {
        /// Highest addressable slot [default: configured capacity]
        #[arg(long)]
        capacity: Option<u16>,
    },
    /// Move the write pointer of a computer
    Pointer { id: String, addr: usize },
    /// Insert an instruction at the write pointer
    Insert {
        id: String,
        opcode: String,
        #[arg(allow_negative_numbers = true)]
        operand: Option<i64>,
    },
    /// Execute a stored computer
    Exec { id: String },
    /// Print the state of a stored computer
    Debug { id: String },
    /// Load a program listing into a fresh computer and execute it
    Run {
        file: PathBuf,
        /// Highest addressable slot [default: configured capacity]
        #[arg(long)]
        capacity: Option<u16>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Plain,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,cpusim=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(message) = run(cli) {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = if cli.strict {
        SimConfig::new().strict()
    } else {
        SimConfig::new()
    };

    match cli.command {
        Command::Create { capacity } => {
            let mut store = open_store(&cli.store)?;
            let id = store
                .create(capacity_or_default(capacity, &config))
                .map_err(|e| e.to_string())?;
            println!("{}", id);
        }
        Command::Pointer { id, addr } => {
            let mut store = open_store(&cli.store)?;
            let (_, computer) = store
                .update(&id, |computer| computer.set_address(addr).map(|_| ()))
                .map_err(|e| e.to_string())?;
            print_debug(&computer.debug(), cli.format)?;
        }
        Command::Insert { id, opcode, operand } => {
            let mut store = open_store(&cli.store)?;
            let (_, computer) = store
                .update(&id, |computer| {
                    with_policy(computer, &config, &opcode, operand)
                })
                .map_err(|e| e.to_string())?;
            print_debug(&computer.debug(), cli.format)?;
        }
        Command::Exec { id } => {
            let mut computer = open_store(&cli.store)?
                .load(&id)
                .map_err(|e| e.to_string())?;
            let output = computer.execute().map_err(runtime_error)?;
            print_output(&output, cli.format);
        }
        Command::Debug { id } => {
            let computer = open_store(&cli.store)?
                .load(&id)
                .map_err(|e| e.to_string())?;
            print_debug(&computer.debug(), cli.format)?;
        }
        Command::Run { file, capacity } => {
            let source = fs::read_to_string(&file)
                .map_err(|e| format!("failed to read {}: {}", file.display(), e))?;
            let capacity = capacity_or_default(capacity, &config);
            let mut computer = ProgramLoader::load(&source, capacity)
                .map_err(|e| format!("invalid program {}: {}", file.display(), e))?;
            info!(file = %file.display(), "program loaded");
            let output = computer.execute().map_err(runtime_error)?;
            print_output(&output, cli.format);
        }
    }
    Ok(())
}

fn open_store(path: &Path) -> Result<ComputerStore, String> {
    ComputerStore::open(path).map_err(|e| format!("failed to open {}: {}", path.display(), e))
}

fn capacity_or_default(capacity: Option<u16>, config: &SimConfig) -> usize {
    capacity.map_or(config.default_capacity, usize::from)
}

/// Stored computers carry no policy, so apply the one chosen on the command line.
fn with_policy(
    computer: &mut Computer,
    config: &SimConfig,
    opcode: &str,
    operand: Option<i64>,
) -> SimResult<()> {
    computer.set_policy(config.opcode_policy);
    computer.insert_with_policy(opcode, operand).map(|_| ())
}

fn runtime_error(err: SimError) -> String {
    format!("unexpected error when executing the program: {}", err)
}

fn print_output(output: &[i64], format: Format) {
    match format {
        Format::Json => println!("{}", serde_json::json!({ "program_output": output })),
        Format::Plain => {
            for value in output {
                println!("{}", value);
            }
        }
    }
}

fn print_debug(snapshot: &DebugSnapshot, format: Format) -> Result<(), String> {
    match format {
        Format::Json => {
            let text = serde_json::to_string_pretty(snapshot)
                .map_err(|e| format!("failed to encode snapshot: {}", e))?;
            println!("{}", text);
        }
        Format::Plain => {
            println!("-------");
            println!("Number of addresses: {}", snapshot.program_stack_size);
            println!("Program stack:");
            for (address, (opcode, operand)) in &snapshot.program_stack {
                match operand {
                    Some(value) => println!("  {:>5}  {} {}", address, opcode, value),
                    None => println!("  {:>5}  {}", address, opcode),
                }
            }
            println!("Program stack pointer: {}", snapshot.program_stack_pointer);
            println!("Program counter: {}", snapshot.program_counter);
            println!("-------");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_accepts_negative_operand() {
        let cli = Cli::try_parse_from(["cpusim", "insert", "0000001", "push", "-3"])
            .expect("parse failed");
        match cli.command {
            Command::Insert { id, opcode, operand } => {
                assert_eq!(id, "0000001");
                assert_eq!(opcode, "push");
                assert_eq!(operand, Some(-3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["cpusim", "exec", "abc", "--format", "plain", "--strict"])
            .expect("parse failed");
        assert_eq!(cli.format, Format::Plain);
        assert!(cli.strict);
        assert_eq!(cli.store, PathBuf::from("computers.json"));
    }

    #[test]
    fn omitted_capacity_follows_config() {
        let cli = Cli::try_parse_from(["cpusim", "create"]).expect("parse failed");
        let config = SimConfig::new().with_capacity(7);
        match cli.command {
            Command::Create { capacity } => {
                assert_eq!(capacity, None);
                assert_eq!(capacity_or_default(capacity, &config), 7);
                assert_eq!(capacity_or_default(capacity, &SimConfig::new()), 100);
                assert_eq!(capacity_or_default(Some(12), &config), 12);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn debug_snapshot_prints_in_both_formats() {
        let snapshot = Computer::new(3).debug();
        assert_eq!(print_debug(&snapshot, Format::Json), Ok(()));
        assert_eq!(print_debug(&snapshot, Format::Plain), Ok(()));
    }

    #[test]
    fn run_reports_unreadable_listing() {
        let path = std::env::temp_dir().join("cpusim-missing-listing.prog");
        let cli = Cli::try_parse_from(["cpusim", "run", path.to_str().expect("utf-8 path")])
            .expect("parse failed");
        let err = run(cli).unwrap_err();
        assert!(err.starts_with("failed to read"), "{}", err);
    }

    #[test]
    fn bundled_program_prints_tenten() {
        let source = include_str!("../programs/tenten.prog");
        let mut computer = ProgramLoader::load(source, 100).expect("load failed");
        assert_eq!(computer.execute(), Ok(vec![1009, 1010]));
    }
}
