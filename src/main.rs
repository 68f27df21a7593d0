//! Demand paging simulator - driver binary
//!
//! Usage: pagesim [OPTIONS] <program_image> <swap_file> <script_file>
//!
//! Arguments:
//!   program_image - Existing flat byte file backing the text+data segments
//!   swap_file     - Swap area to create (truncated and prefilled)
//!   script_file   - Access script: segment sizes, then load/store/dump commands
//!
//! Options:
//!   -v, --verbose  Log fault and eviction activity to stderr
//!   -h, --help     Print help information

use std::env;
use std::process;

use log::{LevelFilter, Log, Metadata, Record};

use pagesim::dump::{dump_memory, dump_page_table, dump_swap};
use pagesim::script::{Command, Script};
use pagesim::sim::Simulation;

/// Command-line configuration
struct Config {
    image_file: String,
    swap_file: String,
    script_file: String,
    verbose: bool,
}

/// Minimal logger writing every enabled record to stderr.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if config.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        });
    }

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn print_help(program: &str) {
    eprintln!("Demand paging simulator - runs an access script against a program image");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] <program_image> <swap_file> <script_file>", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  program_image - Existing flat byte file backing the text+data segments");
    eprintln!("  swap_file     - Swap area to create (truncated and prefilled)");
    eprintln!("  script_file   - Access script; first line: <text> <data> <bss+heap+stack>,");
    eprintln!("                  then one command per line: load <addr>, store <addr> <char>,");
    eprintln!("                  memory, swap, table");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --verbose  Log fault and eviction activity to stderr");
    eprintln!("  -h, --help     Print this help message");
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];

    let mut verbose = false;
    let mut positional: Vec<&String> = Vec::new();

    for arg in &args[1..] {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help(program);
                process::exit(0);
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}\nUse --help for usage information.", arg));
            }
            _ => {
                positional.push(arg);
            }
        }
    }

    if positional.len() != 3 {
        print_help(program);
        return Err(format!("\nError: Expected 3 arguments, got {}", positional.len()));
    }

    Ok(Config {
        image_file: positional[0].clone(),
        swap_file: positional[1].clone(),
        script_file: positional[2].clone(),
        verbose,
    })
}

/// Main logic separated from main() for cleaner error handling
fn run(config: &Config) -> Result<(), String> {
    let script = Script::from_file(&config.script_file)?;

    let mut sim = Simulation::new(
        &config.image_file,
        &config.swap_file,
        script.text_size,
        script.data_size,
        script.bss_heap_stack_size,
    )
    .map_err(|e| format!("Failed to create simulation: {}", e))?;

    // Access errors are non-fatal: report and keep executing the script.
    for command in &script.commands {
        match *command {
            Command::Load { address } => match sim.load(address) {
                Ok(value) => println!("load {} = '{}'", address, value as char),
                Err(e) => eprintln!("load {} failed: {}", address, e),
            },
            Command::Store { address, value } => match sim.store(address, value) {
                Ok(()) => println!("store {} '{}'", address, value as char),
                Err(e) => eprintln!("store {} failed: {}", address, e),
            },
            Command::DumpMemory => print!("{}", dump_memory(&sim)),
            Command::DumpSwap => match dump_swap(&sim) {
                Ok(text) => print!("{}", text),
                Err(e) => eprintln!("swap dump failed: {}", e),
            },
            Command::DumpPageTable => print!("{}", dump_page_table(&sim)),
        }
    }

    Ok(())
}
