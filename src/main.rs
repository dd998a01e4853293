//! txstore - An in-memory key-value store with nested transactions
//!
//! This is the main entry point for the txstore command-line interface.

use std::process::ExitCode;

use txstore::db::{run_demo, Database, DatabaseError, Repl, ReplConfig};

/// Options collected from the command line.
#[derive(Debug, Default)]
struct CliConfig {
    verbose: bool,
    demo: bool,
    echo: bool,
    execute: Vec<String>,
}

enum Parsed {
    Run(CliConfig),
    Exit(ExitCode),
}

fn parse_args(args: &[String]) -> Parsed {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-v" | "--verbose" => {
                config.verbose = true;
            }
            "-e" | "--execute" => {
                i += 1;
                if i < args.len() {
                    config.execute.push(args[i].clone());
                } else {
                    eprintln!("Missing argument for {}", args[i - 1]);
                    return Parsed::Exit(ExitCode::FAILURE);
                }
            }
            "--echo" => {
                config.echo = true;
            }
            "--demo" => {
                config.demo = true;
            }
            "-h" | "--help" => {
                print_help();
                return Parsed::Exit(ExitCode::SUCCESS);
            }
            "--version" => {
                println!("txstore v{}", env!("CARGO_PKG_VERSION"));
                return Parsed::Exit(ExitCode::SUCCESS);
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                return Parsed::Exit(ExitCode::FAILURE);
            }
        }
        i += 1;
    }

    Parsed::Run(config)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let config = match parse_args(&args) {
        Parsed::Run(config) => config,
        Parsed::Exit(code) => return code,
    };

    // Initialize logging
    let log_level = if config.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = if config.demo {
        run_demo(&mut std::io::stdout().lock()).map_err(DatabaseError::from)
    } else if !config.execute.is_empty() {
        execute_commands(&config.execute)
    } else {
        run_repl(config.echo)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("txstore - An in-memory key-value store with nested transactions");
    println!();
    println!("Usage: txstore [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -e, --execute CMD      Execute CMD and exit (repeatable, run in order)");
    println!("  --demo                 Run the sample transaction sequences and exit");
    println!("  --echo                 Echo each command read by the REPL");
    println!("  -v, --verbose          Enable debug logging (overridden by RUST_LOG)");
    println!("  -h, --help             Show this help message");
    println!("  --version              Show version");
    println!();
    println!("Examples:");
    println!("  txstore                                  Start the REPL");
    println!("  txstore -e 'SET a 1' -e 'GET a'          Run commands and exit");
    println!("  printf 'BEGIN\\nSET a 1\\n' | txstore     Run a script from stdin");
}

fn execute_commands(commands: &[String]) -> txstore::db::DatabaseResult<()> {
    let mut db = Database::new();
    for command in commands {
        let outcome = db.execute(command)?;
        let text = outcome.to_string();
        if !text.is_empty() {
            println!("{}", text);
        }
    }
    Ok(())
}

fn run_repl(echo: bool) -> txstore::db::DatabaseResult<()> {
    let config = ReplConfig::default().echo(echo);
    let mut repl = Repl::with_config(Database::new(), config);
    repl.run()
}
