mod cli;

use std::io;
use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Command};
use weft::{driver, repl};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        None | Some(Command::Repl) => run_repl(),
        Some(Command::Run { path, trace }) => run_file(&path, trace),
    }
}

fn run_repl() -> ExitCode {
    let stdin = io::stdin();
    let stdout = io::stdout();
    match repl::run(stdin.lock(), stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("i/o error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_file(path: &std::path::Path, trace: bool) -> ExitCode {
    match driver::run_file(path, trace) {
        Ok(()) => ExitCode::SUCCESS,
        Err((_, driver::DriverError::Io(e))) => {
            eprintln!("error reading {}: {e}", path.display());
            ExitCode::FAILURE
        }
        Err((source, driver::DriverError::Lang(err))) => {
            err.to_diagnostic().render(&source);
            ExitCode::FAILURE
        }
    }
}
