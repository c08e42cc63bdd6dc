//! Command-line surface: a declarative, clap-derived parser rather than
//! hand-rolled `env::args()` matching.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "weft", about = "A bytecode interpreter for a small s-expression language")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the interactive REPL. The default when no subcommand is given.
    Repl,
    /// Run a source file to completion and exit.
    Run {
        path: PathBuf,
        /// Turn on the VM's trace flag before evaluation begins.
        #[arg(long)]
        trace: bool,
    },
}
