//! Builder: git home maintenance CLI.
//!
//! # Usage
//!
//! ```text
//! builder cleaner run  [--config <path>] [--git-home <dir>] [--namespaces-file <file>] [--poll-interval-secs <n>]
//! builder cleaner once [...] [--dry-run] [--json]
//! builder cleaner diff [...] [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::cleaner::CleanerCommand;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "builder",
    version,
    about = "Maintain tenant git repositories on a shared git home",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove repository directories whose namespace no longer exists.
    Cleaner {
        #[command(subcommand)]
        command: CleanerCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Cleaner { command } => commands::cleaner::run(command),
    }
}
