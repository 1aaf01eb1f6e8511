//! docmirror CLI - back up documentation sites as local Markdown files
//!
//! The binary in `main.rs` only forwards to [`run`]; everything else lives
//! here so the command logic can be unit tested.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

mod cli;
mod commands;
pub mod error;
mod output;
mod utils;

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::initialize_logging;

/// Execute the docmirror CLI with the current process arguments.
///
/// Errors are printed to stderr and mapped to their semantic exit code.
pub async fn run() -> ExitCode {
    // Convert Broken pipe panics into a clean exit
    std::panic::set_hook(Box::new(|info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe") || msg.contains("broken pipe") {
            std::process::exit(0);
        }
        eprintln!("{msg}");
    }));

    let cli = Cli::parse();

    if let Err(err) = initialize_logging(&cli) {
        return report(&CliError::internal(err));
    }

    match commands::execute(&cli).await {
        Ok(code) => code,
        Err(err) => report(&err),
    }
}

fn report(err: &CliError) -> ExitCode {
    eprintln!("{} {err}", "error:".red().bold());
    err.exit_code()
}
