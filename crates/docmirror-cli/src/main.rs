//! docmirror CLI - back up documentation sites as local Markdown files
//!
//! This is the main entry point for the docmirror command-line interface.

use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    docmirror_cli::run().await
}
