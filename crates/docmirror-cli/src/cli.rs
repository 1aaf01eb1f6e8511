//! # CLI Structure and Argument Parsing
//!
//! docmirror has a single command: mirror every configured site into the
//! backup root.
//!
//! ```bash
//! # Mirror the built-in sites into ./docs
//! docmirror
//!
//! # Mirror into another directory, failing the shell on any miss
//! docmirror --output backups/docs --strict
//!
//! # Use a custom site list
//! docmirror --config sites.toml
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Main CLI structure for the `docmirror` command
#[derive(Parser, Clone, Debug)]
#[command(name = "docmirror")]
#[command(version)]
#[command(
    about = "Back up documentation sites by fetching their Markdown representations",
    long_about = None
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Directory to store the downloaded Markdown files
    #[arg(long, value_name = "PATH", default_value = "docs")]
    pub output: PathBuf,

    /// TOML file replacing the built-in site list and settings
    #[arg(long, value_name = "PATH", env = "DOCMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Exit with a non-zero status when any site or document fails
    #[arg(long)]
    pub strict: bool,

    /// Show debug logs and the reason for each failed document
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress progress and success output (failures are still printed)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Disable colored output (also honours `NO_COLOR`)
    #[arg(long)]
    pub no_color: bool,
}
