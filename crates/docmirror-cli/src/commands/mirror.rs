//! The mirror command: sync every configured site into the backup root.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use docmirror_core::{Fetcher, MirrorConfig, MirrorObserver, SiteMirror};
use tracing::debug;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::{ProgressObserver, SummaryOptions, render_totals};

/// Effective configuration: the `--config` file when given, otherwise the
/// built-in site list.
///
/// # Errors
///
/// Returns a usage error if the file cannot be read, parsed or validated.
pub fn load_config(cli: &Cli) -> Result<MirrorConfig, CliError> {
    let config = match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            MirrorConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))
                .map_err(CliError::usage)?
        },
        None => MirrorConfig::default(),
    };
    config.validate().map_err(CliError::usage)?;
    Ok(config)
}

/// Run the command selected by `cli`.
///
/// # Errors
///
/// Returns a usage error for bad configuration, an internal error when the
/// HTTP client cannot be built, and an incomplete error when `--strict` is
/// set and any site or document failed.
pub async fn execute(cli: &Cli) -> Result<ExitCode, CliError> {
    let config = load_config(cli)?;

    if cli.print_config {
        let rendered = config.to_toml_string().map_err(CliError::internal)?;
        print!("{rendered}");
        return Ok(ExitCode::SUCCESS);
    }

    let fetcher = Fetcher::new(&config)
        .context("building HTTP client")
        .map_err(CliError::internal)?;

    let options = SummaryOptions {
        show_reasons: cli.verbose,
        quiet: cli.quiet,
    };
    let observer: Arc<dyn MirrorObserver> = Arc::new(ProgressObserver::new(options));

    let summary = SiteMirror::new(&fetcher, &config)
        .run(&cli.output, observer)
        .await;

    if !cli.quiet || summary.has_failures() {
        println!("{}", render_totals(&summary));
    }

    if cli.strict && summary.has_failures() {
        return Err(CliError::incomplete(anyhow!(
            "{} documents failed and {} sites aborted",
            summary.total_failed(),
            summary.aborted_sites().len()
        )));
    }

    Ok(ExitCode::SUCCESS)
}
