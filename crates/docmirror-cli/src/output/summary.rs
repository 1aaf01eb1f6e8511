//! Text rendering of per-site and run-wide summaries.

use colored::Colorize;
use docmirror_core::{RunSummary, SiteOutcome, SiteStatus};
use std::fmt::Write as _;
use std::path::Path;

/// Controls how much of a summary is rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions {
    /// Append the failure reason to each failed path.
    pub show_reasons: bool,
    /// Only render failures.
    pub quiet: bool,
}

/// Render one site's outcome. Returns an empty string when there is nothing
/// to show (a clean site in quiet mode).
#[must_use]
pub fn render_site(outcome: &SiteOutcome, options: SummaryOptions) -> String {
    let mut out = String::new();

    match &outcome.status {
        SiteStatus::Aborted(err) => {
            let hint = if err.is_recoverable() {
                " (temporary, a later run may succeed)"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "{} {}",
                format!("{}:", outcome.name).bold(),
                format!("sync aborted: {err}{hint}").red()
            );
        },
        SiteStatus::Completed(report) => {
            if options.quiet && report.failed.is_empty() {
                return out;
            }

            let _ = writeln!(out, "{}", outcome.name.bold());
            if !options.quiet {
                let failed = report.failed.len().to_string();
                let _ = writeln!(
                    out,
                    "Downloaded {} docs to {}, {} failed",
                    report.written.len().to_string().green(),
                    display_dir(&outcome.output_dir),
                    if report.failed.is_empty() {
                        failed.normal()
                    } else {
                        failed.yellow()
                    }
                );
            }

            if !report.failed.is_empty() {
                let _ = writeln!(
                    out,
                    "{}",
                    format!(
                        "Failed to download the following {} paths:",
                        report.failed.len()
                    )
                    .yellow()
                );
                if options.show_reasons {
                    let mut failed: Vec<_> = report.failed.iter().collect();
                    failed.sort_by(|a, b| a.path.cmp(&b.path));
                    for failure in failed {
                        let _ = writeln!(out, " - {} ({})", failure.path, failure.reason);
                    }
                } else {
                    let mut paths = report.failed_paths();
                    paths.sort_unstable();
                    for path in paths {
                        let _ = writeln!(out, " - {path}");
                    }
                }
            }
        },
    }

    out
}

/// Render the grand total line for a run.
#[must_use]
pub fn render_totals(summary: &RunSummary) -> String {
    if summary.all_sites_aborted() {
        return format!("Nothing mirrored: all {} sites aborted", summary.sites.len())
            .red()
            .to_string();
    }

    let aborted = summary.aborted_sites().len();
    let mut line = format!(
        "Total: {} downloaded, {} failed",
        summary.total_written(),
        summary.total_failed()
    );
    if aborted > 0 {
        let _ = write!(
            line,
            ", {aborted} of {} sites aborted",
            summary.sites.len()
        );
    }
    if summary.has_failures() {
        line.yellow().to_string()
    } else {
        line.green().to_string()
    }
}

fn display_dir(dir: &Path) -> String {
    std::path::absolute(dir)
        .unwrap_or_else(|_| dir.to_path_buf())
        .display()
        .to_string()
}
