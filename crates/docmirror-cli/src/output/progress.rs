//! Progress display for a running mirror.

use std::io::Write;
use std::sync::Mutex;

use docmirror_core::{MirrorObserver, SiteConfig, SiteOutcome};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::summary::{SummaryOptions, render_site};

/// Observer that draws one progress bar per site on stderr and prints each
/// site's summary to stdout as soon as the site finishes.
pub struct ProgressObserver {
    bar: Mutex<Option<ProgressBar>>,
    options: SummaryOptions,
}

impl ProgressObserver {
    /// Create an observer. Bars are hidden in quiet mode.
    #[must_use]
    pub const fn new(options: SummaryOptions) -> Self {
        Self {
            bar: Mutex::new(None),
            options,
        }
    }

    fn bar_for(site: &SiteConfig, documents: usize) -> ProgressBar {
        let pb = ProgressBar::with_draw_target(
            Some(documents as u64),
            ProgressDrawTarget::stderr(),
        );
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} docs ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(site.name.clone());
        pb
    }
}

impl MirrorObserver for ProgressObserver {
    fn site_started(&self, site: &SiteConfig, documents: usize) {
        if self.options.quiet {
            return;
        }
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(Self::bar_for(site, documents));
        }
    }

    fn document_finished(&self, completed: usize, _total: usize) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(pb) = slot.as_ref() {
                pb.set_position(completed as u64);
            }
        }
    }

    fn site_finished(&self, outcome: &SiteOutcome) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }

        let text = render_site(outcome, self.options);
        if !text.is_empty() {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        }
    }
}
