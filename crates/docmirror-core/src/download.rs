//! Bounded-concurrency download of Markdown documents.
//!
//! Every entry is submitted at once and gated by a counting semaphore, so at
//! most `concurrency` requests are in flight regardless of how many entries a
//! site has. [`Downloader::download_all`] returns only after every entry has
//! reached a terminal outcome.
//!
//! Within one entry the steps are strictly sequential: acquire a permit,
//! request, buffer the body, release the permit, write the file. The write
//! goes to a temporary sibling first and is renamed into place, so a
//! destination file is either the previous version or the complete new body.

use crate::extract::DocEntry;
use crate::fetcher::Transport;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Why a single document was not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The server answered 404: the page has no Markdown variant.
    NotFound,
    /// Any other non-success status.
    Status(u16),
    /// The request exceeded its timeout.
    Timeout,
    /// Connection, TLS or body-read failure.
    Network(String),
    /// The entry path would leave the output directory.
    InvalidPath,
    /// The body was received but could not be written locally.
    Io(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found (HTTP 404)"),
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::InvalidPath => write!(f, "path escapes the output directory"),
            Self::Io(msg) => write!(f, "write failed: {msg}"),
        }
    }
}

/// A document that reached a failed terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// Relative document path of the entry.
    pub path: String,
    /// What went wrong.
    pub reason: FailureReason,
}

/// Outcome of downloading one site's entries.
///
/// `written.len() + failed.len()` always equals the number of submitted
/// entries. Neither list has a guaranteed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Relative paths of documents written to disk.
    pub written: Vec<String>,
    /// Documents that were not written, with their reasons.
    pub failed: Vec<DocumentFailure>,
}

impl DownloadReport {
    /// Failed paths without reasons, the view printed in summaries.
    #[must_use]
    pub fn failed_paths(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.path.as_str()).collect()
    }
}

/// Progress callback type for reporting download progress.
///
/// Called with (completed, total) after each entry finishes.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Downloads entries through a [`Transport`] with a hard concurrency cap.
pub struct Downloader<'a, T: Transport + ?Sized> {
    transport: &'a T,
    concurrency: usize,
    progress_callback: Option<ProgressCallback>,
}

impl<'a, T: Transport + ?Sized> Downloader<'a, T> {
    /// Create a downloader admitting at most `concurrency` requests at once
    /// (clamped to `1..=Semaphore::MAX_PERMITS`).
    #[must_use]
    pub fn new(transport: &'a T, concurrency: usize) -> Self {
        Self {
            transport,
            concurrency: concurrency.clamp(1, Semaphore::MAX_PERMITS),
            progress_callback: None,
        }
    }

    /// Set progress callback.
    ///
    /// The callback receives `(completed, total)` after each entry.
    #[must_use]
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Download every entry into `output_dir` and aggregate the outcomes.
    pub async fn download_all(&self, entries: &[DocEntry], output_dir: &Path) -> DownloadReport {
        if entries.is_empty() {
            return DownloadReport::default();
        }

        let total = entries.len();
        let completed = AtomicUsize::new(0);
        let semaphore = Semaphore::new(self.concurrency);

        let outcomes = futures::future::join_all(entries.iter().map(|entry| {
            let semaphore = &semaphore;
            let completed = &completed;
            async move {
                let outcome = self.download_one(semaphore, entry, output_dir).await;

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(cb) = &self.progress_callback {
                    cb(done, total);
                }
                outcome
            }
        }))
        .await;

        let mut report = DownloadReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(path) => report.written.push(path),
                Err(failure) => report.failed.push(failure),
            }
        }
        report
    }

    async fn download_one(
        &self,
        semaphore: &Semaphore,
        entry: &DocEntry,
        output_dir: &Path,
    ) -> Result<String, DocumentFailure> {
        let fail = |reason: FailureReason| {
            warn!(path = %entry.path, %reason, "document download failed");
            DocumentFailure {
                path: entry.path.clone(),
                reason,
            }
        };

        let Some(destination) = entry.destination(output_dir) else {
            return Err(fail(FailureReason::InvalidPath));
        };

        let body = {
            // The semaphore is never closed, so acquire only fails if that changes.
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|e| fail(FailureReason::Io(e.to_string())))?;
            let url = entry.markdown_url();
            debug!(%url, "fetching document");
            self.transport.fetch_document(&url).await.map_err(fail)?
        };

        write_atomically(&destination, &body).map_err(|e| fail(FailureReason::Io(e.to_string())))?;
        debug!(path = %entry.path, bytes = body.len(), "wrote document");
        Ok(entry.path.clone())
    }
}

/// Write `body` to `destination`, creating parent directories as needed.
///
/// The bytes land in a `.tmp` sibling first and are renamed over the
/// destination, replacing any previous version.
pub fn write_atomically(destination: &Path, body: &[u8]) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = tmp_sibling(destination);
    fs::write(&tmp_path, body)?;

    // Windows refuses to rename over an existing file.
    #[cfg(windows)]
    if destination.exists() {
        fs::remove_file(destination)?;
    }

    if let Err(err) = fs::rename(&tmp_path, destination) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}

fn tmp_sibling(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    destination.with_file_name(name)
}
