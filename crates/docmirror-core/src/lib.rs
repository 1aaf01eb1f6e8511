//! # docmirror-core
//!
//! Core functionality for docmirror: mirroring a documentation website to
//! local Markdown files.
//!
//! ## Architecture
//!
//! Data flows through the modules in one direction, once per configured site:
//!
//! - **Sitemap**: fetch the site's `sitemap.xml` and parse its `<loc>` entries
//! - **Extract**: keep URLs under the site's prefixes and derive relative paths
//! - **Augment**: add hidden paths the sitemap does not list, dedupe by path
//! - **Download**: fetch `<url>.md` for every entry under a concurrency cap and
//!   write it to `<root>/<site dir>/<path>.md`
//! - **Mirror**: run the steps above for each site and collect a summary
//!
//! ## Quick Start
//!
//! ```no_run
//! use docmirror_core::{Fetcher, MirrorConfig, NoopObserver, SiteMirror};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> docmirror_core::Result<()> {
//! let config = MirrorConfig::default();
//! let fetcher = Fetcher::new(&config)?;
//! let summary = SiteMirror::new(&fetcher, &config)
//!     .run(Path::new("docs"), Arc::new(NoopObserver))
//!     .await;
//! println!("{} written, {} failed", summary.total_written(), summary.total_failed());
//! # Ok(())
//! # }
//! ```

/// Merging hidden paths into extracted entries
pub mod augment;
/// Site and run configuration
pub mod config;
/// Bounded-concurrency document downloads
pub mod download;
/// Error types and result aliases
pub mod error;
/// Sitemap entry extraction and path derivation
pub mod extract;
/// HTTP transport
pub mod fetcher;
/// Per-site orchestration
pub mod mirror;
/// Sitemap retrieval and parsing
pub mod sitemap;

// Re-export commonly used types
pub use augment::augment_entries;
pub use config::{
    DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, MAX_CONCURRENCY, MirrorConfig,
    SiteConfig,
};
pub use download::{
    DocumentFailure, DownloadReport, Downloader, FailureReason, ProgressCallback,
    write_atomically,
};
pub use error::{Error, Result};
pub use extract::{DocEntry, extract_entries, match_prefix};
pub use fetcher::{Fetcher, Transport};
pub use mirror::{
    MirrorObserver, NoopObserver, RunSummary, SiteMirror, SiteOutcome, SiteStatus,
};
pub use sitemap::{SITEMAP_NAMESPACE, fetch_sitemap, parse_sitemap};
