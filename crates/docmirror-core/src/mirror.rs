//! Site orchestration: sitemap, extraction, augmentation and download per site.
//!
//! Sites run one after another in declaration order. A sitemap that cannot be
//! fetched or parsed aborts that site only; the remaining sites still run and
//! the failure is reported in the [`RunSummary`].

use crate::augment::augment_entries;
use crate::config::{MirrorConfig, SiteConfig};
use crate::download::{DownloadReport, Downloader};
use crate::extract::{DocEntry, extract_entries};
use crate::fetcher::Transport;
use crate::sitemap::fetch_sitemap;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Hooks for displaying progress while a run is in flight.
///
/// Every method has an empty default so observers only implement what they
/// display.
pub trait MirrorObserver: Send + Sync {
    /// A site's entry list is resolved and its downloads are about to start.
    fn site_started(&self, _site: &SiteConfig, _documents: usize) {}

    /// One more document of the current site reached a terminal state.
    fn document_finished(&self, _completed: usize, _total: usize) {}

    /// A site finished, successfully or not.
    fn site_finished(&self, _outcome: &SiteOutcome) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MirrorObserver for NoopObserver {}

/// How a site's sync ended.
#[derive(Debug)]
pub enum SiteStatus {
    /// Downloads ran; individual documents may still have failed.
    Completed(DownloadReport),
    /// The sitemap could not be fetched or parsed; nothing was downloaded.
    Aborted(Error),
}

/// Result of syncing one site.
#[derive(Debug)]
pub struct SiteOutcome {
    /// Site name from the configuration.
    pub name: String,
    /// Directory the site's documents were written to.
    pub output_dir: PathBuf,
    /// What happened.
    pub status: SiteStatus,
}

impl SiteOutcome {
    /// Download report, if the site got that far.
    #[must_use]
    pub const fn report(&self) -> Option<&DownloadReport> {
        match &self.status {
            SiteStatus::Completed(report) => Some(report),
            SiteStatus::Aborted(_) => None,
        }
    }

    /// Whether the site was aborted before downloading.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self.status, SiteStatus::Aborted(_))
    }
}

/// Outcomes of a whole run, in site declaration order.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One outcome per configured site.
    pub sites: Vec<SiteOutcome>,
}

impl RunSummary {
    /// Documents written across all sites.
    #[must_use]
    pub fn total_written(&self) -> usize {
        self.sites
            .iter()
            .filter_map(SiteOutcome::report)
            .map(|r| r.written.len())
            .sum()
    }

    /// Documents that failed across all completed sites.
    #[must_use]
    pub fn total_failed(&self) -> usize {
        self.sites
            .iter()
            .filter_map(SiteOutcome::report)
            .map(|r| r.failed.len())
            .sum()
    }

    /// Sites whose sitemap step failed.
    #[must_use]
    pub fn aborted_sites(&self) -> Vec<&SiteOutcome> {
        self.sites.iter().filter(|s| s.is_aborted()).collect()
    }

    /// True when any site aborted or any document failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.total_failed() > 0 || self.sites.iter().any(SiteOutcome::is_aborted)
    }

    /// True when there was at least one site and every one of them aborted.
    #[must_use]
    pub fn all_sites_aborted(&self) -> bool {
        !self.sites.is_empty() && self.sites.iter().all(SiteOutcome::is_aborted)
    }
}

/// Runs the mirror pipeline for every configured site.
pub struct SiteMirror<'a, T: Transport + ?Sized> {
    transport: &'a T,
    config: &'a MirrorConfig,
}

impl<'a, T: Transport + ?Sized> SiteMirror<'a, T> {
    /// Create an orchestrator over an explicit configuration.
    #[must_use]
    pub const fn new(transport: &'a T, config: &'a MirrorConfig) -> Self {
        Self { transport, config }
    }

    /// Resolve the full entry list for a site: sitemap, prefix filter, hidden paths.
    #[instrument(skip(self, site), fields(site = %site.name))]
    pub async fn resolve_entries(&self, site: &SiteConfig) -> Result<Vec<DocEntry>> {
        let xml = fetch_sitemap(self.transport, &site.sitemap_url).await?;
        let entries = extract_entries(&xml, &site.prefixes)?;

        let Some(base) = site.primary_prefix() else {
            return Err(Error::Config(format!(
                "site '{}' has no URL prefixes",
                site.name
            )));
        };
        Ok(augment_entries(entries, &site.hidden_paths, base))
    }

    /// Sync one site into `output_root`/`site.output_dir`.
    pub async fn sync_site(
        &self,
        site: &SiteConfig,
        output_root: &Path,
        observer: &Arc<dyn MirrorObserver>,
    ) -> Result<DownloadReport> {
        let entries = self.resolve_entries(site).await?;
        let output_dir = output_root.join(&site.output_dir);

        info!(
            site = %site.name,
            documents = entries.len(),
            output = %output_dir.display(),
            "downloading documents"
        );
        observer.site_started(site, entries.len());

        let progress = Arc::clone(observer);
        let report = Downloader::new(self.transport, self.config.concurrency)
            .with_progress(move |completed, total| progress.document_finished(completed, total))
            .download_all(&entries, &output_dir)
            .await;
        Ok(report)
    }

    /// Sync every configured site in order and collect the outcomes.
    pub async fn run(&self, output_root: &Path, observer: Arc<dyn MirrorObserver>) -> RunSummary {
        let mut summary = RunSummary::default();

        for site in &self.config.sites {
            let output_dir = output_root.join(&site.output_dir);
            let status = match self.sync_site(site, output_root, &observer).await {
                Ok(report) => {
                    info!(
                        site = %site.name,
                        written = report.written.len(),
                        failed = report.failed.len(),
                        "site synced"
                    );
                    SiteStatus::Completed(report)
                },
                Err(err) => {
                    warn!(
                        site = %site.name,
                        category = err.category(),
                        error = %err,
                        "site aborted"
                    );
                    SiteStatus::Aborted(err)
                },
            };

            let outcome = SiteOutcome {
                name: site.name.clone(),
                output_dir,
                status,
            };
            observer.site_finished(&outcome);
            summary.sites.push(outcome);
        }

        summary
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::fetcher::Fetcher;
    use crate::download::FailureReason;
    use std::collections::HashSet;
    use std::fs;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn site(server: &MockServer, name: &str, prefix: &str, output_dir: &str) -> SiteConfig {
        SiteConfig {
            name: name.to_string(),
            sitemap_url: format!("{}/sitemap.xml", server.uri()),
            prefixes: vec![format!("{}/{prefix}", server.uri())],
            output_dir: PathBuf::from(output_dir),
            hidden_paths: Vec::new(),
        }
    }

    fn sitemap_xml(server: &MockServer, paths: &[&str]) -> String {
        let urls: String = paths
            .iter()
            .map(|p| format!("<url><loc>{}/{p}</loc></url>", server.uri()))
            .collect();
        format!(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{urls}</urlset>"#)
    }

    async fn mount_get(server: &MockServer, route: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn fetcher() -> Fetcher {
        Fetcher::with_options(Duration::from_secs(5), "docmirror-test").unwrap()
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl MirrorObserver for RecordingObserver {
        fn site_started(&self, site: &SiteConfig, documents: usize) {
            self.events
                .lock()
                .expect("lock")
                .push(format!("start {} {documents}", site.name));
        }

        fn site_finished(&self, outcome: &SiteOutcome) {
            let label = if outcome.is_aborted() { "aborted" } else { "done" };
            self.events
                .lock()
                .expect("lock")
                .push(format!("{label} {}", outcome.name));
        }
    }

    #[tokio::test]
    async fn test_resolve_entries_end_to_end() {
        let server = MockServer::start().await;
        let xml = sitemap_xml(&server, &["en/docs/b", "en/docs/a", "other/c"]);
        mount_get(&server, "/sitemap.xml", 200, &xml).await;

        let mut docs = site(&server, "docs", "en/docs/", ".");
        docs.hidden_paths = vec!["x/y".to_string()];
        let config = MirrorConfig::with_sites(vec![docs.clone()]);
        let fetcher = fetcher();

        let entries = SiteMirror::new(&fetcher, &config)
            .resolve_entries(&docs)
            .await
            .unwrap();

        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b", "x/y"]);
        assert_eq!(entries[2].url, format!("{}/en/docs/x/y", server.uri()));
    }

    #[tokio::test]
    async fn test_run_downloads_into_site_directories() {
        let server = MockServer::start().await;
        let xml = sitemap_xml(&server, &["en/docs/a", "en/docs/guide/b", "en/api/c"]);
        mount_get(&server, "/sitemap.xml", 200, &xml).await;
        mount_get(&server, "/en/docs/a.md", 200, "# A").await;
        mount_get(&server, "/en/docs/guide/b.md", 200, "# B").await;
        mount_get(&server, "/en/api/c.md", 200, "# C").await;

        let config = MirrorConfig::with_sites(vec![
            site(&server, "docs", "en/docs/", "."),
            site(&server, "api", "en/api/", "api"),
        ]);
        let dir = tempdir().unwrap();
        let fetcher = fetcher();

        let summary = SiteMirror::new(&fetcher, &config)
            .run(dir.path(), Arc::new(NoopObserver))
            .await;

        assert_eq!(summary.total_written(), 3);
        assert_eq!(summary.total_failed(), 0);
        assert!(!summary.has_failures());
        assert_eq!(fs::read_to_string(dir.path().join("a.md")).unwrap(), "# A");
        assert_eq!(
            fs::read_to_string(dir.path().join("guide/b.md")).unwrap(),
            "# B"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("api/c.md")).unwrap(),
            "# C"
        );
    }

    #[tokio::test]
    async fn test_missing_documents_are_reported_per_site() {
        let server = MockServer::start().await;
        let xml = sitemap_xml(&server, &["en/docs/a", "en/docs/gone", "en/docs/broken"]);
        mount_get(&server, "/sitemap.xml", 200, &xml).await;
        mount_get(&server, "/en/docs/a.md", 200, "# A").await;
        mount_get(&server, "/en/docs/gone.md", 404, "").await;
        mount_get(&server, "/en/docs/broken.md", 500, "").await;

        let config = MirrorConfig::with_sites(vec![site(&server, "docs", "en/docs/", ".")]);
        let dir = tempdir().unwrap();
        let fetcher = fetcher();

        let summary = SiteMirror::new(&fetcher, &config)
            .run(dir.path(), Arc::new(NoopObserver))
            .await;

        let report = summary.sites[0].report().unwrap();
        assert_eq!(report.written, vec!["a".to_string()]);
        let failed: HashSet<&str> = report.failed_paths().into_iter().collect();
        assert_eq!(failed, HashSet::from(["gone", "broken"]));
        assert_eq!(
            report
                .failed
                .iter()
                .filter(|f| f.reason == FailureReason::NotFound)
                .count(),
            1
        );
        assert!(
            report
                .failed
                .iter()
                .any(|f| f.reason == FailureReason::Status(500))
        );
        assert!(!dir.path().join("gone.md").exists());
        assert!(summary.has_failures());
        assert!(!summary.all_sites_aborted());
    }

    #[tokio::test]
    async fn test_fatal_site_error_does_not_stop_later_sites() {
        let broken = MockServer::start().await;
        mount_get(&broken, "/sitemap.xml", 200, "<urlset><unclosed>").await;

        let missing = MockServer::start().await;
        mount_get(&missing, "/sitemap.xml", 503, "").await;

        let healthy = MockServer::start().await;
        let xml = sitemap_xml(&healthy, &["docs/a"]);
        mount_get(&healthy, "/sitemap.xml", 200, &xml).await;
        mount_get(&healthy, "/docs/a.md", 200, "# A").await;

        let config = MirrorConfig::with_sites(vec![
            site(&broken, "broken", "docs/", "broken"),
            site(&missing, "missing", "docs/", "missing"),
            site(&healthy, "healthy", "docs/", "healthy"),
        ]);
        let dir = tempdir().unwrap();
        let fetcher = fetcher();
        let observer = Arc::new(RecordingObserver::default());

        let summary = SiteMirror::new(&fetcher, &config)
            .run(dir.path(), Arc::clone(&observer) as Arc<dyn MirrorObserver>)
            .await;

        assert_eq!(summary.sites.len(), 3);
        match &summary.sites[0].status {
            SiteStatus::Aborted(err) => assert_eq!(err.category(), "parse"),
            other => panic!("expected parse abort, got {other:?}"),
        }
        match &summary.sites[1].status {
            SiteStatus::Aborted(Error::Fetch { status, .. }) => assert_eq!(*status, 503),
            other => panic!("expected fetch abort, got {other:?}"),
        }
        assert_eq!(summary.aborted_sites().len(), 2);
        assert_eq!(summary.total_written(), 1);
        assert!(dir.path().join("healthy/a.md").exists());
        assert!(!dir.path().join("broken").exists());

        let events = observer.events.lock().expect("lock").clone();
        assert_eq!(
            events,
            vec![
                "aborted broken".to_string(),
                "aborted missing".to_string(),
                "start healthy 1".to_string(),
                "done healthy".to_string(),
            ]
        );
    }

    #[test]
    fn test_run_summary_all_aborted() {
        let summary = RunSummary {
            sites: vec![SiteOutcome {
                name: "docs".to_string(),
                output_dir: PathBuf::from("docs"),
                status: SiteStatus::Aborted(Error::Parse("bad".to_string())),
            }],
        };
        assert!(summary.all_sites_aborted());
        assert!(summary.has_failures());
        assert!(!RunSummary::default().all_sites_aborted());
    }
}
