//! Mirror configuration: which sites to back up and how.
//!
//! The built-in [`MirrorConfig::default`] describes the sites docmirror ships
//! with. A TOML file with the same shape can replace it at runtime:
//!
//! ```toml
//! concurrency = 10
//! timeout_secs = 30
//!
//! [[sites]]
//! name = "docs"
//! sitemap_url = "https://docs.example.com/sitemap.xml"
//! prefixes = ["https://docs.example.com/en/docs/"]
//! output_dir = "."
//! hidden_paths = ["internal/release-notes"]
//! ```
//!
//! The configuration is a plain value handed to the orchestrator; nothing in
//! the crate reads it from global state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default number of documents allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Largest accepted `concurrency` value.
pub const MAX_CONCURRENCY: usize = 1024;

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Identifying `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; docmirror/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// One documentation site to mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Identifier used in logs and summaries.
    pub name: String,
    /// Location of the site's `sitemap.xml`.
    pub sitemap_url: String,
    /// Accepted URL prefixes, tried in order. The first one is also the base
    /// for hidden paths.
    pub prefixes: Vec<String>,
    /// Subdirectory of the backup root receiving this site's files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Documents that exist but are missing from the sitemap.
    #[serde(default)]
    pub hidden_paths: Vec<String>,
}

impl SiteConfig {
    /// Prefix used to build URLs for hidden paths.
    #[must_use]
    pub fn primary_prefix(&self) -> Option<&str> {
        self.prefixes.first().map(String::as_str)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("site name must not be empty".to_string()));
        }

        check_http_url(&self.sitemap_url)
            .map_err(|reason| Error::Config(format!("site '{}': sitemap_url {reason}", self.name)))?;

        if self.prefixes.is_empty() {
            return Err(Error::Config(format!(
                "site '{}' needs at least one URL prefix",
                self.name
            )));
        }
        for prefix in &self.prefixes {
            check_http_url(prefix).map_err(|reason| {
                Error::Config(format!("site '{}': prefix '{prefix}' {reason}", self.name))
            })?;
        }

        let escapes = self
            .output_dir
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::Config(format!(
                "site '{}': output_dir '{}' must be a relative path inside the backup root",
                self.name,
                self.output_dir.display()
            )));
        }

        Ok(())
    }
}

/// Run-wide configuration: the ordered site list plus transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Maximum number of documents in flight at once.
    pub concurrency: usize,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header for every request.
    pub user_agent: String,
    /// Sites to mirror, processed in declaration order.
    pub sites: Vec<SiteConfig>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            sites: builtin_sites(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl MirrorConfig {
    /// Build a configuration for the given sites with default settings.
    #[must_use]
    pub fn with_sites(sites: Vec<SiteConfig>) -> Self {
        Self {
            sites,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Serialize to TOML, e.g. to print the effective configuration.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the invariants the rest of the crate relies on.
    pub fn validate(&self) -> Result<()> {
        if self.sites.is_empty() {
            return Err(Error::Config("at least one site is required".to_string()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(Error::Config(format!(
                "concurrency must be at most {MAX_CONCURRENCY}, got {}",
                self.concurrency
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("user_agent must not be empty".to_string()));
        }

        let mut names = HashSet::new();
        for site in &self.sites {
            site.validate()?;
            if !names.insert(site.name.as_str()) {
                return Err(Error::Config(format!("duplicate site name '{}'", site.name)));
            }
        }
        Ok(())
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn check_http_url(raw: &str) -> std::result::Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("is not a valid URL: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("uses unsupported scheme '{other}'")),
    }
}

fn builtin_sites() -> Vec<SiteConfig> {
    vec![
        SiteConfig {
            name: "claude-docs".to_string(),
            sitemap_url: "https://docs.claude.com/sitemap.xml".to_string(),
            prefixes: vec!["https://docs.claude.com/en/docs/".to_string()],
            output_dir: PathBuf::from("."),
            hidden_paths: Vec::new(),
        },
        SiteConfig {
            name: "api-reference".to_string(),
            sitemap_url: "https://docs.claude.com/sitemap.xml".to_string(),
            prefixes: vec!["https://docs.claude.com/en/api/".to_string()],
            output_dir: PathBuf::from("api"),
            hidden_paths: Vec::new(),
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn site(name: &str) -> SiteConfig {
        SiteConfig {
            name: name.to_string(),
            sitemap_url: "https://example.com/sitemap.xml".to_string(),
            prefixes: vec!["https://example.com/en/docs/".to_string()],
            output_dir: PathBuf::from("."),
            hidden_paths: Vec::new(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = MirrorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.sites[0].output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_parses_minimal_toml_with_defaults() {
        let raw = r#"
            [[sites]]
            name = "docs"
            sitemap_url = "https://example.com/sitemap.xml"
            prefixes = ["https://example.com/en/docs/"]
        "#;

        let config = MirrorConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.sites.len(), 1);
        assert_eq!(config.sites[0].output_dir, PathBuf::from("."));
        assert!(config.sites[0].hidden_paths.is_empty());
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_toml_overrides_settings() {
        let raw = r#"
            concurrency = 3
            timeout_secs = 5
            user_agent = "test-agent"

            [[sites]]
            name = "docs"
            sitemap_url = "https://example.com/sitemap.xml"
            prefixes = ["https://example.com/en/docs/", "https://example.com/docs/"]
            output_dir = "mirror"
            hidden_paths = ["x/y"]
        "#;

        let config = MirrorConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(
            config.sites[0].primary_prefix(),
            Some("https://example.com/en/docs/")
        );
        assert_eq!(config.sites[0].hidden_paths, vec!["x/y".to_string()]);
    }

    #[test]
    fn test_rejects_empty_site_list() {
        let err = MirrorConfig::with_sites(Vec::new()).validate().unwrap_err();
        assert!(err.to_string().contains("at least one site"));
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let mut config = MirrorConfig::with_sites(vec![site("docs")]);
        config.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_concurrency() {
        let raw = r#"
            concurrency = 3000000000000000000

            [[sites]]
            name = "docs"
            sitemap_url = "https://example.com/sitemap.xml"
            prefixes = ["https://example.com/docs/"]
        "#;
        let err = MirrorConfig::from_toml_str(raw).unwrap_err();
        assert_eq!(err.category(), "config");
        assert!(err.to_string().contains("at most 1024"));

        let mut config = MirrorConfig::with_sites(vec![site("docs")]);
        config.concurrency = MAX_CONCURRENCY;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_site_without_prefixes() {
        let mut docs = site("docs");
        docs.prefixes.clear();
        let err = MirrorConfig::with_sites(vec![docs]).validate().unwrap_err();
        assert!(err.to_string().contains("at least one URL prefix"));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = MirrorConfig::with_sites(vec![site("docs"), site("docs")])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate site name"));
    }

    #[test]
    fn test_rejects_escaping_output_dir() {
        for dir in ["../outside", "/absolute"] {
            let mut docs = site("docs");
            docs.output_dir = PathBuf::from(dir);
            assert!(
                MirrorConfig::with_sites(vec![docs]).validate().is_err(),
                "{dir} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_non_http_urls() {
        let mut docs = site("docs");
        docs.sitemap_url = "ftp://example.com/sitemap.xml".to_string();
        assert!(MirrorConfig::with_sites(vec![docs]).validate().is_err());

        let mut docs = site("docs");
        docs.prefixes = vec!["not a url".to_string()];
        assert!(MirrorConfig::with_sites(vec![docs]).validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_keeps_sites() {
        let config = MirrorConfig::default();
        let raw = config.to_toml_string().unwrap();
        let parsed = MirrorConfig::from_toml_str(&raw).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = MirrorConfig::load(Path::new("/nonexistent/docmirror.toml")).unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
