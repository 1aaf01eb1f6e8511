//! Turning sitemap locations into document entries.

use crate::Result;
use crate::sitemap::parse_sitemap;
use std::path::{Component, Path, PathBuf};

/// One document to mirror.
///
/// `path` is the source URL relative to the matched prefix, without leading
/// or trailing slashes; its `/`-separated segments become directories under
/// the site's output directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocEntry {
    /// Canonical page URL with trailing slashes removed.
    pub url: String,
    /// Relative document path, e.g. `build-with-claude/overview`.
    pub path: String,
}

impl DocEntry {
    /// Create an entry from a URL and an already-normalized path.
    #[must_use]
    pub fn new(url: impl Into<String>, path: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            path: path.into(),
        }
    }

    /// URL of the page's Markdown representation.
    #[must_use]
    pub fn markdown_url(&self) -> String {
        format!("{}.md", self.url)
    }

    /// Destination file under `root`: one directory per path segment and an
    /// `.md` suffix appended to the last one.
    ///
    /// Returns `None` when a segment is empty or would leave `root`
    /// (`..`, `.`, absolute or drive-prefixed components).
    #[must_use]
    pub fn destination(&self, root: &Path) -> Option<PathBuf> {
        let mut target = root.to_path_buf();
        let mut segments = self.path.split('/').peekable();
        while let Some(segment) = segments.next() {
            let mut components = Path::new(segment).components();
            let is_plain = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !is_plain || segment.contains('\\') {
                return None;
            }
            if segments.peek().is_some() {
                target.push(segment);
            } else {
                target.push(format!("{segment}.md"));
            }
        }
        Some(target)
    }
}

/// Return the path of `url` relative to the first prefix it starts with.
///
/// The remainder has surrounding slashes stripped; an empty remainder (the
/// prefix itself) yields `None`, as does a URL matching no prefix.
#[must_use]
pub fn match_prefix<'a>(url: &'a str, prefixes: &[String]) -> Option<&'a str> {
    let prefix = prefixes.iter().find(|p| url.starts_with(p.as_str()))?;
    let path = url[prefix.len()..].trim_matches('/');
    (!path.is_empty()).then_some(path)
}

/// Extract document entries from sitemap XML.
///
/// Locations matching no prefix are dropped; the result is sorted by path.
///
/// # Errors
///
/// Propagates [`Error::Parse`](crate::Error::Parse) from the sitemap parser.
pub fn extract_entries(sitemap_xml: &str, prefixes: &[String]) -> Result<Vec<DocEntry>> {
    let locations = parse_sitemap(sitemap_xml)?;
    let total = locations.len();

    let mut entries: Vec<DocEntry> = locations
        .iter()
        .filter_map(|loc| match_prefix(loc, prefixes).map(|path| DocEntry::new(loc.as_str(), path)))
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.url.cmp(&b.url)));

    tracing::debug!(
        locations = total,
        matched = entries.len(),
        "extracted documentation entries"
    );
    Ok(entries)
}
