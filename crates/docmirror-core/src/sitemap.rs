//! Sitemap retrieval and XML parsing.
//!
//! Only the standard `<urlset>` form is understood. `<loc>` elements count
//! when they are bound to the sitemap namespace, wherever they appear under
//! the root:
//!
//! ```xml
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url><loc>https://example.com/en/docs/intro</loc></url>
//! </urlset>
//! ```

use crate::fetcher::Transport;
use crate::{Error, Result};
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use tracing::instrument;

/// Namespace every sitemap element must be bound to.
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Fetch the raw sitemap document for a site.
#[instrument(skip(transport))]
pub async fn fetch_sitemap<T>(transport: &T, url: &str) -> Result<String>
where
    T: Transport + ?Sized,
{
    transport.fetch_text(url).await
}

/// Parse sitemap XML and return every non-empty `<loc>` value in document order.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the XML is malformed, the document is empty,
/// or the root element is not a `<urlset>` in the sitemap namespace.
#[instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut locations = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current_loc: Option<String> = None;

    loop {
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| Error::Parse(format!("XML parse error: {e}")))?;
        let in_sitemap_ns = is_sitemap_ns(&resolved);

        match event {
            Event::Start(e) => {
                let local = e.local_name();
                if !seen_root {
                    check_root(local.as_ref(), in_sitemap_ns)?;
                    seen_root = true;
                } else if in_sitemap_ns && local.as_ref() == b"loc" {
                    current_loc = Some(String::new());
                }
                depth += 1;
            },
            Event::Empty(e) => {
                if !seen_root {
                    check_root(e.local_name().as_ref(), in_sitemap_ns)?;
                    seen_root = true;
                }
            },
            Event::End(e) => {
                if in_sitemap_ns && e.local_name().as_ref() == b"loc" {
                    if let Some(loc) = current_loc.take() {
                        let loc = loc.trim();
                        if !loc.is_empty() {
                            locations.push(loc.to_string());
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            },
            Event::Text(e) => {
                if let Some(loc) = current_loc.as_mut() {
                    let text = e.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                    loc.push_str(&text);
                }
            },
            Event::CData(e) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&e));
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if !seen_root {
        return Err(Error::Parse("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(Error::Parse(
            "unexpected end of document: unclosed elements".to_string(),
        ));
    }

    tracing::debug!(count = locations.len(), "parsed sitemap locations");
    Ok(locations)
}

fn is_sitemap_ns(resolved: &ResolveResult<'_>) -> bool {
    matches!(resolved, ResolveResult::Bound(Namespace(ns)) if *ns == SITEMAP_NAMESPACE.as_bytes())
}

fn check_root(local_name: &[u8], in_sitemap_ns: bool) -> Result<()> {
    if in_sitemap_ns && local_name == b"urlset" {
        return Ok(());
    }
    if local_name == b"sitemapindex" {
        return Err(Error::Parse(
            "XML is a sitemap index, not a standard sitemap".to_string(),
        ));
    }
    Err(Error::Parse(format!(
        "expected <urlset> in namespace {SITEMAP_NAMESPACE}, found <{}>",
        String::from_utf8_lossy(local_name)
    )))
}
