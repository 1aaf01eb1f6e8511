//! Merging hidden paths into the extracted entry list.

use crate::extract::DocEntry;
use std::collections::BTreeMap;

/// Add one entry per hidden path and dedupe by path.
///
/// Hidden entries use `base` (the site's primary prefix) as their URL base
/// and are merged after `entries`, so they win on a path collision. Both
/// sides derive the same URL from the same path under the primary prefix,
/// which makes the override idempotent. Empty hidden paths are ignored. The
/// result is sorted by path.
#[must_use]
pub fn augment_entries(entries: Vec<DocEntry>, hidden_paths: &[String], base: &str) -> Vec<DocEntry> {
    let mut by_path: BTreeMap<String, DocEntry> = entries
        .into_iter()
        .map(|entry| (entry.path.clone(), entry))
        .collect();

    for hidden in hidden_paths {
        let path = hidden.trim_matches('/');
        if path.is_empty() {
            continue;
        }
        let url = format!("{base}{path}");
        by_path.insert(path.to_string(), DocEntry::new(url, path));
    }

    by_path.into_values().collect()
}
