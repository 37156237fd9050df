/// Found-links index for a single crawl run
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Mapping from each dispatched URL to the in-domain links found on it
///
/// Pages that failed, were disallowed, redirected, or had no links map to an
/// empty list. Lists keep discovery order with duplicates removed. Keys are
/// ordered so that reports are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FoundLinksIndex {
    entries: BTreeMap<String, Vec<String>>,
}

impl FoundLinksIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the links found on `url`
    ///
    /// A revisited URL (incremental crawls) replaces its earlier entry.
    pub fn record(&mut self, url: &Url, links: &[Url]) {
        let mut seen = HashSet::new();
        let links = links
            .iter()
            .map(Url::as_str)
            .filter(|link| seen.insert(*link))
            .map(str::to_string)
            .collect();
        self.entries.insert(url.as_str().to_string(), links);
    }

    /// Records an empty link list for `url` unless it already has an entry
    pub fn record_empty(&mut self, url: &Url) {
        self.entries.entry(url.as_str().to_string()).or_default();
    }

    pub fn get(&self, url: &str) -> Option<&[String]> {
        self.entries.get(url).map(Vec::as_slice)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }

    /// Total number of links across all entries
    pub fn total_links(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_record_deduplicates_in_order() {
        let mut index = FoundLinksIndex::new();
        index.record(
            &url("https://example.com/"),
            &[
                url("https://example.com/b"),
                url("https://example.com/a"),
                url("https://example.com/b"),
            ],
        );

        assert_eq!(
            index.get("https://example.com/").unwrap(),
            ["https://example.com/b", "https://example.com/a"]
        );
        assert_eq!(index.total_links(), 2);
    }

    #[test]
    fn test_record_empty_does_not_overwrite() {
        let mut index = FoundLinksIndex::new();
        index.record(&url("https://example.com/"), &[url("https://example.com/a")]);
        index.record_empty(&url("https://example.com/"));
        index.record_empty(&url("https://example.com/missing"));

        assert_eq!(index.get("https://example.com/").unwrap().len(), 1);
        assert_eq!(index.get("https://example.com/missing").unwrap().len(), 0);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_serializes_as_map() {
        let mut index = FoundLinksIndex::new();
        index.record(&url("https://example.com/"), &[url("https://example.com/a")]);

        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"{"https://example.com/":["https://example.com/a"]}"#);
    }
}
