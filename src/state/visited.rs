/// Visited-set bookkeeping for a single crawl run
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// URLs already dispatched in the current run
///
/// Each entry remembers when the URL was last dispatched so that the
/// incremental frontier can scope its exclusion window to the revisit
/// interval. All other frontiers treat membership as permanent.
#[derive(Debug, Default)]
pub struct VisitedSet {
    dispatched: HashMap<String, Instant>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the URL has been dispatched at any point in the run
    pub fn contains(&self, url: &Url) -> bool {
        self.dispatched.contains_key(url.as_str())
    }

    /// Returns the instant of the latest dispatch of the URL
    pub fn last_dispatched(&self, url: &Url) -> Option<Instant> {
        self.dispatched.get(url.as_str()).copied()
    }

    /// Returns true if the URL was never dispatched, or its latest dispatch
    /// is at least `interval` before `now`
    pub fn is_due(&self, url: &Url, interval: Duration, now: Instant) -> bool {
        match self.last_dispatched(url) {
            Some(at) => now.saturating_duration_since(at) >= interval,
            None => true,
        }
    }

    /// Marks the URL as dispatched at `now`, returning the previous dispatch instant
    pub fn mark(&mut self, url: &Url, now: Instant) -> Option<Instant> {
        self.dispatched.insert(url.as_str().to_string(), now)
    }

    pub fn len(&self) -> usize {
        self.dispatched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatched.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_new_set_is_empty() {
        let visited = VisitedSet::new();
        assert!(visited.is_empty());
        assert!(!visited.contains(&url("https://example.com/")));
    }

    #[test]
    fn test_mark_and_contains() {
        let mut visited = VisitedSet::new();
        let now = Instant::now();

        assert_eq!(visited.mark(&url("https://example.com/a"), now), None);
        assert!(visited.contains(&url("https://example.com/a")));
        assert!(!visited.contains(&url("https://example.com/b")));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_mark_again_returns_previous_instant() {
        let mut visited = VisitedSet::new();
        let first = Instant::now();
        let second = first + Duration::from_secs(5);

        visited.mark(&url("https://example.com/a"), first);
        assert_eq!(visited.mark(&url("https://example.com/a"), second), Some(first));
        assert_eq!(
            visited.last_dispatched(&url("https://example.com/a")),
            Some(second)
        );
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_is_due() {
        let mut visited = VisitedSet::new();
        let start = Instant::now();
        let page = url("https://example.com/a");
        let interval = Duration::from_secs(60);

        assert!(visited.is_due(&page, interval, start));

        visited.mark(&page, start);
        assert!(!visited.is_due(&page, interval, start + Duration::from_secs(59)));
        assert!(visited.is_due(&page, interval, start + Duration::from_secs(60)));
    }
}
