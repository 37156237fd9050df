//! Breadth-first frontier

use super::{Algorithm, CrawlTarget, Frontier, TargetMeta};
use crate::state::VisitedSet;
use std::collections::{HashSet, VecDeque};
use tokio::time::Instant;
use url::Url;

/// FIFO frontier: targets are dispatched in admission order
#[derive(Debug, Default)]
pub struct BfsFrontier {
    queue: VecDeque<CrawlTarget>,
    resident: HashSet<String>,
}

impl BfsFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for BfsFrontier {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bfs
    }

    fn add(&mut self, target: CrawlTarget, visited: &VisitedSet, _now: Instant) -> bool {
        if visited.contains(&target.url) || self.resident.contains(target.url.as_str()) {
            return false;
        }
        self.resident.insert(target.url.as_str().to_string());
        self.queue.push_back(target);
        true
    }

    fn pop(&mut self) -> Option<CrawlTarget> {
        let target = self.queue.pop_front()?;
        self.resident.remove(target.url.as_str());
        Some(target)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn seed_meta(&self) -> TargetMeta {
        TargetMeta::None
    }

    fn child_meta(&self, _parent: &CrawlTarget, _child: &Url, _visited: &VisitedSet) -> TargetMeta {
        TargetMeta::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(s: &str) -> CrawlTarget {
        CrawlTarget::new(Url::parse(s).unwrap(), TargetMeta::None)
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = BfsFrontier::new();
        let visited = VisitedSet::new();
        let now = Instant::now();

        frontier.add(target("https://example.com/a"), &visited, now);
        frontier.add(target("https://example.com/b"), &visited, now);

        assert_eq!(frontier.pop().unwrap().url.path(), "/a");
        assert_eq!(frontier.pop().unwrap().url.path(), "/b");
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn test_rejects_visited() {
        let mut frontier = BfsFrontier::new();
        let mut visited = VisitedSet::new();
        let now = Instant::now();
        visited.mark(&Url::parse("https://example.com/a").unwrap(), now);

        assert!(!frontier.add(target("https://example.com/a"), &visited, now));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_rejects_resident_duplicate() {
        let mut frontier = BfsFrontier::new();
        let visited = VisitedSet::new();
        let now = Instant::now();

        assert!(frontier.add(target("https://example.com/a"), &visited, now));
        assert!(!frontier.add(target("https://example.com/a"), &visited, now));
        assert_eq!(frontier.len(), 1);

        // Once popped it is no longer resident
        frontier.pop();
        assert!(frontier.add(target("https://example.com/a"), &visited, now));
    }
}
