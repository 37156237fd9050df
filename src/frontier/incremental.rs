//! Incremental frontier: FIFO order with time-based readmission

use super::{Algorithm, CrawlTarget, Frontier, TargetMeta};
use crate::state::VisitedSet;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// FIFO frontier that readmits a URL once its revisit interval has elapsed
///
/// Without an interval it behaves like breadth-first: each URL is admitted
/// at most once per run.
#[derive(Debug, Default)]
pub struct IncrementalFrontier {
    queue: VecDeque<CrawlTarget>,
    resident: HashSet<String>,
    revisit_interval: Option<Duration>,
}

impl IncrementalFrontier {
    pub fn new(revisit_interval: Option<Duration>) -> Self {
        Self {
            queue: VecDeque::new(),
            resident: HashSet::new(),
            revisit_interval,
        }
    }

    fn is_due(&self, url: &Url, visited: &VisitedSet, now: Instant) -> bool {
        match self.revisit_interval {
            Some(interval) => visited.is_due(url, interval, now),
            None => !visited.contains(url),
        }
    }
}

impl Frontier for IncrementalFrontier {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Incremental
    }

    fn add(&mut self, target: CrawlTarget, visited: &VisitedSet, now: Instant) -> bool {
        if self.resident.contains(target.url.as_str()) || !self.is_due(&target.url, visited, now) {
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

    fn is_dispatchable(&self, url: &Url, visited: &VisitedSet, now: Instant) -> bool {
        self.is_due(url, visited, now)
    }

    fn seed_meta(&self) -> TargetMeta {
        TargetMeta::LastVisited(None)
    }

    fn child_meta(&self, _parent: &CrawlTarget, child: &Url, visited: &VisitedSet) -> TargetMeta {
        TargetMeta::LastVisited(visited.last_dispatched(child))
    }
}
