//! Depth-first frontier with an optional depth bound

use super::{Algorithm, CrawlTarget, Frontier, TargetMeta};
use crate::state::VisitedSet;
use std::collections::HashSet;
use tokio::time::Instant;
use url::Url;

/// LIFO frontier: the most recently admitted target is dispatched first
///
/// Targets deeper than `max_depth` are never admitted. Children sit one
/// level below the page they were found on.
#[derive(Debug, Default)]
pub struct DfsFrontier {
    stack: Vec<CrawlTarget>,
    resident: HashSet<String>,
    max_depth: Option<u32>,
}

impl DfsFrontier {
    pub fn new(max_depth: Option<u32>) -> Self {
        Self {
            stack: Vec::new(),
            resident: HashSet::new(),
            max_depth,
        }
    }

    fn within_bound(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }
}

fn depth_of(meta: &TargetMeta) -> u32 {
    match meta {
        TargetMeta::Depth(depth) => *depth,
        _ => 0,
    }
}

impl Frontier for DfsFrontier {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dfs
    }

    fn add(&mut self, target: CrawlTarget, visited: &VisitedSet, _now: Instant) -> bool {
        let depth = depth_of(&target.meta);
        if !self.within_bound(depth) {
            tracing::trace!(url = %target.url, depth, "depth bound exceeded");
            return false;
        }
        if visited.contains(&target.url) || self.resident.contains(target.url.as_str()) {
            return false;
        }
        self.resident.insert(target.url.as_str().to_string());
        self.stack.push(CrawlTarget::new(target.url, TargetMeta::Depth(depth)));
        true
    }

    fn pop(&mut self) -> Option<CrawlTarget> {
        let target = self.stack.pop()?;
        self.resident.remove(target.url.as_str());
        Some(target)
    }

    fn len(&self) -> usize {
        self.stack.len()
    }

    fn seed_meta(&self) -> TargetMeta {
        TargetMeta::Depth(0)
    }

    fn child_meta(&self, parent: &CrawlTarget, _child: &Url, _visited: &VisitedSet) -> TargetMeta {
        TargetMeta::Depth(depth_of(&parent.meta).saturating_add(1))
    }
}
