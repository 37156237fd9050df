//! Uniform-cost frontier and the step-cost hook it orders by

use super::{Algorithm, CrawlTarget, Frontier, TargetMeta};
use crate::state::VisitedSet;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;
use tokio::time::Instant;
use url::Url;

/// Cost of following a link from one page to another
///
/// A child's path cost is its parent's cost plus this step cost.
pub trait CostFunction: Send + Sync {
    fn step_cost(&self, from: &Url, to: &Url) -> u64;
}

impl<F> CostFunction for F
where
    F: Fn(&Url, &Url) -> u64 + Send + Sync,
{
    fn step_cost(&self, from: &Url, to: &Url) -> u64 {
        self(from, to)
    }
}

/// Every link costs the same; uniform-cost order degenerates to breadth-first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformStepCost(pub u64);

impl Default for UniformStepCost {
    fn default() -> Self {
        Self(1)
    }
}

impl CostFunction for UniformStepCost {
    fn step_cost(&self, _from: &Url, _to: &Url) -> u64 {
        self.0
    }
}

/// Step cost equal to the number of path segments of the target
///
/// Favors shallow URLs such as `/docs` over `/docs/a/b/c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathDepthCost;

impl CostFunction for PathDepthCost {
    fn step_cost(&self, _from: &Url, to: &Url) -> u64 {
        to.path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).count() as u64)
            .unwrap_or(0)
            .max(1)
    }
}

/// Heap entry ordered by ascending cost, then by admission sequence
#[derive(Debug)]
struct CostEntry {
    cost: u64,
    seq: u64,
    target: CrawlTarget,
}

impl PartialEq for CostEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}

impl Eq for CostEntry {}

impl PartialOrd for CostEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CostEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the cheapest, oldest entry is on top
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority frontier: the target with the lowest accumulated cost is dispatched first
pub struct UcsFrontier {
    heap: BinaryHeap<CostEntry>,
    resident: HashSet<String>,
    cost_fn: Arc<dyn CostFunction>,
    next_seq: u64,
}

impl UcsFrontier {
    pub fn new(cost_fn: Arc<dyn CostFunction>) -> Self {
        Self {
            heap: BinaryHeap::new(),
            resident: HashSet::new(),
            cost_fn,
            next_seq: 0,
        }
    }
}

fn cost_of(meta: &TargetMeta) -> u64 {
    match meta {
        TargetMeta::Cost(cost) => *cost,
        _ => 0,
    }
}

impl Frontier for UcsFrontier {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Ucs
    }

    fn add(&mut self, target: CrawlTarget, visited: &VisitedSet, _now: Instant) -> bool {
        if visited.contains(&target.url) || self.resident.contains(target.url.as_str()) {
            return false;
        }
        let cost = cost_of(&target.meta);
        self.resident.insert(target.url.as_str().to_string());
        self.heap.push(CostEntry {
            cost,
            seq: self.next_seq,
            target: CrawlTarget::new(target.url, TargetMeta::Cost(cost)),
        });
        self.next_seq += 1;
        true
    }

    fn pop(&mut self) -> Option<CrawlTarget> {
        let entry = self.heap.pop()?;
        self.resident.remove(entry.target.url.as_str());
        Some(entry.target)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn seed_meta(&self) -> TargetMeta {
        TargetMeta::Cost(0)
    }

    fn child_meta(&self, parent: &CrawlTarget, child: &Url, _visited: &VisitedSet) -> TargetMeta {
        let step = self.cost_fn.step_cost(&parent.url, child);
        TargetMeta::Cost(cost_of(&parent.meta).saturating_add(step))
    }
}
