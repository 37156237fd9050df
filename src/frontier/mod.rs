//! Frontier module: traversal-order strategies for the crawl engine
//!
//! A frontier holds the crawl targets that have been admitted but not yet
//! dispatched. Each variant decides two things: which targets it admits and
//! in what order it hands them back.
//!
//! | Variant | Order | Admission |
//! |---------|-------|-----------|
//! | [`BfsFrontier`] | FIFO | not visited |
//! | [`DfsFrontier`] | LIFO | not visited, depth within bound |
//! | [`UcsFrontier`] | ascending path cost | not visited |
//! | [`IncrementalFrontier`] | insertion order | not visited, or revisit interval elapsed |
//!
//! Frontiers are plain single-threaded structures. [`SharedFrontier`] wraps
//! one together with the run's [`VisitedSet`] behind a single lock, so that
//! admission checks and dequeue-and-mark-visited are each one critical section.

mod bfs;
mod dfs;
mod incremental;
mod ucs;

pub use bfs::BfsFrontier;
pub use dfs::DfsFrontier;
pub use incremental::IncrementalFrontier;
pub use ucs::{CostFunction, PathDepthCost, UcsFrontier, UniformStepCost};

use crate::config::CrawlerConfig;
use crate::state::VisitedSet;
use crate::CrawlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use url::Url;

/// Traversal discipline of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Breadth-first: FIFO frontier
    Bfs,
    /// Depth-first: LIFO frontier with an optional depth bound
    Dfs,
    /// Uniform-cost: frontier ordered by accumulated path cost
    #[serde(alias = "uniform_cost", alias = "uniform_cost_search")]
    Ucs,
    /// Incremental: FIFO frontier that readmits URLs after a revisit interval
    Incremental,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
            Self::Ucs => "ucs",
            Self::Incremental => "incremental",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "bfs" => Ok(Self::Bfs),
            "dfs" => Ok(Self::Dfs),
            "ucs" | "uniform_cost" | "uniform_cost_search" => Ok(Self::Ucs),
            "incremental" => Ok(Self::Incremental),
            _ => Err(CrawlError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Variant-specific metadata carried by a crawl target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMeta {
    /// Breadth-first targets carry nothing
    None,
    /// Link distance from the start URL
    Depth(u32),
    /// Accumulated path cost from the start URL
    Cost(u64),
    /// Instant of the URL's previous dispatch, if any
    LastVisited(Option<Instant>),
}

/// A URL admitted to the frontier, together with its traversal metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: Url,
    pub meta: TargetMeta,
}

impl CrawlTarget {
    pub fn new(url: Url, meta: TargetMeta) -> Self {
        Self { url, meta }
    }
}

/// Traversal-order data structure shared by all crawl algorithms
///
/// Implementations are not synchronized; callers serialize access through
/// [`SharedFrontier`].
pub trait Frontier: Send {
    /// The algorithm this frontier implements
    fn algorithm(&self) -> Algorithm;

    /// Admits a target unless the variant's admission rule rejects it
    ///
    /// Returns true if the target was inserted.
    fn add(&mut self, target: CrawlTarget, visited: &VisitedSet, now: Instant) -> bool;

    /// Removes and returns the next target in this variant's order
    fn pop(&mut self) -> Option<CrawlTarget>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-checks a popped URL against the visited set before dispatch
    ///
    /// Guards against a URL dispatched by another path between its admission
    /// and its dequeue.
    fn is_dispatchable(&self, url: &Url, visited: &VisitedSet, _now: Instant) -> bool {
        !visited.contains(url)
    }

    /// Metadata for the start URL
    fn seed_meta(&self) -> TargetMeta;

    /// Metadata for a link discovered on `parent`
    fn child_meta(&self, parent: &CrawlTarget, child: &Url, visited: &VisitedSet) -> TargetMeta;
}

/// Builds the frontier for `algorithm` from the crawler configuration
///
/// `cost_fn` is only consulted by the uniform-cost frontier.
pub fn build_frontier(
    algorithm: Algorithm,
    config: &CrawlerConfig,
    cost_fn: Arc<dyn CostFunction>,
) -> Box<dyn Frontier> {
    match algorithm {
        Algorithm::Bfs => Box::new(BfsFrontier::new()),
        Algorithm::Dfs => Box::new(DfsFrontier::new(config.max_depth)),
        Algorithm::Ucs => Box::new(UcsFrontier::new(cost_fn)),
        Algorithm::Incremental => Box::new(IncrementalFrontier::new(config.revisit_interval())),
    }
}

struct FrontierState {
    frontier: Box<dyn Frontier>,
    visited: VisitedSet,
}

/// A frontier and its run's visited set behind one lock
///
/// The lock is never held across an await point.
pub struct SharedFrontier {
    inner: Mutex<FrontierState>,
}

impl SharedFrontier {
    pub fn new(frontier: Box<dyn Frontier>) -> Self {
        Self {
            inner: Mutex::new(FrontierState {
                frontier,
                visited: VisitedSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.lock().frontier.algorithm()
    }

    /// Admits the start URL with the variant's baseline metadata
    pub fn seed(&self, url: Url) -> bool {
        let mut state = self.lock();
        let meta = state.frontier.seed_meta();
        let FrontierState { frontier, visited } = &mut *state;
        frontier.add(CrawlTarget::new(url, meta), visited, Instant::now())
    }

    /// Admits a target with explicit metadata (used for redirect targets)
    pub fn admit(&self, target: CrawlTarget) -> bool {
        let mut state = self.lock();
        let FrontierState { frontier, visited } = &mut *state;
        let admitted = frontier.add(target.clone(), visited, Instant::now());
        tracing::trace!(url = %target.url, admitted, "admission decision");
        admitted
    }

    /// Admits links discovered on `parent`, deriving their metadata
    ///
    /// Returns the number of links inserted.
    pub fn admit_children(&self, parent: &CrawlTarget, links: &[Url]) -> usize {
        let mut state = self.lock();
        let FrontierState { frontier, visited } = &mut *state;
        let now = Instant::now();

        links
            .iter()
            .filter(|link| {
                let meta = frontier.child_meta(parent, link, visited);
                let admitted = frontier.add(CrawlTarget::new((*link).clone(), meta), visited, now);
                tracing::trace!(url = %link, admitted, "admission decision");
                admitted
            })
            .count()
    }

    /// Pops the next dispatchable target and marks it visited, atomically
    ///
    /// Entries that became ineligible while queued are discarded.
    pub fn pop_for_dispatch(&self) -> Option<CrawlTarget> {
        let mut state = self.lock();
        let FrontierState { frontier, visited } = &mut *state;
        let now = Instant::now();

        while let Some(target) = frontier.pop() {
            if frontier.is_dispatchable(&target.url, visited, now) {
                visited.mark(&target.url, now);
                return Some(target);
            }
            tracing::trace!(url = %target.url, "discarding stale frontier entry");
        }
        None
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.lock().visited.contains(url)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().frontier.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().frontier.len()
    }

    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }
}
