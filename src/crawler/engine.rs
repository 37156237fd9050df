//! Crawl engine - the bounded-concurrency dispatch loop
//!
//! One engine drives any [`Frontier`](crate::frontier::Frontier) variant:
//!
//! 1. **Seeding**: build the frontier, admit the start URL, acquire the
//!    fetcher's client and the robots cache
//! 2. **Running**: top up in-flight tasks to the concurrency limit, wait for
//!    the first one to finish, pause for the inter-wave delay, repeat
//! 3. **Drained**: frontier empty and nothing in flight; close the fetcher
//!
//! A stop request, the page limit or the run duration limit end the Running
//! phase early. In-flight tasks are then drained, bounded by the drain
//! timeout, before the fetcher is closed.

use crate::config::Config;
use crate::crawler::fetcher::{FetchStatus, Fetcher};
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::frontier::{
    build_frontier, Algorithm, CostFunction, CrawlTarget, SharedFrontier, UniformStepCost,
};
use crate::output::{CrawlStats, StopReason};
use crate::robots::PolitenessCache;
use crate::state::FoundLinksIndex;
use crate::url::{is_same_domain, normalize_parsed, normalize_url};
use crate::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::future::pending;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep, sleep_until, timeout, Instant};
use url::Url;

/// Final result of one crawl run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub start_url: String,
    pub algorithm: Algorithm,
    pub stop_reason: StopReason,
    pub stats: CrawlStats,
    pub found_links: FoundLinksIndex,
}

/// Cloneable handle that asks a running engine to stop launching tasks
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Shared state of one run, handed to every fetch task
struct RunContext {
    frontier: SharedFrontier,
    found_links: Mutex<FoundLinksIndex>,
    politeness: PolitenessCache,
    fetcher: Fetcher,
    extractor: Arc<dyn LinkExtractor>,
}

/// Crawl engine for one traversal algorithm
///
/// Each call to [`CrawlEngine::run`] owns a fresh frontier, visited set,
/// found-links index, robots cache and HTTP client.
pub struct CrawlEngine {
    config: Config,
    algorithm: Algorithm,
    extractor: Arc<dyn LinkExtractor>,
    cost_fn: Arc<dyn CostFunction>,
    stop_tx: Arc<watch::Sender<bool>>,
}

impl CrawlEngine {
    pub fn new(config: Config, algorithm: Algorithm) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            config,
            algorithm,
            extractor: Arc::new(HtmlLinkExtractor::new()),
            cost_fn: Arc::new(UniformStepCost::default()),
            stop_tx: Arc::new(stop_tx),
        }
    }

    /// Replaces the default HTML link extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Sets the step cost used by the uniform-cost frontier
    pub fn with_cost_function(mut self, cost_fn: Arc<dyn CostFunction>) -> Self {
        self.cost_fn = cost_fn;
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a handle that stops this engine's runs
    ///
    /// The stop is sticky: a run started after `stop()` ends immediately.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: Arc::clone(&self.stop_tx),
        }
    }

    /// Crawls from `start_url` until the frontier drains or the run is stopped
    ///
    /// Fails only if the start URL is invalid or the HTTP client cannot be
    /// built. Individual page failures show up as empty found-links entries.
    pub async fn run(&self, start_url: &str) -> Result<CrawlReport> {
        let started = Instant::now();
        let start = normalize_url(start_url)?;

        // Seeding
        let fetcher = Fetcher::new(self.config.fetch.clone(), &self.config.user_agent);
        fetcher.init()?;
        let politeness = PolitenessCache::new(fetcher.client()?);
        let frontier = SharedFrontier::new(build_frontier(
            self.algorithm,
            &self.config.crawler,
            Arc::clone(&self.cost_fn),
        ));
        frontier.seed(start.clone());

        let ctx = Arc::new(RunContext {
            frontier,
            found_links: Mutex::new(FoundLinksIndex::new()),
            politeness,
            fetcher,
            extractor: Arc::clone(&self.extractor),
        });

        let wave_delay = self.wave_delay(&ctx, &start).await;
        tracing::info!(
            start_url = %start,
            algorithm = %self.algorithm,
            concurrency = self.config.crawler.concurrency_limit,
            wave_delay_ms = wave_delay.as_millis() as u64,
            "starting crawl"
        );

        // Running
        let mut stats = CrawlStats::default();
        let stop_reason = self.dispatch_loop(&ctx, wave_delay, started, &mut stats).await;

        // Drained
        ctx.fetcher.close();
        let found_links = std::mem::take(
            &mut *ctx
                .found_links
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        stats.links_found = found_links.total_links() as u64;
        stats.set_elapsed(started.elapsed());

        tracing::info!(
            dispatched = stats.dispatched,
            pages = found_links.len(),
            links = stats.links_found,
            reason = stop_reason.as_str(),
            elapsed_ms = stats.elapsed_ms,
            "crawl finished"
        );

        Ok(CrawlReport {
            start_url: start.to_string(),
            algorithm: self.algorithm,
            stop_reason,
            stats,
            found_links,
        })
    }

    /// Inter-wave delay: the configured request delay, raised to the seed
    /// origin's robots.txt Crawl-delay
    async fn wave_delay(&self, ctx: &RunContext, start: &Url) -> Duration {
        let configured = self.config.crawler.request_delay();
        let agent = ctx.fetcher.agents().primary();
        match ctx.politeness.crawl_delay(agent, start).await {
            Some(crawl_delay) if crawl_delay > configured => {
                tracing::info!(
                    crawl_delay_ms = crawl_delay.as_millis() as u64,
                    "honoring robots.txt crawl-delay"
                );
                crawl_delay
            }
            _ => configured,
        }
    }

    async fn dispatch_loop(
        &self,
        ctx: &Arc<RunContext>,
        wave_delay: Duration,
        started: Instant,
        stats: &mut CrawlStats,
    ) -> StopReason {
        let limit = self.config.crawler.concurrency_limit.max(1) as usize;
        let max_pages = self.config.crawler.max_pages;
        let deadline = self.config.crawler.max_duration().map(|d| started + d);
        let mut stop_rx = self.stop_tx.subscribe();
        let mut in_flight = JoinSet::new();

        let stop_reason = loop {
            if *stop_rx.borrow_and_update() {
                break StopReason::Stopped;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break StopReason::MaxDuration;
            }

            let mut page_limit_hit = false;
            while in_flight.len() < limit {
                if max_pages.is_some_and(|max| stats.dispatched >= max) {
                    page_limit_hit = !ctx.frontier.is_empty();
                    break;
                }
                let Some(target) = ctx.frontier.pop_for_dispatch() else {
                    break;
                };
                stats.dispatched += 1;
                tracing::debug!(url = %target.url, meta = ?target.meta, "dispatching");
                in_flight.spawn(fetch_and_process(Arc::clone(ctx), target));
            }
            stats.observe_in_flight(in_flight.len());

            if page_limit_hit {
                break StopReason::MaxPages;
            }
            if in_flight.is_empty() {
                break StopReason::Drained;
            }

            let until_deadline = async {
                match deadline {
                    Some(d) => sleep_until(d).await,
                    None => pending().await,
                }
            };

            tokio::select! {
                joined = in_flight.join_next() => {
                    if let Some(joined) = joined {
                        record_join(stats, joined);
                    }
                    if !wave_delay.is_zero() {
                        tokio::select! {
                            _ = sleep(wave_delay) => {}
                            Ok(()) = stop_rx.changed() => {}
                        }
                    }
                }
                Ok(()) = stop_rx.changed() => {}
                _ = until_deadline => {}
            }
        };

        if !in_flight.is_empty() {
            self.drain(&mut in_flight, stop_reason, stats).await;
        }
        stop_reason
    }

    /// Waits for in-flight tasks, aborting whatever is left after the drain timeout
    async fn drain(
        &self,
        in_flight: &mut JoinSet<FetchStatus>,
        reason: StopReason,
        stats: &mut CrawlStats,
    ) {
        let drain_timeout = self.config.crawler.drain_timeout();
        tracing::info!(
            reason = reason.as_str(),
            in_flight = in_flight.len(),
            "stopping, draining in-flight fetches"
        );

        let drained = timeout(drain_timeout, async {
            while let Some(joined) = in_flight.join_next().await {
                record_join(stats, joined);
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                remaining = in_flight.len(),
                timeout_secs = drain_timeout.as_secs(),
                "drain timeout elapsed, aborting in-flight fetches"
            );
            in_flight.abort_all();
            while let Some(joined) = in_flight.join_next().await {
                record_join(stats, joined);
            }
        }
    }
}

fn record_join(stats: &mut CrawlStats, joined: std::result::Result<FetchStatus, JoinError>) {
    match joined {
        Ok(status) => stats.record(status),
        Err(e) if e.is_panic() => {
            tracing::warn!(error = %e, "fetch task panicked");
            stats.task_faults += 1;
        }
        Err(_) => stats.abandoned += 1,
    }
}

/// Writes the page's found-links entry exactly once, even if the task
/// panics or is aborted before finishing
struct EntryGuard<'a> {
    index: &'a Mutex<FoundLinksIndex>,
    url: &'a Url,
    links: Option<Vec<Url>>,
}

impl<'a> EntryGuard<'a> {
    fn new(index: &'a Mutex<FoundLinksIndex>, url: &'a Url) -> Self {
        Self {
            index,
            url,
            links: None,
        }
    }

    fn set_links(&mut self, links: Vec<Url>) {
        self.links = Some(links);
    }
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        match self.links.take() {
            Some(links) => index.record(self.url, &links),
            None => index.record_empty(self.url),
        }
    }
}

/// Per-task body: politeness check, fetch, classify, extract, admit
async fn fetch_and_process(ctx: Arc<RunContext>, target: CrawlTarget) -> FetchStatus {
    let mut entry = EntryGuard::new(&ctx.found_links, &target.url);
    let agent = ctx.fetcher.agents().next_agent();

    if !ctx.politeness.is_allowed(agent, &target.url).await {
        return FetchStatus::Disallowed;
    }

    let result = ctx.fetcher.fetch_page_as(&target.url, agent).await;
    tracing::debug!(url = %target.url, status = %result.status, "fetched");

    match result.status {
        FetchStatus::Success if result.has_content() => {
            let links = in_domain_links(ctx.extractor.extract_links(&result, &target.url), &target.url);
            let admitted = ctx.frontier.admit_children(&target, &links);
            tracing::trace!(url = %target.url, found = links.len(), admitted, "links extracted");
            entry.set_links(links);
        }
        FetchStatus::Redirect => {
            if let Some(new_url) = result.new_url.clone() {
                readmit_redirect(&ctx.frontier, &target, new_url);
            }
        }
        _ => {}
    }

    result.status
}

/// Normalizes extracted links, keeping in-domain ones in first-seen order
fn in_domain_links(links: Vec<Url>, page_url: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter_map(|link| normalize_parsed(link).ok())
        .filter(|link| is_same_domain(link, page_url))
        .filter(|link| seen.insert(link.as_str().to_string()))
        .collect()
}

/// Re-admits a redirect target with the redirecting page's metadata
fn readmit_redirect(frontier: &SharedFrontier, page: &CrawlTarget, new_url: Url) {
    let new_url = match normalize_parsed(new_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(url = %page.url, error = %e, "ignoring unusable redirect target");
            return;
        }
    };

    if !is_same_domain(&new_url, &page.url) {
        tracing::debug!(from = %page.url, to = %new_url, "redirect leaves the domain, not following");
        return;
    }

    let admitted = frontier.admit(CrawlTarget::new(new_url.clone(), page.meta));
    tracing::debug!(from = %page.url, to = %new_url, admitted, "redirect");
}
