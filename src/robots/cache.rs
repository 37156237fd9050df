//! Per-origin robots.txt cache
//!
//! Each origin's robots.txt is requested at most once per run. Concurrent
//! lookups for the same origin wait on one shared fetch.

use crate::robots::RobotsRules;
use crate::url::origin_of;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// Outcome of fetching an origin's robots.txt
#[derive(Debug, Clone)]
pub enum RobotsEntry {
    /// robots.txt was served with status 200
    Rules(RobotsRules),
    /// Not found, non-200, or unreachable; everything is allowed
    Absent,
}

impl RobotsEntry {
    pub fn is_allowed(&self, agent: &str, url: &Url) -> bool {
        match self {
            Self::Rules(rules) => rules.is_allowed(agent, url),
            Self::Absent => true,
        }
    }

    pub fn crawl_delay(&self, agent: &str) -> Option<Duration> {
        match self {
            Self::Rules(rules) => rules.crawl_delay(agent),
            Self::Absent => None,
        }
    }
}

/// Robots.txt cache keyed by origin (`scheme://host[:port]`)
///
/// Entries live for the lifetime of the cache, which is one crawl run.
#[derive(Debug)]
pub struct PolitenessCache {
    client: Client,
    entries: Mutex<HashMap<String, Arc<OnceCell<RobotsEntry>>>>,
}

impl PolitenessCache {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true if robots.txt for the URL's origin permits `agent` to fetch it
    ///
    /// URLs without an origin are allowed.
    pub async fn is_allowed(&self, agent: &str, url: &Url) -> bool {
        let Some(origin) = origin_of(url) else {
            return true;
        };
        let allowed = self.entry(&origin).await.is_allowed(agent, url);
        if !allowed {
            tracing::debug!(url = %url, agent, "disallowed by robots.txt");
        }
        allowed
    }

    /// Crawl delay the origin declares for `agent`, fetching robots.txt if needed
    pub async fn crawl_delay(&self, agent: &str, url: &Url) -> Option<Duration> {
        let origin = origin_of(url)?;
        self.entry(&origin).await.crawl_delay(agent)
    }

    /// Number of origins with a resolved robots.txt entry
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn entry(&self, origin: &str) -> RobotsEntry {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(origin.to_string()).or_default())
        };

        cell.get_or_init(|| self.fetch(origin)).await.clone()
    }

    async fn fetch(&self, origin: &str) -> RobotsEntry {
        let robots_url = format!("{}/robots.txt", origin);
        tracing::debug!(url = %robots_url, "fetching robots.txt");

        let response = match self.client.get(&robots_url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %robots_url, error = %e, "robots.txt unreachable, allowing all");
                return RobotsEntry::Absent;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(url = %robots_url, status = %response.status(), "no robots.txt");
            return RobotsEntry::Absent;
        }

        match response.text().await {
            Ok(body) => RobotsEntry::Rules(RobotsRules::from_body(&body)),
            Err(e) => {
                tracing::warn!(url = %robots_url, error = %e, "failed to read robots.txt body");
                RobotsEntry::Absent
            }
        }
    }
}
