//! HTTP fetcher
//!
//! This module handles all HTTP requests for page content:
//! - Building the shared HTTP client (redirects are never followed automatically)
//! - Selecting the outbound user agent, optionally rotating through a pool
//! - Classifying responses into [`FetchStatus`] outcomes
//! - Retrying connection-level failures with exponential backoff

use crate::config::{FetchConfig, UserAgentConfig};
use crate::{CrawlError, Result};
use reqwest::header::{CONTENT_TYPE, LOCATION, USER_AGENT};
use reqwest::{redirect::Policy, Client, Response};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use url::Url;

/// Classified outcome of a single page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// 2xx response; body bytes are available
    Success,
    /// Configured redirect status with a Location header
    Redirect,
    /// robots.txt forbids the fetch; no request was made
    Disallowed,
    /// Content-Type matched a blocked prefix; body was not downloaded
    Skipped,
    /// Connection-level failure after all retry attempts
    ClientError,
    /// Any other HTTP status
    HttpError(u16),
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Redirect => f.write_str("redirect"),
            Self::Disallowed => f.write_str("disallowed"),
            Self::Skipped => f.write_str("skipped"),
            Self::ClientError => f.write_str("client_error"),
            Self::HttpError(code) => write!(f, "error_{}", code),
        }
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub status: FetchStatus,
    /// Raw body, present only on success
    pub content: Option<Vec<u8>>,
    /// Absolute redirect target, present only on redirect
    pub new_url: Option<Url>,
    /// Content-Type header as received
    pub content_type: Option<String>,
}

impl FetchResult {
    fn bare(status: FetchStatus, content_type: Option<String>) -> Self {
        Self {
            status,
            content: None,
            new_url: None,
            content_type,
        }
    }

    pub fn success(content: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            status: FetchStatus::Success,
            content: Some(content),
            new_url: None,
            content_type,
        }
    }

    pub fn redirect(new_url: Url, content_type: Option<String>) -> Self {
        Self {
            status: FetchStatus::Redirect,
            content: None,
            new_url: Some(new_url),
            content_type,
        }
    }

    pub fn disallowed() -> Self {
        Self::bare(FetchStatus::Disallowed, None)
    }

    pub fn skipped(content_type: Option<String>) -> Self {
        Self::bare(FetchStatus::Skipped, content_type)
    }

    pub fn client_error() -> Self {
        Self::bare(FetchStatus::ClientError, None)
    }

    pub fn http_error(code: u16, content_type: Option<String>) -> Self {
        Self::bare(FetchStatus::HttpError(code), content_type)
    }

    /// True for a successful fetch with a non-empty body
    pub fn has_content(&self) -> bool {
        self.status == FetchStatus::Success && self.content.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// Builds the HTTP client shared by the fetcher and the robots cache
///
/// Redirects are not followed; the fetcher reports them so the engine can
/// re-admit the target with the original page's metadata.
pub fn build_http_client(config: &FetchConfig, default_agent: &str) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(default_agent)
        .timeout(config.request_timeout())
        .connect_timeout(config.request_timeout())
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Outbound identity: one fixed agent, or round-robin rotation through a pool
#[derive(Debug)]
pub struct UserAgentPool {
    agents: Vec<String>,
    rotate: bool,
    next: AtomicUsize,
}

impl UserAgentPool {
    pub fn new(config: &UserAgentConfig) -> Self {
        let agents = if config.agents.is_empty() {
            UserAgentConfig::default().agents
        } else {
            config.agents.clone()
        };
        Self {
            agents,
            rotate: config.rotate,
            next: AtomicUsize::new(0),
        }
    }

    /// The agent used when rotation is off, and for robots.txt requests
    pub fn primary(&self) -> &str {
        &self.agents[0]
    }

    /// Selects the agent for the next request
    pub fn next_agent(&self) -> &str {
        if !self.rotate {
            return self.primary();
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.agents.len();
        &self.agents[index]
    }
}

/// Page fetcher owning the run's connection pool
///
/// The client must be acquired with [`Fetcher::init`] before the first fetch
/// and released with [`Fetcher::close`] once the run drains.
#[derive(Debug)]
pub struct Fetcher {
    config: FetchConfig,
    agents: UserAgentPool,
    client: RwLock<Option<Client>>,
}

impl Fetcher {
    pub fn new(config: FetchConfig, user_agent: &UserAgentConfig) -> Self {
        Self {
            config,
            agents: UserAgentPool::new(user_agent),
            client: RwLock::new(None),
        }
    }

    /// Acquires the connection pool; calling it again keeps the existing client
    pub fn init(&self) -> Result<()> {
        let mut slot = self.client.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(build_http_client(&self.config, self.agents.primary())?);
            tracing::debug!("fetcher initialized");
        }
        Ok(())
    }

    /// Releases the connection pool
    ///
    /// Safe to call more than once and before [`Fetcher::init`].
    pub fn close(&self) {
        let mut slot = self.client.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            tracing::debug!("fetcher closed");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns a handle to the shared client
    pub fn client(&self) -> Result<Client> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CrawlError::NotInitialized)
    }

    pub fn agents(&self) -> &UserAgentPool {
        &self.agents
    }

    /// Fetches a page with the next user agent from the pool
    pub async fn fetch_page(&self, url: &Url) -> FetchResult {
        let agent = self.agents.next_agent().to_string();
        self.fetch_page_as(url, &agent).await
    }

    /// Fetches a page as `agent` and classifies the response
    ///
    /// Connection-level failures are retried up to `retry_attempts` times in
    /// total. HTTP error statuses are returned as-is without retrying.
    pub async fn fetch_page_as(&self, url: &Url, agent: &str) -> FetchResult {
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "fetch attempted without a client");
                return FetchResult::client_error();
            }
        };

        let attempts = self.config.retry_attempts.max(1);
        for attempt in 1..=attempts {
            match self.attempt(&client, url, agent).await {
                Ok(result) => return result,
                Err(e) if attempt < attempts => {
                    let backoff = self.config.retry_backoff() * 2u32.saturating_pow(attempt - 1);
                    tracing::debug!(
                        url = %url,
                        attempt,
                        error = %e,
                        backoff_ms = backoff.as_millis() as u64,
                        "network error, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    tracing::debug!(url = %url, attempts, error = %e, "network error, giving up");
                }
            }
        }

        FetchResult::client_error()
    }

    async fn attempt(&self, client: &Client, url: &Url, agent: &str) -> reqwest::Result<FetchResult> {
        let response = client
            .get(url.clone())
            .header(USER_AGENT, agent)
            .send()
            .await?;

        let status = response.status();
        let content_type = header_value(&response, CONTENT_TYPE.as_str());

        if let Some(ct) = content_type.as_deref() {
            if self.is_blocked(ct) {
                return Ok(FetchResult::skipped(content_type));
            }
        }

        if self.config.redirect_status_codes.contains(&status.as_u16()) {
            if let Some(location) = header_value(&response, LOCATION.as_str()) {
                return Ok(match url.join(&location) {
                    Ok(target) => FetchResult::redirect(target, content_type),
                    Err(e) => {
                        tracing::debug!(url = %url, location, error = %e, "unusable Location header");
                        FetchResult::http_error(status.as_u16(), content_type)
                    }
                });
            }
        }

        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(FetchResult::success(body.to_vec(), content_type));
        }

        Ok(FetchResult::http_error(status.as_u16(), content_type))
    }

    fn is_blocked(&self, content_type: &str) -> bool {
        let content_type = content_type.trim().to_ascii_lowercase();
        self.config
            .blocked_content_types
            .iter()
            .any(|prefix| content_type.starts_with(&prefix.to_ascii_lowercase()))
    }
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
