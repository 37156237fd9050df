use crate::frontier::Algorithm;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Sweep
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Dispatch loop and frontier configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Traversal discipline used when none is given on the command line
    pub algorithm: Algorithm,

    /// Maximum number of fetch tasks in flight at once
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: u32,

    /// Pause applied after each completion wave (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Depth bound for depth-first traversal; unbounded when absent
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Minimum time before an incremental crawl may revisit a URL (seconds)
    #[serde(rename = "revisit-interval-secs")]
    pub revisit_interval_secs: Option<u64>,

    /// Stop launching new fetches after this many seconds
    #[serde(rename = "max-duration-secs")]
    pub max_duration_secs: Option<u64>,

    /// Stop launching new fetches after this many dispatches
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u64>,

    /// How long in-flight fetches may run after a stop before being aborted (seconds)
    #[serde(rename = "drain-timeout-secs")]
    pub drain_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Bfs,
            concurrency_limit: 5,
            request_delay_ms: 0,
            max_depth: None,
            revisit_interval_secs: None,
            max_duration_secs: None,
            max_pages: None,
            drain_timeout_secs: 30,
        }
    }
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn revisit_interval(&self) -> Option<Duration> {
        self.revisit_interval_secs.map(Duration::from_secs)
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.map(Duration::from_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

/// Outbound identity configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// User agent strings; the first one is used unless rotation is enabled
    pub agents: Vec<String>,

    /// Rotate round-robin through `agents` on every request
    pub rotate: bool,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            agents: vec![format!("sumi-sweep/{}", env!("CARGO_PKG_VERSION"))],
            rotate: false,
        }
    }
}

/// HTTP fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Total attempts for a request that fails at the connection level
    #[serde(rename = "retry-attempts")]
    pub retry_attempts: u32,

    /// Base delay for exponential backoff between attempts (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Statuses reported as redirects when a Location header is present
    #[serde(rename = "redirect-status-codes")]
    pub redirect_status_codes: Vec<u16>,

    /// Content-Type prefixes that are never downloaded
    #[serde(rename = "blocked-content-types")]
    pub blocked_content_types: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
            retry_attempts: 2,
            retry_backoff_ms: 500,
            redirect_status_codes: vec![301, 302, 303, 307, 308],
            blocked_content_types: vec!["audio/".to_string(), "application/pdf".to_string()],
        }
    }
}

impl FetchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
