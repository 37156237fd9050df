//! Sumi-Sweep: a polite single-domain web crawler
//!
//! This crate drives one of four traversal disciplines (breadth-first,
//! depth-first, uniform-cost, incremental) through a shared, concurrency-bounded
//! dispatch loop, respecting robots.txt and request pacing, and records the
//! in-domain links found on every dispatched page.

pub mod config;
pub mod crawler;
pub mod frontier;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Sweep operations
///
/// Only run-level failures surface here. Per-page failures are reported as
/// [`crawler::FetchStatus`] values and never fail a run.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetcher used before its connection pool was initialized")]
    NotInitialized,

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Run not found: {0}")]
    RunNotFound(uuid::Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Sweep operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlReport, RunRegistry};
pub use frontier::Algorithm;
pub use state::{FoundLinksIndex, RunStatus};
pub use crate::url::{is_same_domain, normalize_url, origin_of};
