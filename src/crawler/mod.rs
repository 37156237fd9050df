//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic and response classification
//! - HTML parsing and link extraction
//! - The bounded-concurrency dispatch loop
//! - A registry for running crawls in the background

mod engine;
mod fetcher;
mod parser;
mod registry;

pub use engine::{CrawlEngine, CrawlReport, StopHandle};
pub use fetcher::{build_http_client, FetchResult, FetchStatus, Fetcher, UserAgentPool};
pub use parser::{extract_from_html, HtmlLinkExtractor, LinkExtractor};
pub use registry::{RunRegistry, RunSnapshot};
