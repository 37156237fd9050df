//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawls
//! end-to-end through the public API.

mod crawl_tests;
mod politeness_tests;

use sumi_sweep::config::Config;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration with fast retries, suitable for local mock servers
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.user_agent.agents = vec!["TestBot/1.0".to_string()];
    config.fetch.retry_backoff_ms = 1;
    config.fetch.request_timeout_ms = 5_000;
    config
}

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

/// Absolute URL on the mock server, as it appears in the found-links index
pub fn page(server: &MockServer, p: &str) -> String {
    format!("{}{}", server.uri(), p)
}

/// Mounts an HTML page that must be fetched exactly `times` times
pub async fn mount_page(server: &MockServer, p: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(html(body))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}
