//! robots.txt compliance during full crawls

use super::{mount_page, mount_robots, page, test_config};
use std::time::Duration;
use sumi_sweep::crawler::CrawlEngine;
use sumi_sweep::frontier::Algorithm;
use sumi_sweep::output::StopReason;
use wiremock::MockServer;

#[tokio::test]
async fn test_robots_disallowed_page_never_fetched() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /disallowed\n").await;
    mount_page(
        &server,
        "/",
        r#"<a href="/disallowed">no</a><a href="/allowed">yes</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/allowed", "<html></html>", 1).await;
    mount_page(&server, "/disallowed", "<html></html>", 0).await;

    let report = CrawlEngine::new(test_config(), Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.dispatched, 3);
    assert_eq!(report.stats.disallowed, 1);
    assert!(report
        .found_links
        .get(&page(&server, "/disallowed"))
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_agent_specific_rules() {
    let server = MockServer::start().await;
    mount_robots(
        &server,
        "User-agent: TestBot\nDisallow: /private\n\nUser-agent: *\nDisallow: /\n",
    )
    .await;
    mount_page(&server, "/", r#"<a href="/private/x">x</a><a href="/public">p</a>"#, 1).await;
    mount_page(&server, "/public", "<html></html>", 1).await;
    mount_page(&server, "/private/x", "<html></html>", 0).await;

    let report = CrawlEngine::new(test_config(), Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.succeeded, 2);
    assert_eq!(report.stats.disallowed, 1);
}

#[tokio::test]
async fn test_crawl_delay_paces_waves() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 1\n").await;
    mount_page(&server, "/", r#"<a href="/next">next</a>"#, 1).await;
    mount_page(&server, "/next", "<html></html>", 1).await;

    let report = CrawlEngine::new(test_config(), Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.dispatched, 2);
    assert!(report.stats.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_oversized_crawl_delay_ignored() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 99999999999999999999\n").await;
    mount_page(&server, "/", r#"<a href="/next">next</a>"#, 1).await;
    mount_page(&server, "/next", "<html></html>", 1).await;

    let report = CrawlEngine::new(test_config(), Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Drained);
    assert_eq!(report.stats.succeeded, 2);
    assert!(report.stats.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_missing_robots_allows_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">a</a>"#, 1).await;
    mount_page(&server, "/a", "<html></html>", 1).await;

    let report = CrawlEngine::new(test_config(), Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.succeeded, 2);
    assert_eq!(report.stats.disallowed, 0);
}
