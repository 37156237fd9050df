//! End-to-end crawl behavior across traversal algorithms

use super::{html, mount_page, page, test_config};
use std::time::Duration;
use sumi_sweep::crawler::CrawlEngine;
use sumi_sweep::frontier::Algorithm;
use sumi_sweep::output::StopReason;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="https://external.com/elsewhere">External</a>
        </body></html>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/page1",
        r#"<a href="/page2">Page 2</a><a href="/">Home</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/page2", "<html><body>leaf</body></html>", 1).await;

    let report = CrawlEngine::new(test_config(), Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Drained);
    assert_eq!(report.stats.dispatched, 3);
    assert_eq!(report.stats.succeeded, 3);
    assert_eq!(report.found_links.len(), 3);

    assert_eq!(
        report.found_links.get(&page(&server, "/")).unwrap(),
        [page(&server, "/page1"), page(&server, "/page2")]
    );
    assert_eq!(
        report.found_links.get(&page(&server, "/page1")).unwrap(),
        [page(&server, "/page2"), page(&server, "/")]
    );
    assert!(report.found_links.get(&page(&server, "/page2")).unwrap().is_empty());
}

#[tokio::test]
async fn test_external_links_excluded_from_found_links() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/page1">Internal</a>
            <a href="https://external.com">External</a>
        </body></html>"#,
        1,
    )
    .await;
    mount_page(&server, "/page1", "<html></html>", 1).await;

    let report = CrawlEngine::new(test_config(), Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(
        report.found_links.get(&page(&server, "/")).unwrap(),
        [page(&server, "/page1")]
    );
}

#[tokio::test]
async fn test_redirect_target_dispatched_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/old">Old</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/new", r#"<a href="/old">Back to old</a>"#, 1).await;

    let report = CrawlEngine::new(test_config(), Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.dispatched, 3);
    assert_eq!(report.stats.redirected, 1);
    assert!(report.found_links.get(&page(&server, "/old")).unwrap().is_empty());
    assert_eq!(
        report.found_links.get(&page(&server, "/new")).unwrap(),
        [page(&server, "/old")]
    );
}

#[tokio::test]
async fn test_concurrency_limit_respected() {
    let server = MockServer::start().await;
    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links, 1).await;
    for i in 0..20 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html("<html></html>").set_delay(Duration::from_millis(100)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut config = test_config();
    config.crawler.concurrency_limit = 3;

    let report = CrawlEngine::new(config, Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.dispatched, 21);
    assert_eq!(report.stats.peak_in_flight, 3);
}

#[tokio::test]
async fn test_dfs_depth_bound() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/d1">d1</a>"#, 1).await;
    mount_page(&server, "/d1", r#"<a href="/d2">d2</a>"#, 1).await;
    mount_page(&server, "/d2", r#"<a href="/d3">d3</a>"#, 1).await;
    mount_page(&server, "/d3", "<html></html>", 0).await;

    let mut config = test_config();
    config.crawler.max_depth = Some(2);

    let report = CrawlEngine::new(config, Algorithm::Dfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.dispatched, 3);
    // /d3 was found on /d2 but never dispatched
    assert_eq!(
        report.found_links.get(&page(&server, "/d2")).unwrap(),
        [page(&server, "/d3")]
    );
    assert!(!report.found_links.contains(&page(&server, "/d3")));
}

#[tokio::test]
async fn test_redirect_keeps_depth() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/old">old</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    // /new sits at depth 1 like /old, so its child at depth 2 is out of bounds
    mount_page(&server, "/new", r#"<a href="/child">child</a>"#, 1).await;
    mount_page(&server, "/child", "<html></html>", 0).await;

    let mut config = test_config();
    config.crawler.max_depth = Some(1);

    let report = CrawlEngine::new(config, Algorithm::Dfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.dispatched, 3);
}

#[tokio::test]
async fn test_every_algorithm_visits_reachable_pages_once() {
    for algorithm in [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::Ucs,
        Algorithm::Incremental,
    ] {
        let server = MockServer::start().await;
        mount_page(&server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#, 1).await;
        mount_page(&server, "/a", r#"<a href="/c">c</a><a href="/">home</a>"#, 1).await;
        mount_page(&server, "/b", r#"<a href="/c">c</a><a href="/a">a</a>"#, 1).await;
        mount_page(&server, "/c", r#"<a href="/">home</a>"#, 1).await;

        let report = CrawlEngine::new(test_config(), algorithm)
            .run(&server.uri())
            .await
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::Drained, "{}", algorithm);
        assert_eq!(report.stats.dispatched, 4, "{}", algorithm);
        assert_eq!(report.found_links.len(), 4, "{}", algorithm);
        assert_eq!(report.found_links.total_links(), 7, "{}", algorithm);
        server.verify().await;
    }
}

#[tokio::test]
async fn test_blocked_content_type_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/song.mp3">listen</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/song.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 64], "audio/mpeg"))
        .expect(1)
        .mount(&server)
        .await;

    let report = CrawlEngine::new(test_config(), Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.skipped, 1);
    assert!(report.found_links.get(&page(&server, "/song.mp3")).unwrap().is_empty());
}

#[tokio::test]
async fn test_http_errors_recorded_not_retried() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/missing">gone</a><a href="/broken">broken</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let report = CrawlEngine::new(test_config(), Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Drained);
    assert_eq!(report.stats.http_errors.get(&404), Some(&1));
    assert_eq!(report.stats.http_errors.get(&500), Some(&1));
    assert!(report.found_links.get(&page(&server, "/missing")).unwrap().is_empty());
}

#[tokio::test]
async fn test_incremental_revisits_after_interval() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">a</a>"#, 2).await;
    // /a answers after the revisit interval, so its link back to / is due again
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/">home</a>"#).set_delay(Duration::from_millis(1_200)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.crawler.revisit_interval_secs = Some(1);
    config.crawler.max_pages = Some(3);

    let report = CrawlEngine::new(config, Algorithm::Incremental)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.dispatched, 3);
    assert_eq!(report.stop_reason, StopReason::MaxPages);
}

#[tokio::test]
async fn test_max_duration_stops_run() {
    let server = MockServer::start().await;
    let links: String = (0..30).map(|i| format!(r#"<a href="/s{}">s</a>"#, i)).collect();
    mount_page(&server, "/", &links, 1).await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>").set_delay(Duration::from_millis(400)))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.crawler.concurrency_limit = 1;
    config.crawler.max_duration_secs = Some(1);

    let report = CrawlEngine::new(config, Algorithm::Bfs)
        .run(&server.uri())
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::MaxDuration);
    assert!(report.stats.dispatched < 31);
}
