//! Integration tests for crawl sessions
//!
//! These tests drive the built-in HTTP page fetcher against wiremock servers
//! and check the persisted JSON report.

use site_harvest::config::{parse_config, CacheMode, Config};
use site_harvest::discovery::Discoverer;
use site_harvest::session::{CrawlReport, CrawlSession, FetchConfig, HttpPageFetcher, PageStatus};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

async fn mount_site(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .respond_with(html(
            "<html><body><main><h1>Intro</h1><p>Welcome to the docs.</p></main></body></html>",
        ))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/manual.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.7", "application/pdf"))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_partial_failure_report() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let base_url = mock_server.uri();

    let config = Config::default();
    let fetcher = HttpPageFetcher::from_config(&config).unwrap();
    let session = CrawlSession::new(fetcher, FetchConfig::default(), "session1");

    let urls = vec![
        format!("{}/docs/intro", base_url),
        format!("{}/docs/broken", base_url),
        format!("{}/docs/manual.pdf", base_url),
    ];
    let report = session.crawl_urls(&urls).await;

    assert_eq!(report.crawl_metadata.total_urls, 3);
    assert_eq!(report.crawl_metadata.successful_crawls, 1);
    assert_eq!(report.crawl_metadata.session_id, "session1");

    // Only failures are recorded by default
    assert_eq!(report.crawled_pages.len(), 2);
    let broken = &report.crawled_pages[&urls[1]];
    assert_eq!(broken.metadata.status, PageStatus::Failed);
    assert_eq!(broken.metadata.error.as_deref(), Some("HTTP 500"));
    assert_eq!(broken.page_data.path, "/docs/broken");
    assert!(base_url.ends_with(&broken.page_data.domain));
    assert!(report.crawled_pages.contains_key(&urls[2]));
}

#[tokio::test]
async fn test_report_written_as_json() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("crawl_results.json");

    let config = parse_config(
        r#"
        [output]
        session-id = "nightly"
        record-successes = true
        concurrency = 2
        "#,
    )
    .unwrap();
    let fetcher = HttpPageFetcher::from_config(&config).unwrap();
    let session = CrawlSession::from_config(fetcher, &config);

    let urls = vec![
        format!("{}/docs/intro", base_url),
        format!("{}/docs/broken", base_url),
    ];
    session
        .crawl_urls(&urls)
        .await
        .write_report(&report_path)
        .unwrap();

    let raw = std::fs::read_to_string(&report_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["crawl_metadata"]["total_urls"], 2);
    assert_eq!(value["crawl_metadata"]["successful_crawls"], 1);
    assert_eq!(value["crawl_metadata"]["session_id"], "nightly");

    let intro = &value["crawled_pages"][&urls[0]];
    assert_eq!(intro["metadata"]["status"], "success");
    assert!(intro["metadata"].get("error").is_none());
    assert_eq!(intro["page_data"]["url"], urls[0].as_str());

    let broken = &value["crawled_pages"][&urls[1]];
    assert_eq!(broken["metadata"]["status"], "failed");
    assert_eq!(broken["metadata"]["session_id"], "nightly");

    let report: CrawlReport = serde_json::from_str(&raw).unwrap();
    assert_eq!(report.failed_crawls(), 1);
}

#[tokio::test]
async fn test_cache_mode_reuses_outcome() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/about/"))
        .respond_with(html("<p>About us</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetch_config = FetchConfig {
        cache_mode: CacheMode::UseCache,
        ..FetchConfig::default()
    };
    let fetcher = HttpPageFetcher::from_config(&Config::default()).unwrap();
    let session = CrawlSession::new(fetcher, fetch_config, "cached");

    let url = format!("{}/about/", mock_server.uri());
    let report = session.crawl_urls(&[url.clone(), url]).await;

    assert_eq!(report.crawl_metadata.total_urls, 2);
    assert_eq!(report.crawl_metadata.successful_crawls, 2);
}

#[tokio::test]
async fn test_discover_then_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{0}/docs/intro</loc></url><url><loc>{0}/docs/broken</loc></url></urlset>",
            base_url
        )))
        .mount(&mock_server)
        .await;
    mount_site(&mock_server).await;

    let config = Config::default();
    let urls = Discoverer::new(&config)
        .unwrap()
        .get_all_urls(&base_url)
        .await;
    assert_eq!(urls.len(), 2);

    let session = CrawlSession::from_config(HttpPageFetcher::from_config(&config).unwrap(), &config);
    let report = session.crawl_urls(&urls).await;

    assert_eq!(report.crawl_metadata.total_urls, 2);
    assert_eq!(report.crawl_metadata.successful_crawls, 1);
    assert!(report.crawl_metadata.session_id.starts_with("session-"));
    assert_eq!(
        report.crawled_pages.keys().collect::<Vec<_>>(),
        vec![&format!("{}/docs/broken", base_url)]
    );
}
