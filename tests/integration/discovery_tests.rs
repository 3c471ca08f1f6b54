//! Integration tests for URL discovery
//!
//! These tests use wiremock to stand in for a site and exercise the full
//! sitemap, robots.txt and hyperlink fallback chain over real HTTP.

use site_harvest::config::{Config, LinkScope};
use site_harvest::discovery::{
    get_all_urls, Discoverer, DiscoverySource, EmptyReason, HttpClient, HyperlinkScraper,
    Resolution, SitemapResolver,
};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// `set_body_string` forces text/plain, so the type goes through `set_body_raw`
fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/xml")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.discovery.request_timeout_secs = 5;
    config.discovery.connect_timeout_secs = 2;
    config
}

fn http(config: &Config) -> Arc<HttpClient> {
    Arc::new(
        HttpClient::from_config(&config.user_agent, &config.discovery)
            .expect("Failed to build HTTP client"),
    )
}

#[tokio::test]
async fn test_sitemap_urls_returned_unfiltered() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(format!(
            "<urlset><url><loc>{0}/academics/</loc></url><url><loc>{0}/login</loc></url></urlset>",
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The first 200 wins, so nothing else may be requested
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let discoverer = Discoverer::new(&test_config()).unwrap();
    let discovery = discoverer.discover(&base_url).await;

    assert_eq!(discovery.source, DiscoverySource::Sitemap);
    assert_eq!(
        discovery.urls,
        vec![
            format!("{}/academics/", base_url),
            format!("{}/login", base_url)
        ]
    );
}

#[tokio::test]
async fn test_later_sitemap_location_used_when_first_missing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(xml(format!(
            "<urlset><url><loc>{}/docs/</loc></url></urlset>",
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = test_config();
    let resolver = SitemapResolver::new(http(&config), &config.discovery);
    let resolution = resolver.try_default_sitemaps(&base_url).await;

    assert_eq!(
        resolution,
        Resolution::Found([format!("{}/docs/", base_url)].into())
    );
}

#[tokio::test]
async fn test_sitemap_index_unions_children() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <sitemap><loc>{0}/posts.xml</loc></sitemap>
                <sitemap><loc>{0}/pages.xml</loc></sitemap>
                <sitemap><loc>{0}/missing.xml</loc></sitemap>
            </sitemapindex>"#,
            base_url
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts.xml"))
        .respond_with(xml(format!(
            "<urlset><url><loc>{0}/blog/a</loc></url><url><loc>{0}/about/</loc></url></urlset>",
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages.xml"))
        .respond_with(xml(format!(
            "<urlset><url><loc>{0}/about/</loc></url><url><loc>{0}/contact</loc></url></urlset>",
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let urls = get_all_urls(&base_url, &test_config()).await.unwrap();
    assert_eq!(
        urls,
        vec![
            format!("{}/about/", base_url),
            format!("{}/blog/a", base_url),
            format!("{}/contact", base_url),
        ]
    );
}

#[tokio::test]
async fn test_robots_sitemap_used_when_no_default_sitemap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nDisallow: /private\nSitemap: {}/maps/site.xml\n",
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maps/site.xml"))
        .respond_with(xml(format!(
            "<urlset><url><loc>{}/news/today</loc></url></urlset>",
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let discoverer = Discoverer::new(&test_config()).unwrap();
    let discovery = discoverer.discover(&base_url).await;

    assert_eq!(discovery.source, DiscoverySource::Robots);
    assert_eq!(discovery.urls, vec![format!("{}/news/today", base_url)]);
}

#[tokio::test]
async fn test_malformed_sitemap_falls_back_to_robots() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml("<urlset><url><loc>broken".to_string()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("Sitemap: {}/real-sitemap.xml", base_url)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/real-sitemap.xml"))
        .respond_with(xml(format!(
            "<urlset><url><loc>{}/guides/setup</loc></url></urlset>",
            base_url
        )))
        .mount(&mock_server)
        .await;

    let discoverer = Discoverer::new(&test_config()).unwrap();
    let discovery = discoverer.discover(&base_url).await;

    assert_eq!(discovery.source, DiscoverySource::Robots);
    assert_eq!(discovery.urls, vec![format!("{}/guides/setup", base_url)]);
}

#[tokio::test]
async fn test_hyperlink_fallback_is_classified() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <a href="/research/lab">Lab</a>
                <a href="/login">Log in</a>
                <a href="/assets/logo.png">Logo</a>
                <a href="https://elsewhere.org/research/">Partner</a>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let discoverer = Discoverer::new(&test_config()).unwrap();
    let discovery = discoverer.discover(&base_url).await;

    assert_eq!(discovery.source, DiscoverySource::Hyperlinks);
    assert_eq!(discovery.urls, vec![format!("{}/research/lab", base_url)]);
}

#[tokio::test]
async fn test_navigation_only_scope() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <nav class="main-nav">
                    <a href="/about/">About</a>
                    <a href="/programs/">Programs</a>
                </nav>
                <main><a href="/news/">In the news</a></main>
            </body></html>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.discovery.scope = LinkScope::NavigationOnly;
    let discoverer = Discoverer::new(&config).unwrap();

    assert_eq!(
        discoverer.get_all_urls(&base_url).await,
        vec![
            format!("{}/about/", base_url),
            format!("{}/programs/", base_url)
        ]
    );
}

#[tokio::test]
async fn test_depth_exceeded_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("<a href=\"/docs/\">Docs</a>".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = test_config();
    let scraper = HyperlinkScraper::new(http(&config), &config.discovery, &config.filters);

    assert_eq!(scraper.max_depth(), 3);
    assert_eq!(
        scraper.extract_hrefs(&mock_server.uri(), 4).await,
        Resolution::Empty(EmptyReason::DepthExceeded)
    );
}

#[tokio::test]
async fn test_nothing_discovered_is_not_an_error() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let discoverer = Discoverer::new(&test_config()).unwrap();
    let discovery = discoverer.discover(&base_url).await;

    assert_eq!(discovery.source, DiscoverySource::None);
    assert!(discovery.urls.is_empty());
}

#[tokio::test]
async fn test_unreachable_site_is_empty() {
    let config = test_config();
    // Nothing listens on the discard port
    let urls = get_all_urls("http://127.0.0.1:9", &config).await.unwrap();
    assert!(urls.is_empty());
}
