//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use betteridge_crawl::config::UserAgentConfig;
use betteridge_crawl::crawler::{
    build_http_client, CrawlEngine, EngineSettings, FetchError, Fetcher, HttpFetcher, Scheduler,
};
use betteridge_crawl::{EngineStatus, LoadMode, SitePolicy, SnapshotStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Site rooted at a mock server; articles live under `/news/`
#[derive(Debug)]
struct MockSite {
    id: String,
    root: Url,
}

impl MockSite {
    fn new(id: &str, server: &MockServer) -> Self {
        Self {
            id: id.to_string(),
            root: Url::parse(&server.uri()).unwrap(),
        }
    }
}

impl SitePolicy for MockSite {
    fn id(&self) -> &str {
        &self.id
    }

    fn root_url(&self) -> &Url {
        &self.root
    }

    fn is_article(&self, url: &str) -> bool {
        url.starts_with(self.root.as_str()) && url.contains("/news/")
    }

    fn normalize_title(&self, raw: &str) -> String {
        raw.split('|').next().unwrap_or(raw).trim().to_string()
    }

    fn may_follow(&self, url: &str) -> bool {
        url.starts_with(self.root.as_str())
    }
}

fn create_test_fetcher() -> HttpFetcher {
    let config = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    };
    HttpFetcher::new(build_http_client(&config, Duration::from_secs(5)).unwrap())
}

fn html(title: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    let body = format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    );
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Home links to two articles, a dead page, a JSON endpoint, and an outside site
async fn mount_news_site(server: &MockServer) {
    mount(
        server,
        "/",
        html(
            "Mock News",
            &[
                "/news/1",
                "/news/2",
                "/missing",
                "/api/data",
                "https://elsewhere.example.com/",
            ],
        ),
    )
    .await;
    mount(server, "/news/1", html("Is the sky falling? | Mock News", &["/"])).await;
    mount(server, "/news/2", html("Markets rally &amp;#39;again&amp;#39; | Mock News", &[])).await;
    mount(
        server,
        "/api/data",
        ResponseTemplate::new(200).set_body_raw("{}", "application/json"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

fn settings(article_target: usize) -> EngineSettings {
    EngineSettings {
        article_target,
        checkpoint_interval: 2,
    }
}

#[tokio::test]
async fn test_fetcher_reads_title_and_links() {
    let server = MockServer::start().await;
    mount_news_site(&server).await;
    let root = Url::parse(&server.uri()).unwrap();

    let page = create_test_fetcher()
        .fetch(root.as_str(), &root)
        .await
        .unwrap();

    assert_eq!(page.title, "Mock News");
    assert_eq!(page.links.len(), 5);
    assert_eq!(page.links[0], format!("{}news/1", root));
    assert_eq!(page.links[4], "https://elsewhere.example.com/");
}

#[tokio::test]
async fn test_fetcher_rejects_error_status_and_non_html() {
    let server = MockServer::start().await;
    mount_news_site(&server).await;
    let root = Url::parse(&server.uri()).unwrap();
    let fetcher = create_test_fetcher();

    let missing = fetcher.fetch(&format!("{}missing", root), &root).await;
    assert!(matches!(missing, Err(FetchError::Status { status: 404, .. })));

    let json = fetcher.fetch(&format!("{}api/data", root), &root).await;
    assert!(matches!(json, Err(FetchError::NotHtml { .. })));
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    mount_news_site(&server).await;
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path());

    let engine = CrawlEngine::open(
        Arc::new(MockSite::new("mock", &server)),
        Arc::new(create_test_fetcher()),
        store.clone(),
        &LoadMode::Resume,
        settings(10),
    )
    .unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.status, EngineStatus::Starved);
    // Root, two articles, the 404 and the JSON endpoint
    assert_eq!(report.visited, 5);
    assert_eq!(report.fetch_failures, 2);
    assert_eq!(report.articles, 2);

    let snapshot = store.read("mock").unwrap().unwrap();
    assert!(snapshot.articles.contains_key("Is the sky falling?"));
    assert!(snapshot.articles.contains_key("Markets rally 'again'"));
    assert!(snapshot
        .visited
        .iter()
        .all(|url| !url.contains("elsewhere.example.com")));
    assert!(snapshot.frontier.is_empty());
}

#[tokio::test]
async fn test_resumed_crawl_does_not_refetch() {
    let server = MockServer::start().await;
    mount_news_site(&server).await;
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path());
    let site: Arc<dyn SitePolicy> = Arc::new(MockSite::new("mock", &server));

    let first = CrawlEngine::open(
        Arc::clone(&site),
        Arc::new(create_test_fetcher()),
        store.clone(),
        &LoadMode::Resume,
        settings(10),
    )
    .unwrap()
    .run()
    .await
    .unwrap();
    assert_eq!(first.status, EngineStatus::Starved);

    let second = CrawlEngine::open(
        site,
        Arc::new(create_test_fetcher()),
        store.clone(),
        &LoadMode::Resume,
        settings(10),
    )
    .unwrap()
    .run()
    .await
    .unwrap();

    assert_eq!(second.status, EngineStatus::Starved);
    assert_eq!(second.fetched, 0);
    assert_eq!(second.articles, 2);
    assert_eq!(second.visited, first.visited);
}

#[tokio::test]
async fn test_scheduler_crawls_every_site() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_news_site(&first).await;
    mount(&second, "/", html("Other News", &["/news/a"])).await;
    mount(&second, "/news/a", html("Who knew?", &[])).await;

    let dir = TempDir::new().unwrap();
    let sites: Vec<Arc<dyn SitePolicy>> = vec![
        Arc::new(MockSite::new("first", &first)),
        Arc::new(MockSite::new("second", &second)),
    ];

    let reports = Scheduler::new(
        sites,
        Arc::new(create_test_fetcher()),
        SnapshotStore::new(dir.path()),
        settings(1),
        1,
    )
    .run()
    .await;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].site, "first");
    assert_eq!(reports[1].site, "second");
    for report in &reports {
        assert!(report.is_success());
        let crawl = report.outcome.as_ref().unwrap();
        assert_eq!(crawl.status, EngineStatus::Completed);
        assert_eq!(crawl.articles, 1);
    }
    assert!(dir.path().join("state_first.json").exists());
    assert!(dir.path().join("state_second.json").exists());
}
