//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise
//! fetching, link following, page saving, rate limiting and resumption.

use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use webcp::config::{CrawlSession, HttpConfig};
use webcp::crawler::{Crawler, Frontier};
use webcp::output::page_path;
use webcp::storage::FrontierEntry;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NO_LINK_PAGE: &str = "<html><body>Liberating, isn't it?</body></html>";

const REL_LINK_PAGE: &str = r#"<html><body>
<a href="/some/page.html">anchor</a>
<a href="/some/../page3.html">anchor</a>
<a href="page2.html">anchor</a>
</body></html>"#;

const ABS_LINK_PAGE: &str = r#"<html><body>
<a href="http://domain.com/some/page.html">anchor</a>
<a href="http://domain2.com">anchor</a>
</body></html>"#;

/// Creates a session rooted at `seed` with no delay and no saving
fn create_test_session(seed: &Url, max_depth: u32) -> CrawlSession {
    CrawlSession {
        seed: seed.clone(),
        destination: None,
        max_depth,
        delay: Duration::ZERO,
        resume: None,
        http: HttpConfig {
            timeout: Some(Duration::from_secs(10)),
            ..HttpConfig::default()
        },
    }
}

/// Serves `body` for every GET request
async fn serve_page(body: &str) -> (MockServer, Url) {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(&mock_server)
        .await;
    let url = Url::parse(&format!("{}/", mock_server.uri())).expect("mock server URL");
    (mock_server, url)
}

/// Mounts a page at `route` expected to be requested `times` times
async fn mount_page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(times)
        .mount(server)
        .await;
}

/// Serves one response that promises more body than it sends, then hangs up
async fn serve_truncated_page(body: &'static str) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local address");

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n",
            body.len() + 1000
        );
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(body.as_bytes()).await;
        let _ = socket.flush().await;
    });

    Url::parse(&format!("http://{}/", addr)).expect("listener URL")
}

fn drain(frontier: &mut Frontier) -> Vec<(String, u32)> {
    let mut entries = Vec::new();
    while let Some(FrontierEntry { url, depth }) = frontier.next().expect("frontier read") {
        entries.push((url.to_string(), depth));
    }
    entries
}

fn request_count(received: Option<Vec<wiremock::Request>>) -> usize {
    received.map(|requests| requests.len()).unwrap_or(0)
}

#[tokio::test]
async fn test_fetch_saves_page_and_enqueues_links() {
    let (_server, url) = serve_page(ABS_LINK_PAGE).await;
    let mut crawler = Crawler::new(create_test_session(&url, 5)).expect("crawler");

    let mut saved = Vec::new();
    let complete = crawler.fetch(&url, 1, Some(&mut saved)).await;

    assert!(complete);
    assert_eq!(String::from_utf8(saved).unwrap(), ABS_LINK_PAGE);
    assert_eq!(
        drain(crawler.frontier_mut()),
        vec![
            ("http://domain.com/some/page.html".to_string(), 2),
            ("http://domain2.com/".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn test_fetch_without_sink_enqueues_links() {
    let (_server, url) = serve_page(ABS_LINK_PAGE).await;
    let mut crawler = Crawler::new(create_test_session(&url, 5)).expect("crawler");

    let complete = crawler.fetch(&url, 1, None).await;

    assert!(!complete);
    assert_eq!(crawler.stats().pages_fetched, 1);
    assert_eq!(drain(crawler.frontier_mut()).len(), 2);
}

#[tokio::test]
async fn test_fetch_at_max_depth_saves_without_links() {
    let (_server, url) = serve_page(ABS_LINK_PAGE).await;
    let mut crawler = Crawler::new(create_test_session(&url, 5)).expect("crawler");

    let mut saved = Vec::new();
    let complete = crawler.fetch(&url, 5, Some(&mut saved)).await;

    assert!(complete);
    assert_eq!(String::from_utf8(saved).unwrap(), ABS_LINK_PAGE);
    assert!(drain(crawler.frontier_mut()).is_empty());
    assert_eq!(crawler.stats().links_enqueued, 0);
}

#[tokio::test]
async fn test_fetch_page_without_links() {
    let (_server, url) = serve_page(NO_LINK_PAGE).await;
    let mut crawler = Crawler::new(create_test_session(&url, 5)).expect("crawler");

    let mut saved = Vec::new();
    crawler.fetch(&url, 1, Some(&mut saved)).await;

    assert_eq!(String::from_utf8(saved).unwrap(), NO_LINK_PAGE);
    assert!(drain(crawler.frontier_mut()).is_empty());
}

#[tokio::test]
async fn test_fetch_resolves_relative_links() {
    let (server, _) = serve_page(REL_LINK_PAGE).await;
    let page = Url::parse(&format!("{}/some/page.html", server.uri())).unwrap();
    let mut crawler = Crawler::new(create_test_session(&page, 5)).expect("crawler");

    crawler.fetch(&page, 1, None).await;

    let base = server.uri();
    assert_eq!(
        drain(crawler.frontier_mut()),
        vec![
            (format!("{}/some/page.html", base), 2),
            (format!("{}/page3.html", base), 2),
            (format!("{}/some/page2.html", base), 2),
        ]
    );
}

#[tokio::test]
async fn test_error_status_is_still_processed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(ABS_LINK_PAGE, "text/html"))
        .mount(&mock_server)
        .await;
    let url = Url::parse(&format!("{}/missing", mock_server.uri())).unwrap();
    let mut crawler = Crawler::new(create_test_session(&url, 5)).expect("crawler");

    crawler.fetch(&url, 1, None).await;

    assert_eq!(crawler.stats().pages_fetched, 1);
    assert_eq!(drain(crawler.frontier_mut()).len(), 2);
}

#[tokio::test]
async fn test_same_host_waits_for_delay() {
    let (_server, url) = serve_page(NO_LINK_PAGE).await;
    let delay = Duration::from_millis(250);
    let mut session = create_test_session(&url, 5);
    session.delay = delay;
    let mut crawler = Crawler::new(session).expect("crawler");

    let first_start = Instant::now();
    crawler.fetch(&url, 1, None).await;
    let first_done = first_start.elapsed();
    crawler.fetch(&url, 1, None).await;
    let total = first_start.elapsed();

    assert!(first_done < delay, "first fetch took {:?}", first_done);
    assert!(total >= delay, "second fetch started after only {:?}", total);
}

#[tokio::test]
async fn test_different_hosts_do_not_wait() {
    let (_first_server, first) = serve_page(NO_LINK_PAGE).await;
    let (_second_server, second) = serve_page(NO_LINK_PAGE).await;
    let mut session = create_test_session(&first, 5);
    session.delay = Duration::from_secs(2);
    let mut crawler = Crawler::new(session).expect("crawler");

    let start = Instant::now();
    crawler.fetch(&first, 1, None).await;
    crawler.fetch(&second, 1, None).await;

    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_full_crawl_is_breadth_first_and_depth_limited() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(r#"<a href="{}/a">A</a><a href="/b">B</a>"#, base),
        1,
    )
    .await;
    mount_page(&mock_server, "/a", r#"<a href="c">C</a><a href="/">Home</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/b", r#"<a href="/c">C</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/c", r#"<a href="/d">D</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/d", NO_LINK_PAGE.to_string(), 0).await;

    let seed = Url::parse(&format!("{}/", base)).unwrap();
    let dest = TempDir::new().unwrap();
    let mut session = create_test_session(&seed, 3);
    session.destination = Some(dest.path().to_path_buf());

    let mut crawler = Crawler::new(session).expect("crawler");
    let stats = crawler.run().await.expect("crawl");

    assert_eq!(stats.pages_fetched, 4);
    assert_eq!(stats.pages_saved, 4);
    assert_eq!(stats.links_enqueued, 4);
    assert_eq!(stats.fetch_failures, 0);

    let order: Vec<String> = mock_server
        .received_requests()
        .await
        .expect("request recording")
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert_eq!(order, vec!["/", "/a", "/b", "/c"]);

    for route in ["/", "/a", "/b", "/c"] {
        let url = seed.join(route).unwrap();
        assert!(page_path(dest.path(), &url).exists(), "{} not saved", route);
    }
    let missing = seed.join("/d").unwrap();
    assert!(!page_path(dest.path(), &missing).exists());
}

#[tokio::test]
async fn test_max_depth_zero_fetches_only_seed() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/a">A</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/a", NO_LINK_PAGE.to_string(), 0).await;

    let seed = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    let mut crawler = Crawler::new(create_test_session(&seed, 0)).expect("crawler");
    let stats = crawler.run().await.expect("crawl");

    assert_eq!(stats.pages_fetched, 1);
}

#[tokio::test]
async fn test_completed_crawl_resumes_to_nothing() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/a">A</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/a", NO_LINK_PAGE.to_string(), 1).await;

    let seed = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("crawl.log");
    let mut session = create_test_session(&seed, 5);
    session.resume = Some(log.clone());

    let first = Crawler::new(session.clone())
        .expect("crawler")
        .run()
        .await
        .expect("first crawl");
    assert_eq!(first.pages_fetched, 2);

    let content = std::fs::read_to_string(&log).unwrap();
    let base = mock_server.uri();
    assert_eq!(
        content,
        format!("1 {0}/\n- {0}/\n2 {0}/a\n- {0}/a\n", base)
    );

    let mut crawler = Crawler::new(session).expect("crawler");
    assert!(crawler.frontier_mut().did_resume());
    let second = crawler.run().await.expect("second crawl");

    assert_eq!(second.pages_attempted(), 0);
    assert_eq!(request_count(mock_server.received_requests().await), 2);
}

#[tokio::test]
async fn test_interrupted_crawl_resumes_pending_pages() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    mount_page(&mock_server, "/", NO_LINK_PAGE.to_string(), 0).await;
    mount_page(&mock_server, "/a", NO_LINK_PAGE.to_string(), 0).await;
    mount_page(&mock_server, "/b", r#"<a href="/">Home</a><a href="/c">C</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/c", NO_LINK_PAGE.to_string(), 1).await;

    // The run stopped right after handing /a to the crawler
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("crawl.log");
    std::fs::write(
        &log,
        format!("1 {0}/\n- {0}/\n2 {0}/a\n2 {0}/b\n- {0}/a\n", base),
    )
    .unwrap();

    let seed = Url::parse(&format!("{}/", base)).unwrap();
    let mut session = create_test_session(&seed, 5);
    session.resume = Some(log.clone());

    let stats = Crawler::new(session)
        .expect("crawler")
        .run()
        .await
        .expect("resumed crawl");

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.duplicates_skipped, 1);

    let content = std::fs::read_to_string(&log).unwrap();
    assert!(content.ends_with(&format!("- {0}/b\n3 {0}/c\n- {0}/c\n", base)));
}

#[tokio::test]
async fn test_resume_log_in_missing_directory_fails() {
    let seed = Url::parse("http://127.0.0.1:9/").unwrap();
    let dir = TempDir::new().unwrap();
    let mut session = create_test_session(&seed, 5);
    session.resume = Some(dir.path().join("missing").join("crawl.log"));

    assert!(Crawler::new(session).is_err());
}

#[tokio::test]
async fn test_unwritable_page_is_still_crawled() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/a">A</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/a", NO_LINK_PAGE.to_string(), 1).await;

    let seed = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    let dest = TempDir::new().unwrap();

    // A plain file where the host folder should go blocks every save
    let host_folder = page_path(dest.path(), &seed);
    let blocker = host_folder
        .parent()
        .map(Path::to_path_buf)
        .expect("host folder");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut session = create_test_session(&seed, 5);
    session.destination = Some(dest.path().to_path_buf());
    let stats = Crawler::new(session)
        .expect("crawler")
        .run()
        .await
        .expect("crawl");

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.pages_saved, 0);
}

#[tokio::test]
async fn test_file_and_directory_urls_are_all_saved() {
    for links in [
        r#"<a href="/docs">Docs</a><a href="/docs/intro">Intro</a>"#,
        r#"<a href="/docs/intro">Intro</a><a href="/docs">Docs</a>"#,
    ] {
        let mock_server = MockServer::start().await;
        mount_page(&mock_server, "/", links.to_string(), 1).await;
        mount_page(&mock_server, "/docs", NO_LINK_PAGE.to_string(), 1).await;
        mount_page(&mock_server, "/docs/intro", NO_LINK_PAGE.to_string(), 1).await;

        let seed = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
        let dest = TempDir::new().unwrap();
        let mut session = create_test_session(&seed, 5);
        session.destination = Some(dest.path().to_path_buf());

        let stats = Crawler::new(session)
            .expect("crawler")
            .run()
            .await
            .expect("crawl");

        assert_eq!(stats.pages_fetched, 3);
        assert_eq!(stats.pages_saved, stats.pages_fetched);
        for route in ["/docs", "/docs/intro"] {
            let url = seed.join(route).unwrap();
            assert!(page_path(dest.path(), &url).is_file(), "{} not saved", route);
        }
    }
}

#[tokio::test]
async fn test_non_html_body_is_saved_but_not_scanned() {
    let mock_server = MockServer::start().await;
    let payload = r#"<a href="/hidden">not a link in a binary file</a>"#;
    mount_page(&mock_server, "/", r#"<a href="/image.iso">ISO</a>"#.to_string(), 1).await;
    Mock::given(method("GET"))
        .and(path("/image.iso"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(payload, "application/octet-stream"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/hidden", NO_LINK_PAGE.to_string(), 0).await;

    let seed = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    let dest = TempDir::new().unwrap();
    let mut session = create_test_session(&seed, 5);
    session.destination = Some(dest.path().to_path_buf());

    let stats = Crawler::new(session)
        .expect("crawler")
        .run()
        .await
        .expect("crawl");

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.pages_saved, 2);
    let iso = seed.join("/image.iso").unwrap();
    assert_eq!(
        std::fs::read_to_string(page_path(dest.path(), &iso)).unwrap(),
        payload
    );
}

#[tokio::test]
async fn test_truncated_body_links_are_followed() {
    let url = serve_truncated_page(r#"<html><body><a href="/next">Next</a>"#).await;
    let mut crawler = Crawler::new(create_test_session(&url, 5)).expect("crawler");

    let mut saved = Vec::new();
    let complete = crawler.fetch(&url, 1, Some(&mut saved)).await;

    assert!(!complete);
    assert_eq!(crawler.stats().fetch_failures, 1);
    assert_eq!(crawler.stats().pages_fetched, 0);
    assert_eq!(
        drain(crawler.frontier_mut()),
        vec![(url.join("/next").unwrap().to_string(), 2)]
    );
}

#[tokio::test]
async fn test_failed_fetch_leaves_no_file() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="http://127.0.0.1:9/dead.html">Dead</a>"#.to_string(),
        1,
    )
    .await;

    let seed = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    let dest = TempDir::new().unwrap();
    let mut session = create_test_session(&seed, 5);
    session.destination = Some(dest.path().to_path_buf());
    session.http.connect_timeout = Some(Duration::from_secs(2));

    let stats = Crawler::new(session)
        .expect("crawler")
        .run()
        .await
        .expect("crawl");

    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.pages_saved, 1);
    let dead = Url::parse("http://127.0.0.1:9/dead.html").unwrap();
    assert!(!page_path(dest.path(), &dead).exists());
}

#[tokio::test]
async fn test_truncated_body_is_not_kept() {
    let url = serve_truncated_page(r#"<html><body>half a page"#).await;
    let dest = TempDir::new().unwrap();
    let mut session = create_test_session(&url, 5);
    session.destination = Some(dest.path().to_path_buf());

    let stats = Crawler::new(session)
        .expect("crawler")
        .run()
        .await
        .expect("crawl");

    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.pages_saved, 0);
    assert!(!page_path(dest.path(), &url).exists());
}
