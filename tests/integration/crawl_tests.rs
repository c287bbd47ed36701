use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use verse_harvest::config::{
    Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig, UserAgentConfig,
};
use verse_harvest::crawler::harvest;
use verse_harvest::storage::{Checkpoint, CheckpointStore, JsonCheckpointStore};
use verse_harvest::{HarvestError, Harvested, Harvester, PoemRecord};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server and temp files
pub fn create_test_config(base_url: &str, dir: &TempDir, rate_limit_ms: u64) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            list_path: "/listpoetry.php?letter=All".to_string(),
            page_param: "page".to_string(),
        },
        crawler: CrawlerConfig { rate_limit_ms },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            dataset_path: dir.path().join("poems.ndjson").to_string_lossy().into_owned(),
            checkpoint_path: dir.path().join("progress.json").to_string_lossy().into_owned(),
        },
        selectors: SelectorConfig::default(),
    }
}

/// Reads every record from the dataset
pub fn read_dataset(config: &Config) -> Vec<PoemRecord> {
    let content = std::fs::read_to_string(&config.output.dataset_path).unwrap_or_default();
    content
        .lines()
        .map(|line| serde_json::from_str(line).expect("dataset line is a record"))
        .collect()
}

/// Reads the checkpoint file
pub fn read_checkpoint(config: &Config) -> Checkpoint {
    JsonCheckpointStore::new(Path::new(&config.output.checkpoint_path)).load()
}

/// Builds a listing page body with the given banner and detail slugs
pub fn listing_body(banner: &str, slugs: &[&str]) -> String {
    let links: String = slugs
        .iter()
        .map(|slug| format!(r#"<a href="{}">{}</a>"#, slug, slug))
        .collect();
    format!(
        r#"<html><body><a href="/">Home</a><div>{}</div>{}<a href="/about">About</a></body></html>"#,
        banner, links
    )
}

/// Builds a detail page body
pub fn poem_body(title: &str, author: &str, text: &str) -> String {
    format!(
        r#"<html><head><title>Public Domain Poetry - {title}</title></head><body>
        <font class="t0">{title}</font>
        <font class="t1">by <a href="/poets/{author}">{author}</a></font>
        <font class="t3a">{text}</font>
        </body></html>"#
    )
}

/// Mounts the listing root (page 1)
pub async fn mount_root(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/listpoetry.php"))
        .and(query_param("letter", "All"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts listing page `page` (> 1); must be mounted before the root
pub async fn mount_listing_page(server: &MockServer, page: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/listpoetry.php"))
        .and(query_param("page", page.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts a detail page
pub async fn mount_poem(server: &MockServer, slug: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", slug)))
        .respond_with(response)
        .mount(server)
        .await;
}

fn ok_poem(title: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(poem_body(title, "Poet", "first line<br>second line"))
}

#[tokio::test]
async fn test_ids_are_contiguous_across_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing_page(
        &server,
        2,
        ResponseTemplate::new(200).set_body_string(listing_body(
            "(2 Pages, 2 Poems Shown)",
            &["poet-b/poem-three", "poet-b/poem-four"],
        )),
    )
    .await;
    mount_root(
        &server,
        listing_body(
            "(2 Pages, 2 Poems Shown)",
            &["poet-a/poem-one", "poet-a/poem-two"],
        ),
    )
    .await;
    for (slug, title) in [
        ("poet-a/poem-one", "One"),
        ("poet-a/poem-two", "Two"),
        ("poet-b/poem-three", "Three"),
        ("poet-b/poem-four", "Four"),
    ] {
        mount_poem(&server, slug, ok_poem(title)).await;
    }

    let config = create_test_config(&server.uri(), &dir, 0);
    let summary = harvest(config.clone(), false).await.expect("Harvest failed");

    let records = read_dataset(&config);
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(titles, vec!["One", "Two", "Three", "Four"]);
    assert_eq!(records[0].author, "Poet");
    assert_eq!(records[0].text, "first line\nsecond line");

    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.pages_completed, 2);
    assert_eq!(summary.records_harvested, 4);
    assert_eq!(read_checkpoint(&config), Checkpoint::new(2, 5));
}

#[tokio::test]
async fn test_failed_link_does_not_consume_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(
        &server,
        listing_body(
            "(1 Pages, 3 Poems Shown)",
            &["poet-a/first-poem", "poet-a/broken-poem", "poet-a/third-poem"],
        ),
    )
    .await;
    mount_poem(&server, "poet-a/first-poem", ok_poem("First")).await;
    mount_poem(&server, "poet-a/broken-poem", ResponseTemplate::new(500)).await;
    mount_poem(&server, "poet-a/third-poem", ok_poem("Third")).await;

    let config = create_test_config(&server.uri(), &dir, 0);
    let summary = harvest(config.clone(), false).await.expect("Harvest failed");

    let records = read_dataset(&config);
    assert_eq!(records.len(), 2);
    assert_eq!((records[0].id, records[0].title.as_str()), (1, "First"));
    assert_eq!((records[1].id, records[1].title.as_str()), (2, "Third"));

    assert_eq!(summary.links_skipped, 1);
    assert_eq!(read_checkpoint(&config), Checkpoint::new(1, 3));
}

#[tokio::test]
async fn test_unreachable_detail_link_is_skipped_without_consuming_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Bind then drop a listener to get a port nothing is serving on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let closed = format!("http://127.0.0.1:{}/poet-a/lost-poem", port);
    drop(listener);

    mount_root(
        &server,
        listing_body(
            "(1 Pages)",
            &["poet-a/first-poem", closed.as_str(), "poet-a/third-poem"],
        ),
    )
    .await;
    mount_poem(&server, "poet-a/first-poem", ok_poem("First")).await;
    mount_poem(&server, "poet-a/third-poem", ok_poem("Third")).await;

    let config = create_test_config(&server.uri(), &dir, 0);
    let checkpoints = JsonCheckpointStore::new(Path::new(&config.output.checkpoint_path));
    let mut harvester = Harvester::new(config.clone(), Box::new(checkpoints))
        .unwrap()
        .with_link_filter(Box::new(|link: &str| link.contains("-poem")));

    let mut items = Vec::new();
    while let Some(item) = harvester.next_record().await.unwrap() {
        items.push(item);
    }

    assert_eq!(items.len(), 3);
    assert!(matches!(&items[0], Harvested::Record(r) if r.id == 1 && r.title == "First"));
    match &items[1] {
        Harvested::Skipped(failure) => {
            assert_eq!(failure.link, closed);
            assert_eq!(failure.page, 1);
            assert!(matches!(failure.error, HarvestError::Http { .. }));
        }
        other => panic!("expected a skipped link, got {:?}", other),
    }
    assert!(matches!(&items[2], Harvested::Record(r) if r.id == 2 && r.title == "Third"));

    assert_eq!(harvester.summary().links_skipped, 1);
    assert_eq!(read_checkpoint(&config), Checkpoint::new(1, 3));
}

#[tokio::test]
async fn test_degenerate_pagination_harvests_one_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/listpoetry.php"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_root(
        &server,
        listing_body("Poems starting with All", &["poet-a/lonely-poem"]),
    )
    .await;
    mount_poem(&server, "poet-a/lonely-poem", ok_poem("Lonely")).await;

    let config = create_test_config(&server.uri(), &dir, 0);
    let summary = harvest(config.clone(), false).await.expect("Harvest failed");

    assert_eq!(summary.total_pages, 1);
    assert_eq!(summary.pages_completed, 1);
    assert_eq!(read_dataset(&config).len(), 1);
    assert_eq!(read_checkpoint(&config), Checkpoint::new(1, 2));
}

#[tokio::test]
async fn test_page_count_from_numeric_links() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    for page in 2..=3 {
        mount_listing_page(
            &server,
            page,
            ResponseTemplate::new(200).set_body_string(listing_body("", &[])),
        )
        .await;
    }
    mount_root(
        &server,
        r#"<html><body>
            <a href="poet-a/only-poem">Only</a>
            <a href="listpoetry.php?letter=All&amp;page=2">2</a>
            <a href="listpoetry.php?letter=All&amp;page=3">3</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_poem(&server, "poet-a/only-poem", ok_poem("Only")).await;

    let config = create_test_config(&server.uri(), &dir, 0);
    let summary = harvest(config.clone(), false).await.expect("Harvest failed");

    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.pages_completed, 3);
    assert_eq!(summary.records_harvested, 1);
    assert_eq!(read_checkpoint(&config), Checkpoint::new(3, 2));
}

#[tokio::test]
async fn test_missing_fields_use_defaults() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(
        &server,
        listing_body("(1 Pages)", &["poet-a/bare-poem", "poet-a/empty-poem"]),
    )
    .await;
    mount_poem(
        &server,
        "poet-a/bare-poem",
        ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Public Domain Poetry - Ode</title></head><body></body></html>",
        ),
    )
    .await;
    mount_poem(
        &server,
        "poet-a/empty-poem",
        ResponseTemplate::new(200).set_body_string("<html><body></body></html>"),
    )
    .await;

    let config = create_test_config(&server.uri(), &dir, 0);
    harvest(config.clone(), false).await.expect("Harvest failed");

    let records = read_dataset(&config);
    assert_eq!(
        records,
        vec![
            PoemRecord {
                id: 1,
                title: "Ode".to_string(),
                author: String::new(),
                text: String::new(),
            },
            PoemRecord {
                id: 2,
                title: "No Title".to_string(),
                author: String::new(),
                text: String::new(),
            },
        ]
    );
}

#[tokio::test]
async fn test_duplicate_links_are_each_harvested() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(
        &server,
        listing_body("(1 Pages)", &["poet-a/echo-poem", "poet-a/echo-poem"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/poet-a/echo-poem"))
        .respond_with(ok_poem("Echo"))
        .expect(2)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir, 0);
    harvest(config.clone(), false).await.expect("Harvest failed");

    let ids: Vec<u64> = read_dataset(&config).iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    server.verify().await;
}

#[tokio::test]
async fn test_unreachable_listing_root_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/listpoetry.php"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir, 0);
    let result = harvest(config.clone(), false).await;

    assert!(result.is_err());
    assert!(read_dataset(&config).is_empty());
    assert!(!Path::new(&config.output.checkpoint_path).exists());
}

#[tokio::test]
async fn test_rate_limit_spaces_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(
        &server,
        listing_body("(1 Pages)", &["poet-a/slow-one", "poet-a/slow-two"]),
    )
    .await;
    mount_poem(&server, "poet-a/slow-one", ok_poem("Slow One")).await;
    mount_poem(&server, "poet-a/slow-two", ResponseTemplate::new(404)).await;

    // Sleeps after discovery, after each detail attempt and after the page
    let config = create_test_config(&server.uri(), &dir, 50);
    let start = Instant::now();
    harvest(config.clone(), false).await.expect("Harvest failed");

    assert!(start.elapsed() >= Duration::from_millis(200));
    assert_eq!(read_dataset(&config).len(), 1);
}

#[tokio::test]
async fn test_fresh_discards_checkpoint_but_keeps_dataset() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, listing_body("(1 Pages)", &["poet-a/again-poem"])).await;
    mount_poem(&server, "poet-a/again-poem", ok_poem("Again")).await;

    let config = create_test_config(&server.uri(), &dir, 0);
    harvest(config.clone(), false).await.expect("First harvest failed");
    assert_eq!(read_checkpoint(&config), Checkpoint::new(1, 2));

    // A plain rerun has nothing left to do
    let summary = harvest(config.clone(), false).await.expect("Rerun failed");
    assert_eq!(summary.records_harvested, 0);
    assert_eq!(read_dataset(&config).len(), 1);

    let summary = harvest(config.clone(), true).await.expect("Fresh harvest failed");
    assert_eq!(summary.records_harvested, 1);
    let ids: Vec<u64> = read_dataset(&config).iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 1]);
    assert_eq!(read_checkpoint(&config), Checkpoint::new(1, 2));
}
