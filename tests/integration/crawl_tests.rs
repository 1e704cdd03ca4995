//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a miniature browse-by-letter site and
//! test letter discovery, detail fan-out, CSV output and letter isolation
//! end-to-end.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use urban_scraper::config::{Config, CrawlerConfig, OutputConfig, SiteConfig};
use urban_scraper::crawler::{Fetcher, LetterCrawler, LetterOutcome, LetterSummary, Orchestrator};
use urban_scraper::output::ProgressReporter;
use urban_scraper::site::{Letter, ListingPageRef};
use urban_scraper::state::LetterState;
use urban_scraper::storage::CsvStore;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches listing requests without a page number (the unsuffixed first page)
struct FirstPage;

impl Match for FirstPage {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "page")
    }
}

/// Records every progress event for later assertions
#[derive(Default)]
struct RecordingProgress {
    started: Vec<char>,
    discovered: Vec<(char, usize, usize)>,
    pages: Vec<(char, usize, usize, usize)>,
    finished: Vec<(char, bool)>,
}

impl ProgressReporter for RecordingProgress {
    fn letter_started(&mut self, letter: Letter, _index: usize, _of: usize) {
        self.started.push(letter.as_char());
    }

    fn pages_discovered(&mut self, letter: Letter, scheduled: usize, total: usize) {
        self.discovered.push((letter.as_char(), scheduled, total));
    }

    fn page_finished(
        &mut self,
        letter: Letter,
        page: &ListingPageRef,
        written: usize,
        dropped: usize,
    ) {
        self.pages.push((letter.as_char(), page.position, written, dropped));
    }

    fn letter_finished(&mut self, summary: &LetterSummary) {
        self.finished.push((summary.letter.as_char(), summary.outcome.is_completed()));
    }
}

/// Creates a test configuration pointed at the mock server with tiny delays
fn create_test_config(origin: &str, data_dir: &Path) -> Config {
    Config {
        site: SiteConfig {
            origin: origin.to_string(),
            ..SiteConfig::default()
        },
        crawler: CrawlerConfig {
            max_workers: 4,
            request_delay_ms: 0,
            retry_backoff_ms: 10,
            max_attempts: 3,
            page_cooldown_ms: 0,
            max_listing_pages: 100,
        },
        output: OutputConfig {
            data_dir: data_dir.to_path_buf(),
        },
    }
}

fn letter(c: char) -> Letter {
    Letter::new(c).unwrap()
}

fn word_links(terms: &[&str]) -> String {
    terms
        .iter()
        .map(|t| format!(r#"<li><a href="/define.php?term={t}">{t}</a></li>"#))
        .collect()
}

/// A listing page with a pagination control and a word column
fn listing_html(letter: char, min: u32, max: u32, terms: &[&str]) -> String {
    let links = word_links(terms);
    format!(
        r#"<html><body>
        <div id="columnist"><ul>{links}</ul></div>
        <div class="pagination-centered">
            <a href="/browse.php?character={letter}&amp;page={min}">First</a>
            <a href="/browse.php?character={letter}&amp;page={max}">Last</a>
        </div>
        </body></html>"#
    )
}

/// A listing page with only a word column
fn plain_listing_html(terms: &[&str]) -> String {
    format!(
        r#"<html><body><div id="columnist"><ul>{}</ul></div></body></html>"#,
        word_links(terms)
    )
}

fn detail_html(term: &str) -> String {
    format!(
        r#"<html><body>
        <div class="def-header"><a href="/define.php?term={term}">{term}</a></div>
        <div class="meaning">Meaning of {term}<br>continued</div>
        <div class="example">Using {term}
in a sentence</div>
        </body></html>"#
    )
}

async fn mount_first_page(server: &MockServer, letter: char, body: String) {
    Mock::given(method("GET"))
        .and(path("/browse.php"))
        .and(query_param("character", letter.to_string()))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, letter: char, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/browse.php"))
        .and(query_param("character", letter.to_string()))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, term: &str) {
    Mock::given(method("GET"))
        .and(path("/define.php"))
        .and(query_param("term", term))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html(term)))
        .mount(server)
        .await;
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open CSV");
    reader
        .records()
        .map(|r| r.expect("Bad CSV row").iter().map(String::from).collect())
        .collect()
}

fn build_crawler(config: &Arc<Config>, c: char) -> LetterCrawler {
    let fetcher = Arc::new(Fetcher::from_config(config).expect("Failed to build fetcher"));
    LetterCrawler::new(letter(c), Arc::clone(config), fetcher).expect("Failed to build crawler")
}

#[tokio::test]
async fn test_letter_o_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(&mock_server, 'O', listing_html('O', 1, 1, &["ok", "omg", "oof"])).await;
    mount_page(&mock_server, 'O', 1, plain_listing_html(&["oops", "ouch"])).await;
    for term in ["ok", "omg", "oof", "oops", "ouch"] {
        mount_detail(&mock_server, term).await;
    }

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut crawler = build_crawler(&config, 'O');

    // Discovery yields the unsuffixed first page plus page 1
    let pages = crawler.discover_listing_pages().await.expect("Discovery failed");
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].url, format!("{}/browse.php?character=O", base_url));
    assert_eq!(pages[1].url, format!("{}/browse.php?character=O&page=1", base_url));

    // The first listing page's batch has one record per detail link
    let batch = crawler
        .process_listing_page(&pages[0])
        .await
        .expect("Listing page failed");
    assert_eq!(batch.records.len(), 3);
    assert_eq!(batch.dropped, 0);
    for record in &batch.records {
        assert_eq!(record.letter, letter('O'));
        assert_eq!(record.source_listing_url, pages[0].url);
    }

    let mut words: Vec<&str> = batch.records.iter().map(|r| r.word.as_str()).collect();
    words.sort();
    assert_eq!(words, vec!["ok", "omg", "oof"]);

    let ok = batch.records.iter().find(|r| r.word == "ok").unwrap();
    assert_eq!(ok.detail_url, format!("{}/define.php?term=ok", base_url));
    assert_eq!(ok.definition, "Meaning of ok continued");
    assert_eq!(ok.example, "Using ok in a sentence");
}

#[tokio::test]
async fn test_full_run_writes_csv() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(&mock_server, 'O', listing_html('O', 1, 1, &["ok", "omg", "oof"])).await;
    mount_page(&mock_server, 'O', 1, plain_listing_html(&["oops", "ouch"])).await;
    for term in ["ok", "omg", "oof", "oops", "ouch"] {
        mount_detail(&mock_server, term).await;
    }

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut crawler = build_crawler(&config, 'O');
    let mut store = CsvStore::new(tmp.path());
    let mut progress = RecordingProgress::default();

    let summary = crawler.run(&mut store, None, &mut progress).await;

    assert_eq!(summary.outcome, LetterOutcome::Completed);
    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.pages_processed, 2);
    assert_eq!(summary.records_written, 5);
    assert_eq!(summary.records_dropped, 0);
    assert_eq!(crawler.state(), LetterState::Done);

    let csv_path = tmp.path().join("character_O").join("urban_data_O.csv");
    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 5);
    for row in &rows {
        assert_eq!(row.len(), 6);
        assert_eq!(row[0], "O");
    }

    // Rows from the second listing page point back at it
    let page_one = format!("{}/browse.php?character=O&page=1", base_url);
    let from_page_one = rows.iter().filter(|r| r[1] == page_one).count();
    assert_eq!(from_page_one, 2);

    assert_eq!(progress.discovered, vec![('O', 2, 2)]);
    assert_eq!(progress.pages, vec![('O', 1, 3, 0), ('O', 2, 2, 0)]);
}

#[tokio::test]
async fn test_failed_details_are_dropped_and_counted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(
        &mock_server,
        'B',
        listing_html('B', 1, 1, &["bae", "bruh", "broken", "bounced"]),
    )
    .await;
    mount_detail(&mock_server, "bae").await;
    mount_detail(&mock_server, "bruh").await;

    // Detail page without the example region
    Mock::given(method("GET"))
        .and(path("/define.php"))
        .and(query_param("term", "broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="def-header">broken</div><div class="meaning">m</div>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/define.php"))
        .and(query_param("term", "bounced"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut crawler = build_crawler(&config, 'B');

    let pages = crawler.discover_listing_pages().await.expect("Discovery failed");
    let batch = crawler
        .process_listing_page(&pages[0])
        .await
        .expect("Listing page failed");

    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.dropped, 2);

    let mut words: Vec<&str> = batch.records.iter().map(|r| r.word.as_str()).collect();
    words.sort();
    assert_eq!(words, vec!["bae", "bruh"]);
}

#[tokio::test]
async fn test_batch_independent_of_completion_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    let terms = ["slow", "medium", "fast"];
    mount_first_page(&mock_server, 'S', listing_html('S', 1, 1, &terms)).await;

    for (term, delay_ms) in [("slow", 300), ("medium", 150), ("fast", 0)] {
        Mock::given(method("GET"))
            .and(path("/define.php"))
            .and(query_param("term", term))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_html(term))
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(&mock_server)
            .await;
    }

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut crawler = build_crawler(&config, 'S');

    let pages = crawler.discover_listing_pages().await.expect("Discovery failed");
    let batch = crawler
        .process_listing_page(&pages[0])
        .await
        .expect("Listing page failed");

    let mut words: Vec<String> = batch.records.iter().map(|r| r.word.clone()).collect();
    words.sort();
    assert_eq!(words, vec!["fast", "medium", "slow"]);
}

#[tokio::test]
async fn test_resume_skips_earlier_listing_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    // Four listing pages: first, 1, 2, 3
    mount_first_page(&mock_server, 'R', listing_html('R', 1, 3, &["r0"])).await;

    Mock::given(method("GET"))
        .and(path("/browse.php"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_listing_html(&["r1"])))
        .expect(0)
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, 'R', 2, plain_listing_html(&["r2"])).await;
    mount_page(&mock_server, 'R', 3, plain_listing_html(&["r3a", "r3b"])).await;
    for term in ["r2", "r3a", "r3b"] {
        mount_detail(&mock_server, term).await;
    }

    Mock::given(method("GET"))
        .and(path("/define.php"))
        .and(query_param("term", "r0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html("r0")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut crawler = build_crawler(&config, 'R');
    let mut store = CsvStore::new(tmp.path());
    let mut progress = RecordingProgress::default();

    let summary = crawler.run(&mut store, Some(3), &mut progress).await;

    assert_eq!(summary.outcome, LetterOutcome::Completed);
    assert_eq!(summary.total_pages, 4);
    assert_eq!(summary.pages_scheduled, 2);
    assert_eq!(summary.pages_processed, 2);
    assert_eq!(summary.records_written, 3);

    let positions: Vec<usize> = progress.pages.iter().map(|p| p.1).collect();
    assert_eq!(positions, vec![3, 4]);
}

#[tokio::test]
async fn test_resume_past_end_does_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(&mock_server, 'E', listing_html('E', 1, 1, &["e"])).await;

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut crawler = build_crawler(&config, 'E');
    let mut store = CsvStore::new(tmp.path());
    let mut progress = RecordingProgress::default();

    let summary = crawler.run(&mut store, Some(10), &mut progress).await;

    assert_eq!(summary.outcome, LetterOutcome::Completed);
    assert_eq!(summary.pages_processed, 0);
    assert_eq!(crawler.state(), LetterState::Done);
    assert!(!store.data_file(letter('E')).exists());
}

#[tokio::test]
async fn test_missing_pagination_aborts_letter() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(
        &mock_server,
        'P',
        "<html><body><h1>Please slow down</h1></body></html>".to_string(),
    )
    .await;

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut crawler = build_crawler(&config, 'P');
    let mut store = CsvStore::new(tmp.path());
    let mut progress = RecordingProgress::default();

    let summary = crawler.run(&mut store, None, &mut progress).await;

    assert!(matches!(summary.outcome, LetterOutcome::Aborted { .. }));
    assert_eq!(summary.pages_processed, 0);
    assert_eq!(crawler.state(), LetterState::Aborted);
    assert!(!store.letter_dir(letter('P')).exists());
}

#[tokio::test]
async fn test_listing_failure_keeps_written_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(&mock_server, 'L', listing_html('L', 1, 2, &["lol"])).await;
    mount_detail(&mock_server, "lol").await;

    Mock::given(method("GET"))
        .and(path("/browse.php"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    // Never reached once page 1 fails
    Mock::given(method("GET"))
        .and(path("/browse.php"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_listing_html(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut crawler = build_crawler(&config, 'L');
    let mut store = CsvStore::new(tmp.path());
    let mut progress = RecordingProgress::default();

    let summary = crawler.run(&mut store, None, &mut progress).await;

    assert!(matches!(summary.outcome, LetterOutcome::Aborted { .. }));
    assert_eq!(summary.pages_processed, 1);
    assert_eq!(summary.records_written, 1);

    let rows = read_rows(&store.data_file(letter('L')));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][3], "lol");
}

#[tokio::test]
async fn test_discovery_recovers_from_transient_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/browse.php"))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_first_page(&mock_server, 'T', listing_html('T', 1, 1, &[])).await;
    mount_page(&mock_server, 'T', 1, plain_listing_html(&[])).await;

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut crawler = build_crawler(&config, 'T');
    let mut store = CsvStore::new(tmp.path());
    let mut progress = RecordingProgress::default();

    let summary = crawler.run(&mut store, None, &mut progress).await;

    assert_eq!(summary.outcome, LetterOutcome::Completed);
    assert_eq!(summary.pages_processed, 2);
    assert_eq!(summary.records_written, 0);
}

#[tokio::test]
async fn test_orchestrator_isolates_letters() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    // A has no pagination control, B and C are healthy
    mount_first_page(&mock_server, 'A', "<html><body></body></html>".to_string()).await;
    mount_first_page(&mock_server, 'B', listing_html('B', 1, 1, &["bae"])).await;
    mount_page(&mock_server, 'B', 1, plain_listing_html(&["bruh"])).await;
    mount_first_page(&mock_server, 'C', listing_html('C', 1, 1, &["cap"])).await;
    mount_page(&mock_server, 'C', 1, plain_listing_html(&[])).await;
    for term in ["bae", "bruh", "cap"] {
        mount_detail(&mock_server, term).await;
    }

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let fetcher = Arc::new(Fetcher::from_config(&config).expect("Failed to build fetcher"));
    let mut orchestrator =
        Orchestrator::with_parts(Arc::clone(&config), fetcher, CsvStore::new(tmp.path()));
    let mut progress = RecordingProgress::default();

    let letters = Letter::range(letter('A'), letter('C')).unwrap();
    let report = orchestrator.run(&letters, None, &mut progress).await;

    assert_eq!(report.letters.len(), 3);
    assert!(!report.all_completed());
    let aborted: Vec<char> = report.aborted().map(|l| l.letter.as_char()).collect();
    assert_eq!(aborted, vec!['A']);
    assert_eq!(report.total_records(), 3);
    assert!(report.finished_at.is_some());

    assert_eq!(progress.started, vec!['A', 'B', 'C']);
    assert_eq!(progress.finished, vec![('A', false), ('B', true), ('C', true)]);

    let store = orchestrator.store();
    assert_eq!(read_rows(&store.data_file(letter('B'))).len(), 2);
    assert_eq!(read_rows(&store.data_file(letter('C'))).len(), 1);
    assert!(!store.data_file(letter('A')).exists());
}

#[tokio::test]
async fn test_orchestrator_resume_applies_to_first_letter_only() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(&mock_server, 'M', listing_html('M', 1, 1, &["meh"])).await;
    mount_page(&mock_server, 'M', 1, plain_listing_html(&["mid"])).await;
    mount_first_page(&mock_server, 'N', listing_html('N', 1, 1, &["nah"])).await;
    mount_page(&mock_server, 'N', 1, plain_listing_html(&["nope"])).await;
    for term in ["meh", "mid", "nah", "nope"] {
        mount_detail(&mock_server, term).await;
    }

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let fetcher = Arc::new(Fetcher::from_config(&config).expect("Failed to build fetcher"));
    let mut orchestrator =
        Orchestrator::with_parts(Arc::clone(&config), fetcher, CsvStore::new(tmp.path()));
    let mut progress = RecordingProgress::default();

    let letters = Letter::range(letter('M'), letter('N')).unwrap();
    let report = orchestrator.run(&letters, Some(2), &mut progress).await;

    assert!(report.all_completed());
    assert_eq!(report.letters[0].pages_processed, 1);
    assert_eq!(report.letters[0].records_written, 1);
    assert_eq!(report.letters[1].pages_processed, 2);
    assert_eq!(report.letters[1].records_written, 2);
    assert_eq!(progress.discovered, vec![('M', 1, 2), ('N', 2, 2)]);
}

#[tokio::test]
async fn test_restart_without_resume_duplicates_rows() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(&mock_server, 'D', listing_html('D', 1, 1, &["dope"])).await;
    mount_page(&mock_server, 'D', 1, plain_listing_html(&[])).await;
    mount_detail(&mock_server, "dope").await;

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut store = CsvStore::new(tmp.path());

    for _ in 0..2 {
        let mut crawler = build_crawler(&config, 'D');
        let mut progress = RecordingProgress::default();
        let summary = crawler.run(&mut store, None, &mut progress).await;
        assert_eq!(summary.outcome, LetterOutcome::Completed);
    }

    let rows = read_rows(&store.data_file(letter('D')));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], rows[1]);
}

#[tokio::test]
async fn test_cooldown_between_listing_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(&mock_server, 'W', listing_html('W', 1, 2, &[])).await;
    mount_page(&mock_server, 'W', 1, plain_listing_html(&[])).await;
    mount_page(&mock_server, 'W', 2, plain_listing_html(&[])).await;

    let mut config = create_test_config(&base_url, tmp.path());
    config.crawler.page_cooldown_ms = 100;
    let config = Arc::new(config);
    let mut crawler = build_crawler(&config, 'W');
    let mut store = CsvStore::new(tmp.path());
    let mut progress = RecordingProgress::default();

    let started = Instant::now();
    let summary = crawler.run(&mut store, None, &mut progress).await;

    // Three listing pages, two pauses between them
    assert_eq!(summary.pages_processed, 3);
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_cooldown_between_letters() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    // Neither letter gets past discovery, so only the pause between letters remains
    mount_first_page(&mock_server, 'X', "<html></html>".to_string()).await;
    mount_first_page(&mock_server, 'Y', "<html></html>".to_string()).await;

    let mut config = create_test_config(&base_url, tmp.path());
    config.crawler.page_cooldown_ms = 150;
    let config = Arc::new(config);
    let fetcher = Arc::new(Fetcher::from_config(&config).expect("Failed to build fetcher"));
    let mut orchestrator =
        Orchestrator::with_parts(Arc::clone(&config), fetcher, CsvStore::new(tmp.path()));
    let mut progress = RecordingProgress::default();

    let letters = Letter::range(letter('X'), letter('Y')).unwrap();
    let started = Instant::now();
    let report = orchestrator.run(&letters, None, &mut progress).await;

    assert_eq!(report.aborted().count(), 2);
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_storage_failure_aborts_only_that_letter() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(&mock_server, 'F', listing_html('F', 1, 1, &["fam"])).await;
    mount_page(&mock_server, 'F', 1, plain_listing_html(&[])).await;
    mount_first_page(&mock_server, 'G', listing_html('G', 1, 1, &["goat"])).await;
    mount_page(&mock_server, 'G', 1, plain_listing_html(&[])).await;
    mount_detail(&mock_server, "fam").await;
    mount_detail(&mock_server, "goat").await;

    // A plain file where F's directory should go
    std::fs::write(tmp.path().join("character_F"), "in the way").unwrap();

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let fetcher = Arc::new(Fetcher::from_config(&config).expect("Failed to build fetcher"));
    let mut orchestrator =
        Orchestrator::with_parts(Arc::clone(&config), fetcher, CsvStore::new(tmp.path()));
    let mut progress = RecordingProgress::default();

    let letters = Letter::range(letter('F'), letter('G')).unwrap();
    let report = orchestrator.run(&letters, None, &mut progress).await;

    let f = &report.letters[0];
    assert!(matches!(f.outcome, LetterOutcome::Aborted { .. }));
    assert_eq!(f.pages_processed, 0);
    assert_eq!(f.records_written, 0);

    let g = &report.letters[1];
    assert_eq!(g.outcome, LetterOutcome::Completed);
    assert_eq!(g.records_written, 1);

    let rows = read_rows(&orchestrator.store().data_file(letter('G')));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][3], "goat");
}

#[tokio::test]
async fn test_oversized_pagination_aborts_letter() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_first_page(&mock_server, 'H', listing_html('H', 1, u32::MAX, &["huh"])).await;

    Mock::given(method("GET"))
        .and(path("/browse.php"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_listing_html(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Arc::new(create_test_config(&base_url, tmp.path()));
    let mut crawler = build_crawler(&config, 'H');
    let mut store = CsvStore::new(tmp.path());
    let mut progress = RecordingProgress::default();

    let summary = crawler.run(&mut store, None, &mut progress).await;

    match &summary.outcome {
        LetterOutcome::Aborted { reason } => assert!(reason.contains("limit of 100")),
        other => panic!("expected aborted letter, got {}", other),
    }
    assert_eq!(summary.total_pages, 0);
    assert_eq!(crawler.state(), LetterState::Aborted);
    assert!(progress.discovered.is_empty());
}
