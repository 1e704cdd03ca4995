//! Per-letter crawl state machine
//!
//! A [`LetterCrawler`] owns one letter's listing pages and detail URLs. It
//! discovers the listing sequence, then for each listing page collects the
//! detail links, fetches them on a bounded pool of tasks and hands the
//! resulting batch to a [`RecordStore`] before cooling down and moving on.

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{parse_detail_record, parse_listing_links, parse_pagination};
use crate::output::ProgressReporter;
use crate::site::{first_page_url, listing_pages, Letter, ListingPageRef};
use crate::state::LetterState;
use crate::storage::{Record, RecordStore};
use crate::ScrapeError;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Records produced from one listing page
#[derive(Debug, Clone)]
pub struct Batch {
    pub page: ListingPageRef,
    pub records: Vec<Record>,
    /// Detail URLs whose fetch or parse failed permanently
    pub dropped: usize,
}

/// How a letter's crawl ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LetterOutcome {
    Completed,
    Aborted { reason: String },
}

impl LetterOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for LetterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Aborted { reason } => write!(f, "aborted: {}", reason),
        }
    }
}

/// Counters for one letter's crawl
#[derive(Debug, Clone)]
pub struct LetterSummary {
    pub letter: Letter,
    /// Listing pages the site reports for this letter
    pub total_pages: usize,
    /// Listing pages left after applying the resume offset
    pub pages_scheduled: usize,
    pub pages_processed: usize,
    pub records_written: usize,
    pub records_dropped: usize,
    pub outcome: LetterOutcome,
}

impl LetterSummary {
    fn new(letter: Letter) -> Self {
        Self {
            letter,
            total_pages: 0,
            pages_scheduled: 0,
            pages_processed: 0,
            records_written: 0,
            records_dropped: 0,
            outcome: LetterOutcome::Completed,
        }
    }

    pub(crate) fn aborted(letter: Letter, reason: String) -> Self {
        Self {
            outcome: LetterOutcome::Aborted { reason },
            ..Self::new(letter)
        }
    }
}

/// Skips to a 1-based position in the listing sequence
///
/// `None` keeps every page. `Some(k)` keeps pages `k..=n`; a `k` past the end
/// leaves nothing to do.
///
/// # Example
///
/// ```
/// use urban_scraper::crawler::resume_from;
/// use urban_scraper::site::{listing_pages, PageRange};
///
/// let range = PageRange::new(1, 4).unwrap();
/// let pages = listing_pages("https://x.test/browse.php?character=O", "page", range);
/// let rest = resume_from(pages, Some(3)).unwrap();
/// assert_eq!(rest.len(), 3);
/// assert_eq!(rest[0].position, 3);
/// ```
pub fn resume_from(
    pages: Vec<ListingPageRef>,
    offset: Option<usize>,
) -> Result<Vec<ListingPageRef>, ScrapeError> {
    match offset {
        None => Ok(pages),
        Some(0) => Err(ScrapeError::InvalidResumeOffset(0)),
        Some(k) => {
            if k > pages.len() {
                tracing::warn!(
                    "Resume page {} is past the last listing page ({}), nothing to do",
                    k,
                    pages.len()
                );
            }
            Ok(pages.into_iter().skip(k - 1).collect())
        }
    }
}

/// Crawls every listing page of a single letter
pub struct LetterCrawler {
    letter: Letter,
    config: Arc<Config>,
    fetcher: Arc<Fetcher>,
    base: Url,
    state: LetterState,
}

impl LetterCrawler {
    /// Creates a crawler in the `Init` state
    pub fn new(
        letter: Letter,
        config: Arc<Config>,
        fetcher: Arc<Fetcher>,
    ) -> Result<Self, ScrapeError> {
        let base = Url::parse(&config.site.origin).map_err(|e| {
            let reason = format!("Invalid origin '{}': {}", config.site.origin, e);
            crate::ConfigError::InvalidUrl(reason)
        })?;

        Ok(Self {
            letter,
            config,
            fetcher,
            base,
            state: LetterState::Init,
        })
    }

    pub fn letter(&self) -> Letter {
        self.letter
    }

    pub fn state(&self) -> LetterState {
        self.state
    }

    fn transition(&mut self, next: LetterState) -> Result<(), ScrapeError> {
        if !self.state.can_transition_to(next) {
            return Err(ScrapeError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("Letter {}: {} -> {}", self.letter, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Fetches the letter's first page and builds the full listing sequence
    ///
    /// Any fetch or parse failure here is fatal for the letter; there is no
    /// usable partial listing set.
    pub async fn discover_listing_pages(&mut self) -> Result<Vec<ListingPageRef>, ScrapeError> {
        self.transition(LetterState::DiscoveringPagination)?;

        let first_url = first_page_url(&self.config.site, self.letter);
        let body = self.fetcher.fetch(&first_url).await?;
        let range = parse_pagination(&body, &self.base, &self.config.site.page_param)?
            .limited_to(self.config.crawler.max_listing_pages)?;

        let pages = listing_pages(&first_url, &self.config.site.page_param, range);
        tracing::info!("Letter {} has {} listing pages", self.letter, pages.len());
        Ok(pages)
    }

    /// Fetches a listing page and every detail page it links to
    ///
    /// Detail pages are fetched on up to `min(max_workers, links)` concurrent
    /// tasks. A detail page that fails permanently is left out of the batch
    /// and counted in [`Batch::dropped`]; its siblings are unaffected.
    pub async fn process_listing_page(
        &mut self,
        page: &ListingPageRef,
    ) -> Result<Batch, ScrapeError> {
        self.transition(LetterState::DiscoveringLinks)?;

        let body = self.fetcher.fetch(&page.url).await?;
        let detail_urls = parse_listing_links(&body, &self.base)?;
        tracing::debug!(
            "Listing page {} has {} detail links",
            page.url,
            detail_urls.len()
        );

        self.transition(LetterState::FetchingDetails)?;

        let workers = self.config.crawler.max_workers.min(detail_urls.len()).max(1);
        let total = detail_urls.len();

        let results: Vec<Option<Record>> = stream::iter(detail_urls)
            .map(|detail_url| {
                let fetcher = Arc::clone(&self.fetcher);
                let letter = self.letter;
                let source = page.url.clone();
                tokio::spawn(async move {
                    let result = fetch_record(&fetcher, letter, source, detail_url.clone()).await;
                    (detail_url, result)
                })
            })
            .buffer_unordered(workers)
            .map(|joined| match joined {
                Ok((_, Ok(record))) => Some(record),
                Ok((detail_url, Err(e))) => {
                    tracing::warn!("Dropping {}: {}", detail_url, e);
                    None
                }
                Err(e) => {
                    tracing::error!("Detail worker failed: {}", e);
                    None
                }
            })
            .collect()
            .await;

        let records: Vec<Record> = results.into_iter().flatten().collect();
        let dropped = total - records.len();

        Ok(Batch {
            page: page.clone(),
            records,
            dropped,
        })
    }

    /// Runs the letter to completion, writing one batch per listing page
    ///
    /// Never returns an error: discovery, listing and storage failures end
    /// the letter as [`LetterOutcome::Aborted`] with the counters reached so far.
    pub async fn run<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        resume: Option<usize>,
        progress: &mut dyn ProgressReporter,
    ) -> LetterSummary {
        let mut summary = LetterSummary::new(self.letter);

        if let Err(e) = self.crawl(store, resume, progress, &mut summary).await {
            tracing::error!("Letter {} aborted in state {}: {}", self.letter, self.state, e);
            if !self.state.is_terminal() {
                self.state = LetterState::Aborted;
            }
            summary.outcome = LetterOutcome::Aborted {
                reason: e.to_string(),
            };
        }

        summary
    }

    async fn crawl<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        resume: Option<usize>,
        progress: &mut dyn ProgressReporter,
        summary: &mut LetterSummary,
    ) -> Result<(), ScrapeError> {
        let pages = self.discover_listing_pages().await?;
        summary.total_pages = pages.len();

        let pages = resume_from(pages, resume)?;
        summary.pages_scheduled = pages.len();
        progress.pages_discovered(self.letter, summary.pages_scheduled, summary.total_pages);

        if let Some(first) = pages.first() {
            tracing::info!("Starting letter {} with {}", self.letter, first.url);
        }

        let cooldown = self.config.crawler.page_cooldown();
        for (index, page) in pages.iter().enumerate() {
            let batch = self.process_listing_page(page).await?;

            self.transition(LetterState::Writing)?;
            let written = store.append(self.letter, &batch.records)?;

            summary.pages_processed += 1;
            summary.records_written += written;
            summary.records_dropped += batch.dropped;
            if batch.dropped > 0 {
                tracing::warn!(
                    "Dropped {} of {} detail pages from {}",
                    batch.dropped,
                    batch.dropped + batch.records.len(),
                    batch.page.url
                );
            }
            progress.page_finished(self.letter, &batch.page, written, batch.dropped);

            if index + 1 < pages.len() {
                tokio::time::sleep(cooldown).await;
            }
        }

        self.transition(LetterState::Done)?;
        Ok(())
    }
}

/// Fetches and parses one detail page into a record
async fn fetch_record(
    fetcher: &Fetcher,
    letter: Letter,
    source_listing_url: String,
    detail_url: String,
) -> Result<Record, ScrapeError> {
    let body = fetcher.fetch(&detail_url).await?;
    let fields = parse_detail_record(&body)?;

    Ok(Record {
        letter,
        source_listing_url,
        detail_url,
        word: fields.word,
        definition: fields.definition,
        example: fields.example,
    })
}
