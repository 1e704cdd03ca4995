//! Crawl orchestrator - drives letters one after another
//!
//! This module contains the top-level crawl loop:
//! - Building the shared fetcher from the configuration
//! - Running one `LetterCrawler` per letter, strictly in sequence
//! - Applying the resume offset to the first letter
//! - Keeping letters isolated so one aborted letter does not stop the rest
//! - Cooling down between letters as between listing pages
//! - Collecting per-letter summaries into a `CrawlReport`

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::letter::{LetterCrawler, LetterOutcome, LetterSummary};
use crate::output::{CrawlReport, ProgressReporter};
use crate::site::Letter;
use crate::storage::{CsvStore, RecordStore};
use crate::ScrapeError;
use std::sync::Arc;

/// Runs a sequence of letters against one site and one record store
pub struct Orchestrator<S: RecordStore> {
    config: Arc<Config>,
    fetcher: Arc<Fetcher>,
    store: S,
}

impl Orchestrator<CsvStore> {
    /// Creates an orchestrator writing CSV files under `config.output.data_dir`
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(ScrapeError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let fetcher = Fetcher::from_config(&config)?;
        let store = CsvStore::new(config.output.data_dir.clone());
        Ok(Self::with_parts(Arc::new(config), Arc::new(fetcher), store))
    }
}

impl<S: RecordStore> Orchestrator<S> {
    pub fn with_parts(config: Arc<Config>, fetcher: Arc<Fetcher>, store: S) -> Self {
        Self {
            config,
            fetcher,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Crawls every letter in order
    ///
    /// `resume` is a 1-based listing page position applied to the first letter
    /// only; later letters always start from their first page. A letter that
    /// aborts is reported and the next letter still runs after the usual
    /// page cooldown.
    pub async fn run(
        &mut self,
        letters: &[Letter],
        resume: Option<usize>,
        progress: &mut dyn ProgressReporter,
    ) -> CrawlReport {
        let mut report = CrawlReport::start();

        for (index, &letter) in letters.iter().enumerate() {
            tracing::info!("{}", "-".repeat(50));
            progress.letter_started(letter, index, letters.len());

            let offset = if index == 0 { resume } else { None };
            let summary = self.run_letter(letter, offset, progress).await;

            match &summary.outcome {
                LetterOutcome::Completed => {
                    tracing::info!("Success! Letter {} complete.", letter);
                }
                LetterOutcome::Aborted { reason } => {
                    tracing::error!("Letter {} aborted: {}", letter, reason);
                }
            }
            tracing::info!(
                "Progress: {} of {} letters done",
                index + 1,
                letters.len()
            );

            progress.letter_finished(&summary);
            report.letters.push(summary);

            if index + 1 < letters.len() {
                tokio::time::sleep(self.config.crawler.page_cooldown()).await;
            }
        }

        report.finish();
        report
    }

    async fn run_letter(
        &mut self,
        letter: Letter,
        resume: Option<usize>,
        progress: &mut dyn ProgressReporter,
    ) -> LetterSummary {
        match LetterCrawler::new(letter, Arc::clone(&self.config), Arc::clone(&self.fetcher)) {
            Ok(mut crawler) => crawler.run(&mut self.store, resume, progress).await,
            Err(e) => LetterSummary::aborted(letter, e.to_string()),
        }
    }
}

/// Crawls `letters` with the CSV store and the given progress sink
///
/// # Example
///
/// ```no_run
/// use urban_scraper::config::Config;
/// use urban_scraper::crawler::crawl;
/// use urban_scraper::output::LogProgress;
/// use urban_scraper::site::Letter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let letters = [Letter::new('O')?];
/// let report = crawl(Config::default(), &letters, None, &mut LogProgress).await?;
/// println!("{} records written", report.total_records());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: Config,
    letters: &[Letter],
    resume: Option<usize>,
    progress: &mut dyn ProgressReporter,
) -> Result<CrawlReport, ScrapeError> {
    let mut orchestrator = Orchestrator::new(config)?;
    Ok(orchestrator.run(letters, resume, progress).await)
}
