//! Progress reporting sinks
//!
//! The orchestrator and letter crawler report through [`ProgressReporter`];
//! what the user sees is up to the implementation.

use crate::crawler::LetterSummary;
use crate::site::{Letter, ListingPageRef};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receives progress events from a crawl
///
/// Events for one letter arrive in order: `letter_started`, at most one
/// `pages_discovered`, one `page_finished` per listing page, `letter_finished`.
pub trait ProgressReporter: Send {
    /// A letter is about to be crawled; `index` is 0-based within `of` letters
    fn letter_started(&mut self, letter: Letter, index: usize, of: usize);

    /// Pagination was read; `scheduled` of `total` listing pages will be processed
    fn pages_discovered(&mut self, letter: Letter, scheduled: usize, total: usize);

    /// A listing page's batch was written
    fn page_finished(
        &mut self,
        letter: Letter,
        page: &ListingPageRef,
        written: usize,
        dropped: usize,
    );

    /// A letter reached `Done` or `Aborted`
    fn letter_finished(&mut self, summary: &LetterSummary);
}

/// Reports progress through `tracing` only
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn letter_started(&mut self, letter: Letter, index: usize, of: usize) {
        tracing::info!("Letter {} ({} of {})", letter, index + 1, of);
    }

    fn pages_discovered(&mut self, letter: Letter, scheduled: usize, total: usize) {
        tracing::info!(
            "Letter {} has {} listing pages, {} scheduled",
            letter,
            total,
            scheduled
        );
    }

    fn page_finished(
        &mut self,
        letter: Letter,
        page: &ListingPageRef,
        written: usize,
        dropped: usize,
    ) {
        tracing::info!(
            "Letter {} page {}: {} records written, {} dropped",
            letter,
            page.position,
            written,
            dropped
        );
    }

    fn letter_finished(&mut self, summary: &LetterSummary) {
        tracing::info!(
            "Letter {} finished ({}): {}/{} pages, {} records",
            summary.letter,
            summary.outcome,
            summary.pages_processed,
            summary.pages_scheduled,
            summary.records_written
        );
    }
}

/// Draws a terminal progress bar over the current letter's listing pages
pub struct BarProgress {
    bar: Option<ProgressBar>,
    letter_label: String,
}

impl BarProgress {
    pub fn new() -> Self {
        Self {
            bar: None,
            letter_label: String::new(),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{msg} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} pages ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarProgress {
    fn letter_started(&mut self, letter: Letter, index: usize, of: usize) {
        self.letter_label = format!("{} ({}/{})", letter, index + 1, of);
        tracing::debug!("Starting letter {}", self.letter_label);
    }

    fn pages_discovered(&mut self, _letter: Letter, scheduled: usize, _total: usize) {
        let target = ProgressDrawTarget::stderr();
        let bar = ProgressBar::with_draw_target(Some(scheduled as u64), target)
            .with_style(Self::style())
            .with_message(self.letter_label.clone());
        self.bar = Some(bar);
    }

    fn page_finished(
        &mut self,
        _letter: Letter,
        _page: &ListingPageRef,
        _written: usize,
        dropped: usize,
    ) {
        if let Some(bar) = &self.bar {
            if dropped > 0 {
                let label = &self.letter_label;
                bar.set_message(format!("{} [{} dropped on last page]", label, dropped));
            } else {
                bar.set_message(self.letter_label.clone());
            }
            bar.inc(1);
        }
    }

    fn letter_finished(&mut self, summary: &LetterSummary) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(format!("{} {}", self.letter_label, summary.outcome));
        }
    }
}
