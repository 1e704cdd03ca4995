//! End-of-run crawl report
//!
//! This module aggregates per-letter summaries and prints them once the
//! orchestrator has gone through every letter.

use crate::crawler::{LetterOutcome, LetterSummary};
use chrono::{DateTime, Utc};

/// Outcome of a whole crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// One entry per letter, in crawl order
    pub letters: Vec<LetterSummary>,
}

impl CrawlReport {
    /// Creates an empty report stamped with the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            letters: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    pub fn total_records(&self) -> usize {
        self.letters.iter().map(|l| l.records_written).sum()
    }

    pub fn total_dropped(&self) -> usize {
        self.letters.iter().map(|l| l.records_dropped).sum()
    }

    pub fn total_pages(&self) -> usize {
        self.letters.iter().map(|l| l.pages_processed).sum()
    }

    /// Letters that ended in `Aborted`
    pub fn aborted(&self) -> impl Iterator<Item = &LetterSummary> {
        self.letters.iter().filter(|l| !l.outcome.is_completed())
    }

    pub fn all_completed(&self) -> bool {
        self.aborted().next().is_none()
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Letters: {}", report.letters.len());
    println!("  Listing pages processed: {}", report.total_pages());
    println!("  Records written: {}", report.total_records());
    println!("  Detail pages dropped: {}", report.total_dropped());
    if let Some(seconds) = report.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    println!("By Letter:");
    for summary in &report.letters {
        let marker = match summary.outcome {
            LetterOutcome::Completed => "✓",
            LetterOutcome::Aborted { .. } => "✗",
        };
        println!(
            "  {} {}: {}/{} pages (of {}), {} records, {} dropped",
            marker,
            summary.letter,
            summary.pages_processed,
            summary.pages_scheduled,
            summary.total_pages,
            summary.records_written,
            summary.records_dropped
        );
        if let LetterOutcome::Aborted { reason } = &summary.outcome {
            println!("      {}", reason);
        }
    }
    println!();

    // Share of attempted detail pages that made it into a batch
    let attempted = report.total_records() + report.total_dropped();
    let success_rate = if attempted > 0 {
        (report.total_records() as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} detail pages recorded)",
        success_rate,
        report.total_records(),
        attempted
    );
}
