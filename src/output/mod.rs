//! Output module for reporting crawl progress and results
//!
//! This module handles:
//! - Progress reporting while letters and listing pages are processed
//! - The end-of-run report summarising every letter's outcome

mod progress;
pub mod stats;

pub use progress::{BarProgress, LogProgress, ProgressReporter};
pub use stats::{print_report, CrawlReport};
