//! Crawler module for harvesting dictionary records
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a fixed delay and bounded retries
//! - HTML parsing of listing and detail pages
//! - The per-letter state machine with bounded detail fan-out
//! - Orchestration across a range of letters

mod fetcher;
mod letter;
mod orchestrator;
mod parser;

pub use fetcher::{build_http_client, Fetcher, RetryPolicy};
pub use letter::{resume_from, Batch, LetterCrawler, LetterOutcome, LetterSummary};
pub use orchestrator::{crawl, Orchestrator};
pub use parser::{
    parse_detail_record, parse_listing_links, parse_pagination, DetailFields, PageKind,
};
