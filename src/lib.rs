//! Urban-Scraper: a polite letter-by-letter dictionary harvester
//!
//! This crate crawls a dictionary site's browse-by-letter listing pages, fans out
//! over every word detail page on each listing page, and appends the extracted
//! records to per-letter CSV files so partial progress survives an interruption.

pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Urban-Scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Letter error: {0}")]
    Letter(#[from] LetterError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::LetterState,
        to: state::LetterState,
    },

    #[error("Resume page must be 1 or greater, got {0}")]
    InvalidResumeOffset(usize),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failure to retrieve a page
///
/// `Transient` is only ever seen inside the retry loop; callers of
/// [`crawler::Fetcher::fetch`] receive `Permanent` once the attempt cap is spent
/// or the failure cannot be helped by retrying.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transient failure fetching {url} on attempt {attempt}: {reason}")]
    Transient {
        url: String,
        attempt: u32,
        reason: String,
    },

    #[error("Gave up on {url} after {attempts} attempt(s): {reason}")]
    Permanent {
        url: String,
        attempts: u32,
        reason: String,
    },
}

impl FetchError {
    /// Returns true if another attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Transient { url, .. } | Self::Permanent { url, .. } => url,
        }
    }
}

/// An expected structural region was missing or malformed
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No element matches selector '{selector}' on {page} page")]
    MissingRegion {
        page: crawler::PageKind,
        selector: &'static str,
    },

    #[error("Pagination needs at least two page links, found {found}")]
    NotEnoughPageLinks { found: usize },

    #[error("Could not read page number from link '{href}'")]
    BadPageNumber { href: String },

    #[error("Pagination range is inverted: {min} > {max}")]
    InvertedRange { min: u32, max: u32 },

    #[error("Pagination reports {pages} pages, more than the limit of {limit}")]
    TooManyPages { pages: usize, limit: usize },

    #[error("Invalid selector '{0}'")]
    Selector(&'static str),
}

/// Invalid letter or letter range
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LetterError {
    #[error("'{0}' is not an ASCII letter")]
    NotAlphabetic(char),

    #[error("Expected a single letter, got '{0}'")]
    NotSingleChar(String),

    #[error("Letter range is inverted: {start} > {end}")]
    InvertedRange { start: char, end: char },
}

/// Result type alias for Urban-Scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use site::{Letter, ListingPageRef};
pub use state::LetterState;
pub use storage::Record;
