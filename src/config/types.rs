use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Urban-Scraper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site layout and client identity
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host every relative link is resolved against
    pub origin: String,

    /// Path of the browse-by-letter endpoint
    #[serde(rename = "browse-path")]
    pub browse_path: String,

    /// Query parameter carrying the letter
    #[serde(rename = "letter-param")]
    pub letter_param: String,

    /// Query parameter carrying the listing page number
    #[serde(rename = "page-param")]
    pub page_param: String,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://www.urbandictionary.com".to_string(),
            browse_path: "/browse.php".to_string(),
            letter_param: "character".to_string(),
            page_param: "page".to_string(),
            user_agent: "Mozilla".to_string(),
        }
    }
}

/// Crawler pacing and concurrency configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Upper bound on concurrent detail-page fetches per listing page
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// Pause after every successful fetch (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Pause before retrying a transient failure (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Total attempts per URL, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Pause between listing pages and between letters (milliseconds)
    #[serde(rename = "page-cooldown-ms")]
    pub page_cooldown_ms: u64,

    /// Largest numbered page range a letter's pagination may report
    #[serde(rename = "max-listing-pages")]
    pub max_listing_pages: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_workers: 50,
            request_delay_ms: 250,
            retry_backoff_ms: 60_000,
            max_attempts: 3,
            page_cooldown_ms: 1_500,
            max_listing_pages: 10_000,
        }
    }
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn page_cooldown(&self) -> Duration {
        Duration::from_millis(self.page_cooldown_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory holding one `character_<L>` directory per letter
    #[serde(rename = "data-dir")]
    pub data_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}
