//! Configuration module for Urban-Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; an absent file or section falls back to the defaults
//! the scraper was originally tuned with.
//!
//! # Example
//!
//! ```no_run
//! use urban_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Detail workers per listing page: {}", config.crawler.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
