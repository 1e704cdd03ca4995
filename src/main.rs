//! Urban-Scraper main entry point
//!
//! This is the command-line interface for the letter-by-letter dictionary harvester.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use urban_scraper::config::{load_config_with_hash, validate, Config};
use urban_scraper::crawler::crawl;
use urban_scraper::output::{print_report, BarProgress, LogProgress, ProgressReporter};
use urban_scraper::site::{first_page_url, Letter};

/// Urban-Scraper: a polite letter-by-letter dictionary harvester
///
/// Crawls the browse-by-letter listing pages of the site, fetches every word's
/// detail page and appends word, definition and example to one CSV file per
/// letter. Interrupted crawls can be restarted from a listing page with
/// --resume-page.
#[derive(Parser, Debug)]
#[command(name = "urban-scraper")]
#[command(version = "1.0.0")]
#[command(about = "A polite letter-by-letter dictionary harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Crawl a single letter
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    letter: Option<Letter>,

    /// First letter of an inclusive range
    #[arg(long, requires = "to")]
    from: Option<Letter>,

    /// Last letter of an inclusive range
    #[arg(long, requires = "from")]
    to: Option<Letter>,

    /// 1-based listing page to resume the first letter from
    #[arg(short, long, value_name = "PAGE", value_parser = clap::value_parser!(u64).range(1..))]
    resume_page: Option<u64>,

    /// Override the output directory from the configuration
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log progress instead of drawing a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Show the resolved configuration and letters without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(dir) = &cli.data_dir {
        config.output.data_dir = dir.clone();
        validate(&config)?;
    }

    let letters = select_letters(&cli)?;
    let resume = cli.resume_page.map(|page| page as usize);

    if cli.dry_run {
        handle_dry_run(&config, &letters, resume);
        return Ok(());
    }

    handle_crawl(config, &letters, resume, cli.quiet || cli.no_progress).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("urban_scraper=info,warn"),
            1 => EnvFilter::new("urban_scraper=debug,info"),
            2 => EnvFilter::new("urban_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves --letter / --from --to into the letters to crawl, `O` by default
fn select_letters(cli: &Cli) -> Result<Vec<Letter>, Box<dyn std::error::Error>> {
    match (cli.letter, cli.from, cli.to) {
        (Some(letter), _, _) => Ok(vec![letter]),
        (None, Some(from), Some(to)) => Ok(Letter::range(from, to)?),
        _ => {
            let default = Letter::new('O')?;
            Ok(vec![default])
        }
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, letters: &[Letter], resume: Option<usize>) {
    println!("=== Urban-Scraper Dry Run ===\n");

    println!("Site:");
    println!("  Origin: {}", config.site.origin);
    println!("  User agent: {}", config.site.user_agent);

    println!("\nCrawler Configuration:");
    println!("  Max workers per listing page: {}", config.crawler.max_workers);
    println!("  Delay after each fetch: {}ms", config.crawler.request_delay_ms);
    println!(
        "  Retries: {} attempts, {}ms backoff",
        config.crawler.max_attempts, config.crawler.retry_backoff_ms
    );
    println!(
        "  Cooldown between listing pages: {}ms",
        config.crawler.page_cooldown_ms
    );
    println!("  Max listing pages per letter: {}", config.crawler.max_listing_pages);

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir.display());

    println!("\nLetters ({}):", letters.len());
    for (index, letter) in letters.iter().enumerate() {
        println!("  - {} {}", letter, first_page_url(&config.site, *letter));
        if index == 0 {
            if let Some(page) = resume {
                println!("    * resuming from listing page {}", page);
            }
        }
    }
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    letters: &[Letter],
    resume: Option<usize>,
    plain_progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling {} letter(s) into {}",
        letters.len(),
        config.output.data_dir.display()
    );

    let mut progress: Box<dyn ProgressReporter> = if plain_progress {
        Box::new(LogProgress)
    } else {
        Box::new(BarProgress::new())
    };

    let report = crawl(config, letters, resume, progress.as_mut()).await?;
    print_report(&report);

    let aborted = report.aborted().count();
    if aborted > 0 {
        tracing::error!("{} letter(s) aborted", aborted);
        return Err(format!("{} of {} letter(s) aborted", aborted, letters.len()).into());
    }

    tracing::info!("Crawl completed successfully");
    Ok(())
}
