//! Site addressing for the browse-by-letter dictionary
//!
//! This module knows how the target site is laid out:
//! - `Letter`: the crawl partition key and letter ranges
//! - Listing page URLs for a letter and their pagination positions
//! - Resolution of links and page numbers found in fetched HTML

mod letter;
mod listing;

pub use letter::Letter;
pub use listing::{
    first_page_url, listing_pages, page_number, resolve_link, ListingPageRef, PageRange,
};
