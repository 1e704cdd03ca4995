//! HTML parser for the three page kinds the crawler reads
//!
//! This module extracts:
//! - Pagination bounds from the first listing page of a letter
//! - Detail page links from a listing page
//! - The word, definition and example from a detail page
//!
//! A missing region means the layout changed or the server answered with an
//! error or interstitial page; each case is reported as a [`ParseError`].

use crate::site::{page_number, resolve_link, PageRange};
use crate::ParseError;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use url::Url;

const PAGINATION_REGION: &str = "div.pagination-centered";
const LISTING_REGION: &str = "div#columnist";
const LINK: &str = "a";
const WORD_REGION: &str = "div.def-header";
const MEANING_REGION: &str = "div.meaning";
const EXAMPLE_REGION: &str = "div.example";

/// Which kind of page a parse was attempted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// First listing page of a letter, read for its pagination control
    ListingIndex,
    /// A listing page, read for its detail links
    Listing,
    /// A word's detail page
    Detail,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ListingIndex => "listing index",
            Self::Listing => "listing",
            Self::Detail => "detail",
        };
        write!(f, "{}", name)
    }
}

/// The three text fields of a detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFields {
    pub word: String,
    pub definition: String,
    pub example: String,
}

/// Reads the numbered page range from a letter's first listing page
///
/// The last two links of the pagination control point at the first and last
/// numbered pages.
///
/// # Example
///
/// ```
/// use urban_scraper::crawler::parse_pagination;
/// use url::Url;
///
/// let html = r#"<div class="pagination-centered">
///     <a href="/browse.php?character=O&page=1">1</a>
///     <a href="/browse.php?character=O&page=42">Last</a>
/// </div>"#;
/// let base = Url::parse("https://www.urbandictionary.com").unwrap();
/// let range = parse_pagination(html, &base, "page").unwrap();
/// assert_eq!((range.min(), range.max()), (1, 42));
/// ```
pub fn parse_pagination(
    html: &str,
    base: &Url,
    page_param: &str,
) -> Result<PageRange, ParseError> {
    let document = Html::parse_document(html);
    let region = select_region(&document, PAGINATION_REGION, PageKind::ListingIndex)?;

    let link_selector = selector(LINK)?;
    let links: Vec<ElementRef> = region.select(&link_selector).collect();
    if links.len() < 2 {
        return Err(ParseError::NotEnoughPageLinks { found: links.len() });
    }

    let page_of = |link: &ElementRef| {
        let href = link.value().attr("href").unwrap_or_default();
        page_number(base, href, page_param).ok_or_else(|| ParseError::BadPageNumber {
            href: href.to_string(),
        })
    };

    let min = page_of(&links[links.len() - 2])?;
    let max = page_of(&links[links.len() - 1])?;
    PageRange::new(min, max)
}

/// Collects every detail link in a listing page's word column, in page order
///
/// Relative links are resolved against `base`. An empty column is not an
/// error; a missing column is.
pub fn parse_listing_links(html: &str, base: &Url) -> Result<Vec<String>, ParseError> {
    let document = Html::parse_document(html);
    let region = select_region(&document, LISTING_REGION, PageKind::Listing)?;

    let link_selector = selector(LINK)?;
    Ok(region
        .select(&link_selector)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .collect())
}

/// Extracts the word, definition and example from a detail page
///
/// Line breaks inside each region become single spaces and surrounding
/// whitespace is trimmed.
pub fn parse_detail_record(html: &str) -> Result<DetailFields, ParseError> {
    let document = Html::parse_document(html);

    let word = select_region(&document, WORD_REGION, PageKind::Detail)?;
    let meaning = select_region(&document, MEANING_REGION, PageKind::Detail)?;
    let example = select_region(&document, EXAMPLE_REGION, PageKind::Detail)?;

    Ok(DetailFields {
        word: visible_text(word),
        definition: visible_text(meaning),
        example: visible_text(example),
    })
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css))
}

/// Returns the first element matching `css`
fn select_region<'a>(
    document: &'a Html,
    css: &'static str,
    page: PageKind,
) -> Result<ElementRef<'a>, ParseError> {
    let region_selector = selector(css)?;
    document
        .select(&region_selector)
        .next()
        .ok_or(ParseError::MissingRegion {
            page,
            selector: css,
        })
}

/// Joins an element's text nodes line by line with single spaces
fn visible_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(|text| text.split('\n'))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
