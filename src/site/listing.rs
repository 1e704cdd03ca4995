use crate::config::SiteConfig;
use crate::site::Letter;
use crate::ParseError;
use url::Url;

/// One listing page in a letter's paginated sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPageRef {
    /// Absolute URL of the listing page
    pub url: String,

    /// 1-based position within the letter's full listing sequence
    pub position: usize,

    /// Page number carried in the query string (`None` for the unsuffixed first page)
    pub page: Option<u32>,
}

/// Inclusive bounds read from a letter's pagination control
///
/// Always satisfies `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    min: u32,
    max: u32,
}

impl PageRange {
    pub fn new(min: u32, max: u32) -> Result<Self, ParseError> {
        if min > max {
            return Err(ParseError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Number of numbered pages in the range
    pub fn page_count(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    /// Rejects a range with more than `limit` numbered pages
    pub fn limited_to(self, limit: usize) -> Result<Self, ParseError> {
        let pages = self.page_count();
        if pages > limit {
            return Err(ParseError::TooManyPages { pages, limit });
        }
        Ok(self)
    }
}

/// Builds the unsuffixed first listing page URL for a letter
///
/// # Example
///
/// ```
/// use urban_scraper::config::SiteConfig;
/// use urban_scraper::site::{first_page_url, Letter};
///
/// let url = first_page_url(&SiteConfig::default(), Letter::new('o').unwrap());
/// assert_eq!(url, "https://www.urbandictionary.com/browse.php?character=O");
/// ```
pub fn first_page_url(site: &SiteConfig, letter: Letter) -> String {
    format!(
        "{}{}?{}={}",
        site.origin.trim_end_matches('/'),
        site.browse_path,
        site.letter_param,
        letter
    )
}

/// Builds the full listing sequence: the first page followed by every numbered page
///
/// The result always has `1 + range.page_count()` entries and begins with `first_url`.
pub fn listing_pages(first_url: &str, page_param: &str, range: PageRange) -> Vec<ListingPageRef> {
    let mut pages = Vec::with_capacity(1 + range.page_count());
    pages.push(ListingPageRef {
        url: first_url.to_string(),
        position: 1,
        page: None,
    });

    for (offset, page) in (range.min..=range.max).enumerate() {
        pages.push(ListingPageRef {
            url: format!("{}&{}={}", first_url, page_param, page),
            position: offset + 2,
            page: Some(page),
        });
    }

    pages
}

/// Resolves a link href against the site origin
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only anchors
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

/// Reads the page number out of a pagination link
///
/// Looks up `page_param` in the query string first. Links that do not parse
/// as URLs fall back to the text after the last `=`.
pub fn page_number(base: &Url, href: &str, page_param: &str) -> Option<u32> {
    if let Ok(url) = base.join(href.trim()) {
        if let Some((_, value)) = url.query_pairs().find(|(key, _)| key == page_param) {
            return value.trim().parse().ok();
        }
    }

    href.rsplit('=').next()?.trim().parse().ok()
}
