pub mod blogs;
pub mod books;
pub mod links;
pub mod quotes;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::ExtractError;
use crate::records::Record;

/// Everything extracted from a single page of markup.
#[derive(Debug)]
pub struct Page {
    /// Records in document order
    pub records: Vec<Record>,
    /// Absolute URL of the next page, when the source paginates
    pub next: Option<String>,
}

impl Page {
    /// A page with no continuation
    pub fn terminal(records: Vec<Record>) -> Self {
        Self {
            records,
            next: None,
        }
    }
}

/// Turns one page of markup into records plus an optional pagination cursor.
pub trait PageExtractor: Send + Sync {
    fn extract(&self, html: &str, page_url: &Url) -> Result<Page, ExtractError>;
}

/// Visible text of an element with whitespace collapsed
pub(crate) fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve an href against the page it appeared on
pub(crate) fn resolve(page_url: &Url, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    match page_url.join(href) {
        Ok(resolved) => resolved.into(),
        Err(_) => href.to_string(),
    }
}

/// Pagination cursor shared by the toscrape sites: `.next > a[href]`
pub(crate) fn next_cursor(doc: &Html, page_url: &Url) -> Option<String> {
    let next_selector = Selector::parse(".next > a").unwrap();
    doc.select(&next_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| resolve(page_url, href))
}
