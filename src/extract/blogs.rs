use scraper::{Html, Selector};
use url::Url;

use super::{Page, PageExtractor, element_text, resolve};
use crate::error::ExtractError;
use crate::records::Record;

/// Extractor for the python.org blog listing.
///
/// Fields: title, link, date. The listing is a single page; there is no
/// pagination cursor.
pub struct BlogsExtractor;

impl PageExtractor for BlogsExtractor {
    fn extract(&self, html: &str, page_url: &Url) -> Result<Page, ExtractError> {
        let doc = Html::parse_document(html);
        let post_selector = Selector::parse("ul.list-recent-posts li").unwrap();
        let anchor_selector = Selector::parse("a").unwrap();
        let time_selector = Selector::parse("time").unwrap();

        let mut records = Vec::new();
        for post in doc.select(&post_selector) {
            let anchor = post
                .select(&anchor_selector)
                .next()
                .ok_or(ExtractError::MissingElement("li > a"))?;
            let href = anchor
                .value()
                .attr("href")
                .ok_or(ExtractError::MissingAttr("a[href]"))?;
            let date = post
                .select(&time_selector)
                .next()
                .map(element_text)
                .ok_or(ExtractError::MissingElement("time"))?;

            let mut record = Record::new();
            record.push("title", element_text(anchor));
            record.push("link", resolve(page_url, href));
            record.push("date", date);
            records.push(record);
        }

        Ok(Page::terminal(records))
    }
}
