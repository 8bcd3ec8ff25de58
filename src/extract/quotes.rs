use scraper::{Html, Selector};
use url::Url;

use super::{Page, PageExtractor, element_text, next_cursor};
use crate::error::ExtractError;
use crate::filter::RecordFilter;
use crate::records::Record;

/// Extractor for the quotes.toscrape.com page structure.
///
/// Fields: quote, author, tags (joined ", "), link. Author/tag filters are
/// applied here, while the tag set is still a set.
pub struct QuotesExtractor {
    filter: RecordFilter,
}

impl QuotesExtractor {
    pub fn new(filter: RecordFilter) -> Self {
        Self { filter }
    }
}

impl PageExtractor for QuotesExtractor {
    fn extract(&self, html: &str, page_url: &Url) -> Result<Page, ExtractError> {
        let doc = Html::parse_document(html);
        let quote_selector = Selector::parse("div.quote").unwrap();
        let text_selector = Selector::parse("span.text").unwrap();
        let author_selector = Selector::parse("small.author").unwrap();
        let tag_selector = Selector::parse("a.tag").unwrap();

        let mut records = Vec::new();
        for quote in doc.select(&quote_selector) {
            let text = quote
                .select(&text_selector)
                .next()
                .map(element_text)
                .ok_or(ExtractError::MissingElement("span.text"))?;
            let author = quote
                .select(&author_selector)
                .next()
                .map(element_text)
                .ok_or(ExtractError::MissingElement("small.author"))?;
            let tags: Vec<String> = quote.select(&tag_selector).map(element_text).collect();

            if !self.filter.matches_author(&author) {
                continue;
            }
            if !self.filter.matches_tags(&tags) {
                continue;
            }

            let mut record = Record::new();
            record.push("quote", text);
            record.push("author", author);
            record.push("tags", tags.join(", "));
            record.push("link", page_url.as_str());
            records.push(record);
        }

        let next = next_cursor(&doc, page_url);
        Ok(Page { records, next })
    }
}
