use scraper::{Html, Selector};
use url::Url;

use super::{Page, PageExtractor, element_text, next_cursor, resolve};
use crate::error::ExtractError;
use crate::records::Record;

/// Extractor for the books.toscrape.com catalogue structure.
///
/// Fields: title, price, availability, link. The catalogue has no author or
/// tag fields, so filters do not apply here.
pub struct BooksExtractor;

impl PageExtractor for BooksExtractor {
    fn extract(&self, html: &str, page_url: &Url) -> Result<Page, ExtractError> {
        let doc = Html::parse_document(html);
        let book_selector = Selector::parse("article.product_pod").unwrap();
        let title_selector = Selector::parse("h3 > a").unwrap();
        let price_selector = Selector::parse("p.price_color").unwrap();
        let availability_selector = Selector::parse("p.instock.availability").unwrap();

        let mut records = Vec::new();
        for book in doc.select(&book_selector) {
            let title_anchor = book
                .select(&title_selector)
                .next()
                .ok_or(ExtractError::MissingElement("h3 > a"))?;
            let title = title_anchor
                .value()
                .attr("title")
                .ok_or(ExtractError::MissingAttr("h3 > a[title]"))?;
            let price = book
                .select(&price_selector)
                .next()
                .map(element_text)
                .ok_or(ExtractError::MissingElement("p.price_color"))?;
            let availability = book
                .select(&availability_selector)
                .next()
                .map(element_text)
                .ok_or(ExtractError::MissingElement("p.instock.availability"))?;
            let link = title_anchor
                .value()
                .attr("href")
                .map(|href| resolve(page_url, href))
                .unwrap_or_else(|| page_url.as_str().to_string());

            let mut record = Record::new();
            record.push("title", title);
            record.push("price", price);
            record.push("availability", availability);
            record.push("link", link);
            records.push(record);
        }

        let next = next_cursor(&doc, page_url);
        Ok(Page { records, next })
    }
}
