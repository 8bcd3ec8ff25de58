use scraper::{Html, Selector};
use url::Url;

use super::{Page, PageExtractor, element_text, resolve};
use crate::error::ExtractError;
use crate::records::Record;

/// Keywords whose presence in anchor text marks it as a probable content link
const CONTENT_KEYWORDS: [&str; 5] = ["headline", "story", "news", "article", "update"];

/// Anchor text longer than this many words counts as content on its own
const MIN_CONTENT_WORDS: usize = 5;

/// Generic fallback extractor: walks every anchor on the page and keeps the
/// ones that look like content links.
///
/// An anchor is kept iff its visible text and href are both non-empty, and
/// either a keyword matches (case-insensitive substring) or the text runs
/// longer than five words. Never paginates.
pub struct LinkHeuristic;

impl LinkHeuristic {
    fn matched_keyword(text: &str) -> Option<&'static str> {
        let lower = text.to_lowercase();
        CONTENT_KEYWORDS.iter().copied().find(|kw| lower.contains(kw))
    }

    fn is_content_link(text: &str) -> bool {
        Self::matched_keyword(text).is_some()
            || text.split_whitespace().count() > MIN_CONTENT_WORDS
    }
}

impl PageExtractor for LinkHeuristic {
    fn extract(&self, html: &str, page_url: &Url) -> Result<Page, ExtractError> {
        let doc = Html::parse_document(html);
        let anchor_selector = Selector::parse("a").unwrap();

        let mut records = Vec::new();
        for anchor in doc.select(&anchor_selector) {
            let text = element_text(anchor);
            let href = anchor.value().attr("href").unwrap_or_default();
            if text.is_empty() || href.is_empty() {
                continue;
            }
            if !Self::is_content_link(&text) {
                continue;
            }

            let mut record = Record::new();
            record.push("tag", Self::matched_keyword(&text).unwrap_or_default());
            record.push("text", text);
            record.push("link", resolve(page_url, href));
            records.push(record);
        }

        ::log::debug!("link heuristic kept {} anchors from {}", records.len(), page_url);
        Ok(Page::terminal(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Vec<Record> {
        let url = Url::parse("https://news.example.com/front").unwrap();
        LinkHeuristic.extract(html, &url).unwrap().records
    }

    #[test]
    fn keyword_anchor_is_kept() {
        let records = extract(r#"<a href="/x">Top Story</a>"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("tag"), Some("story"));
        assert_eq!(records[0].get("text"), Some("Top Story"));
        assert_eq!(records[0].get("link"), Some("https://news.example.com/x"));
    }

    #[test]
    fn long_anchor_is_kept_without_keyword() {
        let records = extract(r#"<a href="/y">Council votes to expand the harbor ferry schedule</a>"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("tag"), Some(""));
    }

    #[test]
    fn short_keywordless_anchor_is_dropped() {
        assert!(extract(r#"<a href="/z">About us</a>"#).is_empty());
        // Exactly five words is still too short
        assert!(extract(r#"<a href="/z">one two three four five</a>"#).is_empty());
    }

    #[test]
    fn empty_text_or_href_is_dropped() {
        assert!(extract(r#"<a href="/x"></a>"#).is_empty());
        assert!(extract(r#"<a href="">Big news about the town hall fire</a>"#).is_empty());
        assert!(extract(r#"<a>Big news about the town hall fire</a>"#).is_empty());
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let records = extract(r#"<a href="/a">LATEST UPDATE</a>"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("tag"), Some("update"));
    }

    #[test]
    fn absolute_links_pass_through_unchanged() {
        let records = extract(r#"<a href="https://cdn.example.org/a">Breaking news from the coast</a>"#);
        assert_eq!(records[0].get("link"), Some("https://cdn.example.org/a"));
    }

    #[test]
    fn never_paginates() {
        let url = Url::parse("https://news.example.com/").unwrap();
        let page = LinkHeuristic
            .extract(r#"<li class="next"><a href="/page/2/">Next</a></li>"#, &url)
            .unwrap();
        assert!(page.next.is_none());
    }
}
