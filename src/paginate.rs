use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::ScrapeError;
use crate::extract::PageExtractor;
use crate::fetch::FetcherSet;
use crate::records::Harvest;

/// Drive an extractor across a paginated source until exhaustion.
///
/// Termination is guaranteed three ways: the source running out of "next"
/// links, the `max_pages` ceiling, and cursor-repeat detection for sources
/// whose pagination is cyclic or malformed. Records are accumulated in page
/// order; within a page, document order.
///
/// A failure on the first page propagates. A failure after at least one
/// successful page stops the loop and returns the records gathered so far
/// with `complete` set to false, never silently truncating. Cancellation is
/// honored between page fetches.
pub async fn paginate(
    fetchers: &FetcherSet,
    extractor: &dyn PageExtractor,
    start_url: &str,
    max_pages: usize,
    cancel: &CancellationToken,
) -> Result<Harvest, ScrapeError> {
    let mut url = parse_url(start_url)?;
    let mut visited: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    let mut pages = 0usize;
    let mut complete = true;

    loop {
        if cancel.is_cancelled() {
            ::log::info!("pagination cancelled after {} pages", pages);
            complete = false;
            break;
        }
        if pages >= max_pages {
            ::log::warn!("stopping at page ceiling ({} pages)", max_pages);
            complete = false;
            break;
        }
        if !visited.insert(url.as_str().to_string()) {
            ::log::warn!("pagination cycle detected at {}", url);
            complete = false;
            break;
        }

        let page = match fetchers.fetch_page(&url, extractor).await {
            Ok(page) => page,
            Err(e) if pages == 0 => return Err(e),
            Err(e) => {
                ::log::warn!("stopping after {} pages, next page failed: {}", pages, e);
                complete = false;
                break;
            }
        };

        pages += 1;
        ::log::debug!("page {} ({}) yielded {} records", pages, url, page.records.len());
        records.extend(page.records);

        match page.next {
            Some(next) => match Url::parse(&next) {
                Ok(next_url) => url = next_url,
                Err(e) => {
                    ::log::warn!("unusable next cursor {:?}: {}", next, e);
                    complete = false;
                    break;
                }
            },
            None => break,
        }
    }

    ::log::info!(
        "pagination finished: {} records over {} pages (complete: {})",
        records.len(),
        pages,
        complete
    );
    Ok(Harvest {
        records,
        pages,
        complete,
    })
}

fn parse_url(raw: &str) -> Result<Url, ScrapeError> {
    Url::parse(raw).map_err(|e| ScrapeError::InvalidUrl {
        url: raw.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testutil::FixtureFetcher;
    use crate::filter::RecordFilter;
    use crate::extract::quotes::QuotesExtractor;

    fn quote_page(author: &str, next: Option<&str>) -> String {
        let pager = next
            .map(|href| format!(r#"<ul class="pager"><li class="next"><a href="{href}">Next</a></li></ul>"#))
            .unwrap_or_default();
        format!(
            r#"<div class="quote">
                <span class="text">&#8220;Words.&#8221;</span>
                <small class="author">{author}</small>
                <a class="tag" href="/t/">misc</a>
            </div>{pager}"#
        )
    }

    fn extractor() -> QuotesExtractor {
        QuotesExtractor::new(RecordFilter::default())
    }

    #[tokio::test]
    async fn follows_cursors_until_terminal_page() {
        let (p1, p2, p3) = (
            quote_page("First", Some("/page/2/")),
            quote_page("Second", Some("/page/3/")),
            quote_page("Third", None),
        );
        let fetchers = FixtureFetcher::new(&[
            ("https://q.test/page/1/", p1.as_str()),
            ("https://q.test/page/2/", p2.as_str()),
            ("https://q.test/page/3/", p3.as_str()),
        ])
        .into_set();

        let harvest = paginate(
            &fetchers,
            &extractor(),
            "https://q.test/page/1/",
            50,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(harvest.complete);
        assert_eq!(harvest.pages, 3);
        let authors: Vec<_> = harvest
            .records
            .iter()
            .map(|r| r.get("author").unwrap())
            .collect();
        assert_eq!(authors, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn page_ceiling_bounds_the_loop() {
        // Every page points at the next one forever
        let (p1, p2) = (
            quote_page("A", Some("/page/2/")),
            quote_page("B", Some("/page/1/")),
        );
        let fetchers = FixtureFetcher::new(&[
            ("https://q.test/page/1/", p1.as_str()),
            ("https://q.test/page/2/", p2.as_str()),
        ])
        .into_set();

        let harvest = paginate(
            &fetchers,
            &extractor(),
            "https://q.test/page/1/",
            1,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(!harvest.complete);
        assert_eq!(harvest.pages, 1);
    }

    #[tokio::test]
    async fn cyclic_cursor_is_detected() {
        let (p1, p2) = (
            quote_page("A", Some("/page/2/")),
            quote_page("B", Some("/page/1/")),
        );
        let fetchers = FixtureFetcher::new(&[
            ("https://q.test/page/1/", p1.as_str()),
            ("https://q.test/page/2/", p2.as_str()),
        ])
        .into_set();

        let harvest = paginate(
            &fetchers,
            &extractor(),
            "https://q.test/page/1/",
            50,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(!harvest.complete);
        assert_eq!(harvest.pages, 2);
        assert_eq!(harvest.records.len(), 2);
    }

    #[tokio::test]
    async fn first_page_failure_propagates() {
        let fetchers = FixtureFetcher::new(&[]).into_set();
        let result = paginate(
            &fetchers,
            &extractor(),
            "https://q.test/page/1/",
            50,
            &CancellationToken::new(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn later_page_failure_returns_partial_harvest() {
        let p1 = quote_page("Only", Some("/page/2/"));
        let fetchers =
            FixtureFetcher::new(&[("https://q.test/page/1/", p1.as_str())]).into_set();

        let harvest = paginate(
            &fetchers,
            &extractor(),
            "https://q.test/page/1/",
            50,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(!harvest.complete);
        assert_eq!(harvest.pages, 1);
        assert_eq!(harvest.records.len(), 1);
    }

    #[tokio::test]
    async fn pre_cancelled_token_stops_before_any_fetch() {
        let p1 = quote_page("Never", None);
        let fetchers =
            FixtureFetcher::new(&[("https://q.test/page/1/", p1.as_str())]).into_set();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let harvest = paginate(&fetchers, &extractor(), "https://q.test/page/1/", 50, &cancel)
            .await
            .unwrap();

        assert!(!harvest.complete);
        assert_eq!(harvest.pages, 0);
        assert!(harvest.records.is_empty());
    }

    #[tokio::test]
    async fn invalid_start_url_is_an_error() {
        let fetchers = FixtureFetcher::new(&[]).into_set();
        let result = paginate(
            &fetchers,
            &extractor(),
            "not a url",
            50,
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(ScrapeError::InvalidUrl { .. })));
    }
}
