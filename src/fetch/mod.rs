pub mod browser;
pub mod http;

use async_trait::async_trait;
use url::Url;

use crate::error::{FetchError, ScrapeError};
use crate::extract::{Page, PageExtractor};

/// Retrieves raw markup for a URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// How pages are retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Static HTTP fetch only, no script execution
    Html,
    /// Rendered fetch through a headless browser only
    Selenium,
    /// Static first; rendered retry when the static pass fails or comes back
    /// with too few records
    Smart,
}

/// The fetch strategies available to one scrape run, plus the mode policy
/// that picks between them per page.
pub struct FetcherSet {
    mode: FetchMode,
    smart_min_records: usize,
    static_fetch: Box<dyn Fetch>,
    rendered_fetch: Option<Box<dyn Fetch>>,
}

impl FetcherSet {
    pub fn new(
        mode: FetchMode,
        smart_min_records: usize,
        static_fetch: Box<dyn Fetch>,
        rendered_fetch: Option<Box<dyn Fetch>>,
    ) -> Self {
        Self {
            mode,
            smart_min_records,
            static_fetch,
            rendered_fetch,
        }
    }

    /// Build the production pairing from configuration.
    pub fn from_config(
        mode: FetchMode,
        config: &crate::config::ScoutConfig,
    ) -> Result<Self, FetchError> {
        let static_fetch = http::HttpFetcher::new(config.fetch_timeout())?;
        let rendered_fetch =
            browser::BrowserFetcher::new(&config.webdriver_url, config.settle_delay());
        Ok(Self::new(
            mode,
            config.smart_min_records,
            Box::new(static_fetch),
            Some(Box::new(rendered_fetch)),
        ))
    }

    /// Fetch one page and run the extractor over it, honoring the mode policy.
    pub async fn fetch_page(
        &self,
        url: &Url,
        extractor: &dyn PageExtractor,
    ) -> Result<Page, ScrapeError> {
        match self.mode {
            FetchMode::Html => self.static_pass(url, extractor).await,
            FetchMode::Selenium => self.rendered_pass(url, extractor).await,
            FetchMode::Smart => self.smart_pass(url, extractor).await,
        }
    }

    async fn static_pass(
        &self,
        url: &Url,
        extractor: &dyn PageExtractor,
    ) -> Result<Page, ScrapeError> {
        let html = self.static_fetch.fetch(url.as_str()).await?;
        Ok(extractor.extract(&html, url)?)
    }

    async fn rendered_pass(
        &self,
        url: &Url,
        extractor: &dyn PageExtractor,
    ) -> Result<Page, ScrapeError> {
        let rendered = self
            .rendered_fetch
            .as_ref()
            .ok_or(ScrapeError::Fetch(FetchError::RenderedUnavailable))?;
        let html = rendered.fetch(url.as_str()).await?;
        Ok(extractor.extract(&html, url)?)
    }

    /// Static first; rendered retry on failure or thin results.
    ///
    /// The empty-result trigger is a heuristic: a page that legitimately has
    /// no matching records still costs one rendered fetch.
    async fn smart_pass(
        &self,
        url: &Url,
        extractor: &dyn PageExtractor,
    ) -> Result<Page, ScrapeError> {
        let static_outcome = self.static_pass(url, extractor).await;
        match &static_outcome {
            Ok(page) if page.records.len() >= self.smart_min_records => return static_outcome,
            Ok(page) => ::log::info!(
                "static fetch of {} yielded {} records, trying rendered fetch",
                url,
                page.records.len()
            ),
            Err(e) => {
                ::log::warn!("static fetch of {} failed ({}), trying rendered fetch", url, e)
            }
        }

        if self.rendered_fetch.is_none() {
            // No browser configured: the static outcome is all we have
            return static_outcome;
        }

        match self.rendered_pass(url, extractor).await {
            Ok(page) => Ok(page),
            Err(e) => match static_outcome {
                // Thin static results beat a rendered failure
                Ok(page) => {
                    ::log::warn!(
                        "rendered fetch of {} failed ({}), keeping static results",
                        url,
                        e
                    );
                    Ok(page)
                }
                Err(_) => Err(e),
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::FixtureFetcher;
    use super::*;
    use crate::extract::links::LinkHeuristic;

    const EMPTY_PAGE: &str = "<html><body><p>nothing here</p></body></html>";
    const LINK_PAGE: &str = concat!(
        "<html><body>",
        r#"<a href="/a">Breaking news about the harbor expansion</a>"#,
        "</body></html>"
    );

    fn url() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[tokio::test]
    async fn html_mode_never_touches_rendered_fetcher() {
        let static_fetch = FixtureFetcher::new(&[("https://example.com/", EMPTY_PAGE)]);
        let rendered = FixtureFetcher::new(&[("https://example.com/", LINK_PAGE)]);
        let set = FetcherSet::new(
            FetchMode::Html,
            1,
            Box::new(static_fetch),
            Some(Box::new(rendered)),
        );

        let page = set.fetch_page(&url(), &LinkHeuristic).await.unwrap();
        assert!(page.records.is_empty());
    }

    #[tokio::test]
    async fn smart_mode_falls_back_on_zero_records() {
        let static_fetch = FixtureFetcher::new(&[("https://example.com/", EMPTY_PAGE)]);
        let rendered = FixtureFetcher::new(&[("https://example.com/", LINK_PAGE)]);
        let set = FetcherSet::new(
            FetchMode::Smart,
            1,
            Box::new(static_fetch),
            Some(Box::new(rendered)),
        );

        let page = set.fetch_page(&url(), &LinkHeuristic).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(
            page.records[0].get("text"),
            Some("Breaking news about the harbor expansion")
        );
    }

    #[tokio::test]
    async fn smart_mode_skips_rendered_when_static_is_enough() {
        let static_fetch = FixtureFetcher::new(&[("https://example.com/", LINK_PAGE)]);
        // Rendered fetcher knows no pages; touching it would error
        let rendered = FixtureFetcher::new(&[]);
        let set = FetcherSet::new(
            FetchMode::Smart,
            1,
            Box::new(static_fetch),
            Some(Box::new(rendered)),
        );

        let page = set.fetch_page(&url(), &LinkHeuristic).await.unwrap();
        assert_eq!(page.records.len(), 1);
    }

    #[tokio::test]
    async fn smart_mode_keeps_static_results_when_rendered_fails() {
        let static_fetch = FixtureFetcher::new(&[("https://example.com/", EMPTY_PAGE)]);
        let rendered = FixtureFetcher::new(&[]);
        let set = FetcherSet::new(
            FetchMode::Smart,
            1,
            Box::new(static_fetch),
            Some(Box::new(rendered)),
        );

        let page = set.fetch_page(&url(), &LinkHeuristic).await.unwrap();
        assert!(page.records.is_empty());
    }

    #[tokio::test]
    async fn selenium_mode_without_webdriver_is_an_error() {
        let static_fetch = FixtureFetcher::new(&[("https://example.com/", LINK_PAGE)]);
        let set = FetcherSet::new(FetchMode::Selenium, 1, Box::new(static_fetch), None);

        let err = set.fetch_page(&url(), &LinkHeuristic).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Fetch(FetchError::RenderedUnavailable)
        ));
    }
}
