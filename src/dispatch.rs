use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::ScrapeError;
use crate::extract::blogs::BlogsExtractor;
use crate::extract::books::BooksExtractor;
use crate::extract::links::LinkHeuristic;
use crate::extract::quotes::QuotesExtractor;
use crate::fetch::FetcherSet;
use crate::filter::RecordFilter;
use crate::intent::FilterRecord;
use crate::paginate::paginate;
use crate::records::Harvest;

pub const QUOTES_START_URL: &str = "https://quotes.toscrape.com/page/1/";
pub const BOOKS_START_URL: &str = "https://books.toscrape.com/catalogue/page-1.html";
pub const BLOGS_URL: &str = "https://www.python.org/blogs/";

/// Find the first http(s) URL-shaped substring in free text
pub fn find_url(text: &str) -> Option<String> {
    let url_pattern = Regex::new(r"https?://\S+").unwrap();
    url_pattern.find(text).map(|m| m.as_str().to_string())
}

/// Registry lookup key from free text: host of the first URL, lower-cased.
///
/// "No URL at all" and "URL with no usable host" are both `NoDomainFound`;
/// whether that host is registered is a separate question answered by the
/// registry lookup.
pub fn domain_key(text: &str) -> Result<String, ScrapeError> {
    let raw = find_url(text).ok_or(ScrapeError::NoDomainFound)?;
    let url = Url::parse(&raw).map_err(|e| ScrapeError::InvalidUrl {
        url: raw.clone(),
        source: e,
    })?;
    url.host_str()
        .map(|host| host.to_lowercase())
        .ok_or(ScrapeError::NoDomainFound)
}

/// Shared per-request machinery handed to every handler invocation
pub struct ScrapeContext {
    pub fetchers: FetcherSet,
    pub max_pages: usize,
    pub cancel: CancellationToken,
}

/// A scraper bound to one site, registered under one or more lookup keys.
///
/// Handlers are statically compiled and registered at startup; there is no
/// dynamic registration of caller-supplied code.
#[async_trait]
pub trait SiteHandler: Send + Sync {
    /// Human-readable name for logs and errors
    fn name(&self) -> &'static str;

    async fn scrape(
        &self,
        ctx: &ScrapeContext,
        filter: &RecordFilter,
    ) -> Result<Harvest, ScrapeError>;
}

struct QuotesSite;

#[async_trait]
impl SiteHandler for QuotesSite {
    fn name(&self) -> &'static str {
        "quotes"
    }

    async fn scrape(
        &self,
        ctx: &ScrapeContext,
        filter: &RecordFilter,
    ) -> Result<Harvest, ScrapeError> {
        let extractor = QuotesExtractor::new(filter.clone());
        paginate(
            &ctx.fetchers,
            &extractor,
            QUOTES_START_URL,
            ctx.max_pages,
            &ctx.cancel,
        )
        .await
    }
}

struct BooksSite;

#[async_trait]
impl SiteHandler for BooksSite {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn scrape(
        &self,
        ctx: &ScrapeContext,
        filter: &RecordFilter,
    ) -> Result<Harvest, ScrapeError> {
        if !filter.is_empty() {
            // The catalogue has no author or tag fields to filter on
            ::log::debug!("ignoring author/tag filters for the books catalogue");
        }
        paginate(
            &ctx.fetchers,
            &BooksExtractor,
            BOOKS_START_URL,
            ctx.max_pages,
            &ctx.cancel,
        )
        .await
    }
}

struct BlogsSite;

#[async_trait]
impl SiteHandler for BlogsSite {
    fn name(&self) -> &'static str {
        "blogs"
    }

    async fn scrape(
        &self,
        ctx: &ScrapeContext,
        _filter: &RecordFilter,
    ) -> Result<Harvest, ScrapeError> {
        paginate(
            &ctx.fetchers,
            &BlogsExtractor,
            BLOGS_URL,
            ctx.max_pages,
            &ctx.cancel,
        )
        .await
    }
}

/// Case-insensitive map from site/domain key to scraper capability.
///
/// Populated once at startup; read-only during requests.
#[derive(Default)]
pub struct Registry {
    handlers: HashMap<String, Arc<dyn SiteHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in sites, each under its short name and its domain alias
    pub fn with_builtin_sites() -> Self {
        let mut registry = Self::new();
        registry.register(&["quotes", "quotes.toscrape.com"], Arc::new(QuotesSite));
        registry.register(&["books", "books.toscrape.com"], Arc::new(BooksSite));
        registry.register(&["blogs", "www.python.org"], Arc::new(BlogsSite));
        registry
    }

    pub fn register(&mut self, keys: &[&str], handler: Arc<dyn SiteHandler>) {
        for key in keys {
            self.handlers
                .insert(key.to_lowercase(), Arc::clone(&handler));
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn SiteHandler>> {
        self.handlers.get(&key.to_lowercase()).cloned()
    }

    /// Sorted keys, for "known sites" guidance in error paths
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.handlers.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Maps a resolved filter record to the right scraper, with the generic
/// link heuristic as the fallback path.
pub struct Dispatcher {
    registry: Registry,
    ctx: ScrapeContext,
}

impl Dispatcher {
    pub fn new(registry: Registry, ctx: ScrapeContext) -> Self {
        Self { registry, ctx }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolution order: registered site key, then literal URL, then error.
    pub async fn dispatch(&self, filter: &FilterRecord) -> Result<Harvest, ScrapeError> {
        if let Some(site) = filter.site.as_deref() {
            if let Some(handler) = self.registry.get(site) {
                ::log::info!("dispatching to site handler: {}", handler.name());
                let record_filter =
                    RecordFilter::new(filter.author.clone(), filter.tag.clone());
                return handler.scrape(&self.ctx, &record_filter).await;
            }
            ::log::warn!("no handler registered for site {:?}", site);
        }

        if let Some(url) = filter.url.as_deref() {
            ::log::info!("no site handler matched, using link heuristic on {}", url);
            return self.scrape_url(url).await;
        }

        Err(ScrapeError::UnresolvedTarget)
    }

    /// Strict domain routing: extract a host from the text and require a
    /// registered handler for it.
    pub async fn dispatch_domain(&self, text: &str) -> Result<Harvest, ScrapeError> {
        let key = domain_key(text)?;
        let handler = self
            .registry
            .get(&key)
            .ok_or_else(|| ScrapeError::UnregisteredDomain(key.clone()))?;
        ::log::info!("domain {} routed to site handler: {}", key, handler.name());
        handler.scrape(&self.ctx, &RecordFilter::default()).await
    }

    /// Invoke a registered handler directly by key
    pub async fn run_site(
        &self,
        key: &str,
        filter: &RecordFilter,
    ) -> Result<Harvest, ScrapeError> {
        let handler = self
            .registry
            .get(key)
            .ok_or_else(|| ScrapeError::UnregisteredDomain(key.to_lowercase()))?;
        handler.scrape(&self.ctx, filter).await
    }

    /// Generic link-heuristic scrape of a single URL
    pub async fn scrape_url(&self, url: &str) -> Result<Harvest, ScrapeError> {
        paginate(
            &self.ctx.fetchers,
            &LinkHeuristic,
            url,
            self.ctx.max_pages,
            &self.ctx.cancel,
        )
        .await
    }
}
