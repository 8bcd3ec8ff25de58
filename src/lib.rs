// Re-export modules
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod intent;
pub mod llm;
pub mod paginate;
pub mod records;

// Re-export commonly used types for convenience
pub use error::ScrapeError;
pub use fetch::FetchMode;
pub use intent::FilterRecord;
pub use records::{Harvest, Record};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use config::ScoutConfig;
use dispatch::{Dispatcher, Registry, ScrapeContext};
use fetch::FetcherSet;
use filter::RecordFilter;
use intent::IntentParser;
use llm::{LlmClient, OpenAiClient};

/// Entry point tying the pieces together: intent parsing, dispatch,
/// pagination, and the fetch-mode policy.
///
/// One `Scout` serves many requests; each run builds its own fetcher pairing
/// for the requested mode. The cancellation token is shared so a Ctrl-C
/// handler can stop an in-flight pagination loop between page fetches.
pub struct Scout {
    config: ScoutConfig,
    llm: Arc<dyn LlmClient>,
    cancel: CancellationToken,
}

impl Scout {
    /// Build a scout with the default OpenAI-compatible intent client
    pub fn new(config: ScoutConfig) -> Result<Self, ScrapeError> {
        let llm = Arc::new(OpenAiClient::new(config.llm.clone())?);
        Ok(Self {
            config,
            llm,
            cancel: CancellationToken::new(),
        })
    }

    /// Swap in a different language-model client (used by tests)
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = llm;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn dispatcher(&self, mode: FetchMode) -> Result<Dispatcher, ScrapeError> {
        let fetchers = FetcherSet::from_config(mode, &self.config)?;
        let ctx = ScrapeContext {
            fetchers,
            max_pages: self.config.max_pages,
            cancel: self.cancel.clone(),
        };
        Ok(Dispatcher::new(Registry::with_builtin_sites(), ctx))
    }

    /// Free-text request: parse intent, then dispatch.
    ///
    /// Returns the parsed filter record alongside the harvest so callers can
    /// show the user what was detected.
    pub async fn run_prompt(
        &self,
        text: &str,
        mode: FetchMode,
    ) -> Result<(FilterRecord, Harvest), ScrapeError> {
        let parser = IntentParser::new(Arc::clone(&self.llm));
        let filter = parser.parse(text).await?;
        let harvest = self.dispatcher(mode)?.dispatch(&filter).await?;
        Ok((filter, harvest))
    }

    /// Direct URL request: route to a site handler when the host is
    /// registered, otherwise fall back to the generic link heuristic.
    pub async fn run_url(&self, url: &str, mode: FetchMode) -> Result<Harvest, ScrapeError> {
        let dispatcher = self.dispatcher(mode)?;
        match dispatcher.dispatch_domain(url).await {
            Err(ScrapeError::UnregisteredDomain(domain)) => {
                ::log::info!(
                    "domain {} has no dedicated handler, using link heuristic",
                    domain
                );
                dispatcher.scrape_url(url).await
            }
            other => other,
        }
    }

    /// Direct registry invocation by key, with optional author/tag filters
    pub async fn run_site(
        &self,
        key: &str,
        author: Option<String>,
        tag: Option<String>,
        mode: FetchMode,
    ) -> Result<Harvest, ScrapeError> {
        let filter = RecordFilter::new(author, tag);
        self.dispatcher(mode)?.run_site(key, &filter).await
    }

    /// Registered lookup keys, for user-facing guidance
    pub fn known_sites(&self) -> Vec<String> {
        Registry::with_builtin_sites().keys()
    }
}
