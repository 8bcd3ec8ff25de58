use thiserror::Error;

/// Errors from retrieving raw markup, static or rendered.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to reach webdriver at {addr}: {source}")]
    WebDriverConnect {
        addr: String,
        #[source]
        source: fantoccini::error::NewSessionError,
    },

    #[error("webdriver error for {url}: {source}")]
    WebDriver {
        url: String,
        #[source]
        source: fantoccini::error::CmdError,
    },

    #[error("rendered fetch requested but no webdriver is configured")]
    RenderedUnavailable,
}

/// Errors from navigating a site-specific markup structure.
///
/// Site extractors raise when a required child element is absent rather than
/// papering over it; a layout change on the target site should be loud.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("expected element missing: {0}")]
    MissingElement(&'static str),

    #[error("expected attribute missing: {0}")]
    MissingAttr(&'static str),
}

/// Errors from the language-model boundary.
///
/// Malformed completion *content* is not an error: the intent parser turns it
/// into an empty filter record. These variants cover transport and API
/// failures only.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("llm request timed out")]
    Timeout,

    #[error("llm request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("llm api error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Top-level error surfaced to callers of the dispatch and scrape APIs.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("no http(s) url found in request text")]
    NoDomainFound,

    #[error("no scraper registered for domain \"{0}\"")]
    UnregisteredDomain(String),

    #[error("request names neither a known site nor a url")]
    UnresolvedTarget,

    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
