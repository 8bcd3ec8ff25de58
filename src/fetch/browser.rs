use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};

use super::Fetch;
use crate::error::FetchError;

/// Rendered fetch: navigate a headless browser to the URL, wait a fixed
/// settle delay for client-side rendering, capture the resulting markup.
///
/// Each call opens its own WebDriver session and closes it on every exit
/// path, success or failure.
pub struct BrowserFetcher {
    webdriver_url: String,
    settle_delay: Duration,
}

impl BrowserFetcher {
    pub fn new(webdriver_url: &str, settle_delay: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            settle_delay,
        }
    }

    async fn capture(&self, client: &Client, url: &str) -> Result<String, FetchError> {
        client.goto(url).await.map_err(|e| FetchError::WebDriver {
            url: url.to_string(),
            source: e,
        })?;

        // Fixed settle delay for JS-driven pages
        tokio::time::sleep(self.settle_delay).await;

        client.source().await.map_err(|e| FetchError::WebDriver {
            url: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl Fetch for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        ::log::debug!("rendered fetch: {}", url);

        let client = ClientBuilder::native()
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| FetchError::WebDriverConnect {
                addr: self.webdriver_url.clone(),
                source: e,
            })?;

        let result = self.capture(&client, url).await;

        // Session teardown runs regardless of how the capture went
        if let Err(e) = client.close().await {
            ::log::warn!("failed to close webdriver session: {}", e);
        }

        result
    }
}
