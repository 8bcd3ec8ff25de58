use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for the scraping agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Timeout for a single static page fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// How long a rendered fetch waits for client-side rendering to settle,
    /// in seconds
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,

    /// Hard ceiling on pages followed in one pagination run
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Smart mode falls back to the rendered fetch when a static pass yields
    /// fewer records than this
    #[serde(default = "default_smart_min_records")]
    pub smart_min_records: usize,

    /// URL for the WebDriver instance used by rendered fetches
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Language-model endpoint used by the intent parser
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Configuration for the chat-completion endpoint behind the intent parser.
///
/// The API key is deliberately not part of the config file; it is read from
/// the OPENAI_API_KEY environment variable at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    /// Timeout on the completion call, in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            settle_delay_secs: default_settle_delay_secs(),
            max_pages: default_max_pages(),
            smart_min_records: default_smart_min_records(),
            webdriver_url: default_webdriver_url(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl ScoutConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment overrides (currently WEBDRIVER_URL)
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_settle_delay_secs() -> u64 {
    3
}

fn default_max_pages() -> usize {
    50
}

fn default_smart_min_records() -> usize {
    1
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_temperature() -> f32 {
    0.0
}

fn default_llm_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ScoutConfig = serde_json::from_str(r#"{"max_pages": 5}"#).unwrap();
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }
}
