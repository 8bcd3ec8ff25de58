use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::LlmError;

/// A chat-completion capability the intent parser can be handed.
///
/// Production uses [`OpenAiClient`]; tests use [`MockClient`]. The client is
/// always constructed explicitly and injected, never held as a global.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single user prompt and return the completion text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    cfg: LlmConfig,
}

impl OpenAiClient {
    pub fn new(cfg: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(LlmError::Transport)?;
        Ok(Self { http, cfg })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.cfg.base_url.trim_end_matches('/')
        )
    }

    fn resolve_api_key() -> Result<String, LlmError> {
        std::env::var("OPENAI_API_KEY").map_err(|_| LlmError::MissingApiKey)
    }

    fn build_request(&self, prompt: &str) -> ApiRequest {
        ApiRequest {
            model: self.cfg.model.clone(),
            temperature: self.cfg.temperature,
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = Self::resolve_api_key()?;
        let request = self.build_request(prompt);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorEnvelope>(&body)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ApiResponse =
            serde_json::from_slice(&body).map_err(|e| LlmError::Api {
                status: status.as_u16(),
                message: format!("unreadable completion body: {e}"),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .unwrap_or_default();

        ::log::debug!("llm completion returned {} bytes", content.len());
        Ok(content)
    }
}

fn map_reqwest(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Transport(err)
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    temperature: f32,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Queue-backed client for tests: replies are handed out in push order.
#[derive(Debug, Default)]
pub struct MockClient {
    replies: std::sync::Mutex<std::collections::VecDeque<Result<String, LlmError>>>,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn push_error(&self, err: LlmError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::Timeout))
    }
}
