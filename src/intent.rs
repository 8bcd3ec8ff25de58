use std::sync::Arc;

use serde::Deserialize;

use crate::dispatch::find_url;
use crate::error::LlmError;
use crate::llm::LlmClient;

/// Filter record produced from free-text user intent.
///
/// All fields are optional; an empty record is a valid outcome, not an error.
/// `url` is not asked of the model — it is lifted straight out of the user's
/// text when one is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterRecord {
    #[serde(default, alias = "category")]
    pub site: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default)]
    pub url: Option<String>,
}

impl FilterRecord {
    pub fn is_empty(&self) -> bool {
        self.site.is_none() && self.author.is_none() && self.tag.is_none() && self.url.is_none()
    }
}

const INSTRUCTIONS: &str = "You are a filter extractor. Given a user input, extract:\n\
- author (if any)\n\
- tag (if any)\n\
- site: quotes, books, blogs\n\n\
Respond ONLY in JSON format like:\n\
{\"author\": \"Albert Einstein\", \"tag\": \"inspirational\", \"site\": \"quotes\"}";

/// Turns free text into a [`FilterRecord`] via an injected language model.
pub struct IntentParser {
    client: Arc<dyn LlmClient>,
}

impl IntentParser {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Parse user intent.
    ///
    /// Transport failures propagate. A completion that is not the requested
    /// JSON shape yields an empty filter record; callers must treat "no
    /// filters" as a silent, valid outcome.
    pub async fn parse(&self, text: &str) -> Result<FilterRecord, LlmError> {
        let prompt = format!("{INSTRUCTIONS}\n\nUser Input: {text}");
        let reply = self.client.complete(&prompt).await?;

        let mut record = match serde_json::from_str::<FilterRecord>(strip_code_fence(&reply)) {
            Ok(record) => record,
            Err(e) => {
                ::log::warn!("discarding malformed filter reply: {}", e);
                FilterRecord::default()
            }
        };

        if record.url.is_none() {
            record.url = find_url(text);
        }

        ::log::debug!("parsed intent: {:?}", record);
        Ok(record)
    }
}

/// Models often wrap JSON in a markdown fence; tolerate that one quirk.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim_end_matches('`').trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockClient;

    fn parser_with_reply(reply: &str) -> IntentParser {
        let mock = MockClient::new();
        mock.push_reply(reply);
        IntentParser::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn well_formed_reply_fills_filters() {
        let parser = parser_with_reply(
            r#"{"author": "Steve Jobs", "tag": "life", "site": "quotes"}"#,
        );
        let record = parser.parse("Get quotes by Steve Jobs about life").await.unwrap();

        assert_eq!(record.site.as_deref(), Some("quotes"));
        assert_eq!(record.author.as_deref(), Some("Steve Jobs"));
        assert_eq!(record.tag.as_deref(), Some("life"));
        assert_eq!(record.url, None);
    }

    #[tokio::test]
    async fn malformed_reply_yields_empty_record() {
        let parser = parser_with_reply("not json");
        let record = parser.parse("scrape something").await.unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn fenced_reply_is_unwrapped() {
        let parser = parser_with_reply("```json\n{\"site\": \"books\"}\n```");
        let record = parser.parse("list books").await.unwrap();
        assert_eq!(record.site.as_deref(), Some("books"));
    }

    #[tokio::test]
    async fn url_in_text_survives_even_when_reply_is_junk() {
        let parser = parser_with_reply("null");
        let record = parser
            .parse("grab headlines from https://example.com/news")
            .await
            .unwrap();
        assert_eq!(record.url.as_deref(), Some("https://example.com/news"));
    }

    #[tokio::test]
    async fn prompt_carries_instruction_template_and_input() {
        let mock = Arc::new(MockClient::new());
        mock.push_reply("{}");
        let parser = IntentParser::new(mock.clone());
        parser.parse("find books about rust").await.unwrap();

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Respond ONLY in JSON"));
        assert!(prompts[0].ends_with("User Input: find books about rust"));
    }
}
