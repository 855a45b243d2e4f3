//! OpenAI-compatible chat completions backend
//!
//! Uses direct HTTP against `/chat/completions` with the JSON-object response
//! format, so every reply is a single object the plan decoder can read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Message, Oracle, OracleError};

/// Default base URL when `OPENAI_API_BASE` is not set
pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for any endpoint speaking the OpenAI chat completions protocol
pub struct OpenAiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Create a new client; `base_url` is the API root, e.g. `https://api.openai.com/v1`
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Oracle for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, OracleError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!("POST {} ({} messages)", url, messages.len());

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status { status, body });
        }

        let raw_body = response.text().await?;
        let body: ChatCompletionResponse =
            serde_json::from_str(&raw_body).map_err(|e| OracleError::Decode(e.to_string()))?;

        // Null content passes through as empty text; the plan decoder rejects it
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::Decode("response contained no choices".to_string()))?;
        Ok(choice.message.content.unwrap_or_default())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
