//! Ollama backend
//!
//! Talks to `/api/chat` directly over HTTP with `format: "json"`, which
//! constrains the model to emit one JSON value.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Message, Oracle, OracleError};

/// Default Ollama endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    format: &'static str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}

/// Ollama client
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(url: &str, model: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: normalize_base_url(url),
            model: model.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Reduce a user-supplied URL to `scheme://host:port`, falling back to the
/// default endpoint when it does not parse
fn normalize_base_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("localhost");
            let port = parsed.port().unwrap_or(11434);
            format!("{}://{}:{}", parsed.scheme(), host, port)
        }
        Err(e) => {
            tracing::warn!("Invalid Ollama URL {:?} ({}), using {}", url, e, DEFAULT_OLLAMA_URL);
            DEFAULT_OLLAMA_URL.to_string()
        }
    }
}

#[async_trait]
impl Oracle for OllamaClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, OracleError> {
        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            format: "json",
            stream: false,
        };

        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!("POST {} ({} messages)", url, messages.len());

        let response = self.http_client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status { status, body });
        }

        let raw_body = response.text().await?;
        let body: OllamaChatResponse =
            serde_json::from_str(&raw_body).map_err(|e| OracleError::Decode(e.to_string()))?;

        Ok(body.message.content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
