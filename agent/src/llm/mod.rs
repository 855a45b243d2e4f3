//! Reasoning oracle abstraction
//!
//! The investigation loop treats the LLM as a pure function from a
//! role-tagged transcript to one structured (JSON object) reply. Backends
//! only differ in how they shape the HTTP request.

mod ollama;
mod openai;

pub use ollama::{OllamaClient, DEFAULT_OLLAMA_URL};
pub use openai::{OpenAiClient, DEFAULT_OPENAI_BASE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Errors talking to an oracle backend
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("oracle API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode oracle response: {0}")]
    Decode(String),
}

/// Trait for LLM backends that answer with a single JSON object
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send the full message sequence and return the raw reply text
    async fn complete(&self, messages: &[Message]) -> Result<String, OracleError>;

    /// Get the model name
    fn model(&self) -> &str;
}
