use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Request to an LLM completion endpoint.
///
/// `messages` carries the windowed history: the system turn first, then
/// user/assistant turns in conversational order, ending with the new user
/// turn.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    /// Omitted from the request body when `None`.
    pub max_tokens: Option<u32>,
    pub messages: Vec<Turn>,
}

/// Common interface for LLM completion backends.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Backend name for logging and error messages.
    fn name(&self) -> &str;

    /// Submit one completion request and return exactly one assistant turn.
    /// No retry happens at this layer.
    async fn complete(&self, req: &CompletionRequest) -> Result<String, ModelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Model unavailable: {0}")]
    Unavailable(String),
}
