use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::provider::{CompletionRequest, ModelClient, ModelError};

/// Non-streaming client for OpenAI-compatible chat-completions endpoints.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// `base_url` is the API root including any version suffix the provider
    /// expects (e.g. `https://api.endpoints.anyscale.com/v1`).
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn complete(&self, req: &CompletionRequest) -> Result<String, ModelError> {
        let body = build_request_body(req);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %req.model, turns = req.messages.len(), "sending completion request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            let retry = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| s * 1000) // convert seconds to ms
                .unwrap_or(5000);
            return Err(ModelError::RateLimited {
                retry_after_ms: retry,
            });
        }

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "completion API error");
            if status >= 500 {
                return Err(ModelError::Unavailable(format!("upstream {status}: {text}")));
            }
            return Err(ModelError::Api {
                status,
                message: text,
            });
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        extract_content(api_resp)
    }
}

fn build_request_body(req: &CompletionRequest) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = req
        .messages
        .iter()
        .map(|t| {
            serde_json::json!({
                "role": t.role,
                "content": t.content,
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "model": req.model,
        "messages": messages,
        "temperature": req.temperature,
    });
    if let Some(max) = req.max_tokens {
        body["max_tokens"] = serde_json::json!(max);
    }
    body
}

/// A completion must carry exactly one assistant message.
fn extract_content(resp: ApiResponse) -> Result<String, ModelError> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ModelError::Parse("response contained no assistant message".into()))
}

// API response types (private, deserialization only)

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
