//! OpenAI chat completion client.
//!
//! Works against api.openai.com or any OpenAI-compatible server reachable at
//! a custom base URL.

use super::{ChatClient, ChatCompletionRequest, ChatCompletionResponse};
use crate::error::ClientError;
use async_trait::async_trait;
use serde::Deserialize;

/// Endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI client using the Chat Completions API.
///
/// No request timeout is set; deadlines belong to the caller.
pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiClient {
    /// Create a client. `None` or an empty base URL selects [`DEFAULT_BASE_URL`].
    pub fn new(api_key: &str, base_url: Option<&str>) -> Self {
        let base = base_url.filter(|u| !u.is_empty()).unwrap_or(DEFAULT_BASE_URL);
        Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
            endpoint: chat_completions_url(base),
        }
    }

    /// The full chat completions URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Map a non-2xx response body to a `ClientError`.
fn error_from_body(status: u16, body: String) -> ClientError {
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => ClientError::Api {
            status,
            message: envelope.error.message,
        },
        Err(_) => ClientError::Status { status, body },
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, model = %request.model, "Sending chat completion");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), text));
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
