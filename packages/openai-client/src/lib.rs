//! Minimal OpenAI REST client
//!
//! Chat completions and embeddings, nothing else. Every request goes through
//! one `reqwest::Client` built with a timeout so a stalled provider call
//! fails instead of hanging the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{OpenAIClient, ChatRequest, Message};
//!
//! let client = OpenAIClient::from_env()?.with_timeout(Duration::from_secs(30))?;
//!
//! let response = client.chat_completion(
//!     ChatRequest::new("gpt-4")
//!         .message(Message::system("You are a professional CV writer."))
//!         .message(Message::user("Summarise this CV"))
//!         .temperature(0.3)
//!         .token_budget(800),
//! ).await?;
//!
//! let embedding = client.create_embedding("text to embed", "text-embedding-ada-002").await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::*;

use std::time::{Duration, Instant};

use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAIClient {
    /// Create a client with the default base URL and a 60s timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(OpenAIError::Config("OpenAI API key is required".into()));
        }
        Ok(Self {
            http_client: build_http_client(DEFAULT_TIMEOUT)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Self::new(api_key)
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = build_http_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Chat completion.
    ///
    /// Returns the first choice. A choice with null content is reported as an
    /// API error rather than an empty string.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = Instant::now();

        let response = self.post("chat/completions", &request).await?;
        let raw: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        let choice = raw.choices.into_iter().next().ok_or_else(|| OpenAIError::Api {
            status: 200,
            message: "No choices in chat completion response".into(),
        })?;

        let content = choice.message.content.ok_or_else(|| OpenAIError::Api {
            status: 200,
            message: "Chat completion returned no content".into(),
        })?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis() as u64,
            finish_reason = ?choice.finish_reason,
            total_tokens = raw.usage.as_ref().map(|u| u.total_tokens),
            "OpenAI chat completion"
        );

        Ok(ChatResponse {
            content,
            finish_reason: choice.finish_reason,
            usage: raw.usage,
        })
    }

    /// Create an embedding for one text.
    pub async fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let request = types::EmbeddingRequest {
            model,
            input: types::EmbeddingInput::Single(text),
        };

        let response = self.post("embeddings", &request).await?;
        let parsed: types::EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        parsed
            .into_ordered(1)
            .and_then(|mut v| v.pop())
            .ok_or_else(|| OpenAIError::Parse("Expected exactly one embedding".into()))
    }

    /// Create embeddings for several texts in a single request.
    pub async fn create_embeddings(&self, texts: &[&str], model: &str) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = types::EmbeddingRequest {
            model,
            input: types::EmbeddingInput::Batch(texts),
        };

        let response = self.post("embeddings", &request).await?;
        let parsed: types::EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        parsed.into_ordered(texts.len()).ok_or_else(|| {
            OpenAIError::Parse(format!("Expected {} embeddings in response", texts.len()))
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, path, "OpenAI request failed");
                OpenAIError::from_transport(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<types::ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        warn!(status = %status, error = %message, path, "OpenAI API error");

        Err(OpenAIError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| OpenAIError::Config(format!("Failed to build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = OpenAIClient::new("sk-test")
            .unwrap()
            .with_base_url("https://custom.api.com/v1/")
            .with_timeout(Duration::from_secs(5))
            .unwrap();

        assert_eq!(client.base_url(), "https://custom.api.com/v1");
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let err = OpenAIClient::new("   ").unwrap_err();
        assert!(matches!(err, OpenAIError::Config(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = OpenAIClient::new("sk-secret").unwrap();
        assert!(!format!("{:?}", client).contains("sk-secret"));
    }

    #[test]
    fn test_empty_batch_skips_request() {
        // Unroutable base URL: any request would fail, so Ok proves none was sent.
        let client = OpenAIClient::new("sk-test")
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let result = tokio_test::block_on(client.create_embeddings(&[], "text-embedding-ada-002"));
        assert!(result.unwrap().is_empty());
    }
}
