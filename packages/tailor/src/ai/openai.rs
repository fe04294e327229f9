//! OpenAI implementation of the provider traits.
//!
//! ```rust,ignore
//! use tailor::ai::OpenAI;
//!
//! let ai = Arc::new(OpenAI::from_env()?.with_model("gpt-4o"));
//! let tailor = Tailor::new(ai.clone(), ai, Some(index), TailorConfig::default())?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};

use crate::error::Result;
use crate::traits::ai::{Completion, EmbeddingProvider, GenerationClient};

const DEFAULT_CHAT_MODEL: &str = "gpt-4";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// OpenAI chat + embeddings.
#[derive(Debug, Clone)]
pub struct OpenAI {
    client: OpenAIClient,
    model: String,
    embedding_model: String,
}

impl OpenAI {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(OpenAIClient::new(api_key)?))
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_client(OpenAIClient::from_env()?))
    }

    pub fn with_client(client: OpenAIClient) -> Self {
        Self {
            client,
            model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    /// Set the chat model (default: gpt-4).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model (default: text-embedding-ada-002, 1536 dimensions).
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = self.client.with_timeout(timeout)?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn chat_request(&self, request: Completion) -> ChatRequest {
        ChatRequest::new(&self.model)
            .message(Message::system(request.system))
            .message(Message::user(request.user))
            .temperature(request.temperature)
            .token_budget(request.max_tokens)
    }
}

#[async_trait]
impl GenerationClient for OpenAI {
    async fn complete(&self, request: Completion) -> Result<String> {
        let response = self.client.chat_completion(self.chat_request(request)).await?;
        Ok(response.content)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAI {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self
            .client
            .create_embedding(text, &self.embedding_model)
            .await?)
    }

    /// One request for the whole batch.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(self
            .client
            .create_embeddings(texts, &self.embedding_model)
            .await?)
    }
}
