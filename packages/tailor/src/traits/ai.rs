//! Provider traits for language-model and embedding calls.
//!
//! The pipelines never talk to a vendor SDK directly. They consume:
//! - `GenerationClient`: one system + user prompt in, raw text out
//! - `EmbeddingProvider`: text in, fixed-dimension vector out
//!
//! Implementations report every transport/auth/rate-limit failure as
//! `TailorError::Provider`.

use async_trait::async_trait;

use crate::error::Result;

/// A single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// System prompt (persona / role instructions)
    pub system: String,

    /// User prompt (task + data)
    pub user: String,

    /// Output token budget
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Completion {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 1000,
            temperature: 0.7,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Language-model provider.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Run one completion and return the raw response text.
    async fn complete(&self, request: Completion) -> Result<String>;
}

/// Embedding provider.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}
