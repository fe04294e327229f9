//! Testing utilities including a scripted AI double.
//!
//! Useful for exercising the pipelines without real model or embedding calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Result, TailorError};
use crate::traits::ai::{Completion, EmbeddingProvider, GenerationClient};

/// A mock AI implementing both [`GenerationClient`] and [`EmbeddingProvider`].
///
/// Completions are scripted by substring: the first rule whose pattern occurs
/// in the system or user prompt decides the reply. Unmatched prompts fail with
/// a provider error so a missing script is loud.
///
/// Embeddings are a hashed bag of words, so texts sharing words are close
/// under cosine similarity and identical texts embed identically.
#[derive(Default)]
pub struct MockAI {
    /// Scripted replies, checked in insertion order
    rules: Arc<RwLock<Vec<(String, Scripted)>>>,

    /// Reply for prompts no rule matches
    fallback: Arc<RwLock<Option<String>>>,

    /// Predefined embeddings by exact text
    embeddings: Arc<RwLock<HashMap<String, Vec<f32>>>>,

    /// Embedding requests containing any of these fail
    embed_failures: Arc<RwLock<Vec<String>>>,

    embedding_dim: usize,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockAICall>>>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
}

/// Record of a call made to the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum MockAICall {
    Complete(Completion),
    Embed { text: String },
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            embedding_dim: 64,
            ..Default::default()
        }
    }

    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Reply with `response` when a prompt contains `pattern`.
    pub fn with_response(self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules
            .write()
            .unwrap()
            .push((pattern.into(), Scripted::Reply(response.into())));
        self
    }

    /// Fail with a provider error when a prompt contains `pattern`.
    pub fn with_failure(self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules
            .write()
            .unwrap()
            .push((pattern.into(), Scripted::Fail(message.into())));
        self
    }

    /// Reply used when no rule matches.
    pub fn with_default_response(self, response: impl Into<String>) -> Self {
        *self.fallback.write().unwrap() = Some(response.into());
        self
    }

    /// Fixed embedding for an exact text.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.embeddings
            .write()
            .unwrap()
            .insert(text.into(), embedding);
        self
    }

    /// Fail embedding calls whose text contains `pattern` (`""` fails all).
    pub fn with_embedding_failure(self, pattern: impl Into<String>) -> Self {
        self.embed_failures.write().unwrap().push(pattern.into());
        self
    }

    pub fn calls(&self) -> Vec<MockAICall> {
        self.calls.read().unwrap().clone()
    }

    /// Completion calls only, in order.
    pub fn completions(&self) -> Vec<Completion> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                MockAICall::Complete(request) => Some(request.clone()),
                MockAICall::Embed { .. } => None,
            })
            .collect()
    }

    /// Number of embedding calls.
    pub fn embed_count(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockAICall::Embed { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    /// Hashed bag-of-words embedding, L2-normalised.
    fn generate_deterministic_embedding(&self, text: &str) -> Vec<f32> {
        use sha2::{Digest, Sha256};

        let mut vector = vec![0.0f32; self.embedding_dim.max(1)];
        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase);

        for word in words {
            let hash = Sha256::digest(word.as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&hash[..8]);
            let slot = (u64::from_le_bytes(bucket) % vector.len() as u64) as usize;
            let sign = if hash[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[async_trait]
impl GenerationClient for MockAI {
    async fn complete(&self, request: Completion) -> Result<String> {
        self.calls
            .write()
            .unwrap()
            .push(MockAICall::Complete(request.clone()));

        let scripted = self
            .rules
            .read()
            .unwrap()
            .iter()
            .find(|(pattern, _)| request.system.contains(pattern) || request.user.contains(pattern))
            .map(|(_, scripted)| scripted.clone());

        match scripted {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(message)) => Err(TailorError::Provider(message)),
            None => self.fallback.read().unwrap().clone().ok_or_else(|| {
                TailorError::Provider("MockAI: no scripted response for prompt".into())
            }),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for MockAI {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.write().unwrap().push(MockAICall::Embed {
            text: text.to_string(),
        });

        if self
            .embed_failures
            .read()
            .unwrap()
            .iter()
            .any(|pattern| text.contains(pattern.as_str()))
        {
            return Err(TailorError::Provider("MockAI: embedding failed".into()));
        }

        Ok(self
            .embeddings
            .read()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.generate_deterministic_embedding(text)))
    }
}
