//! Typed errors for the tailoring core.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Every variant keeps
//! the original error text so callers can show a meaningful message.

use thiserror::Error;

/// Errors surfaced by the tailoring pipelines.
#[derive(Debug, Error)]
pub enum TailorError {
    /// Embedding or generation provider failed (network, auth, rate limit, timeout)
    #[error("provider error: {0}")]
    Provider(String),

    /// Vector index was never initialized (e.g. missing credentials)
    #[error("vector index unavailable: {0}")]
    IndexUnavailable(String),

    /// Vector index is configured but an operation against it failed
    #[error("vector index error: {0}")]
    Storage(String),

    /// Model output could not be read as the expected schema
    #[error("extraction format error: {0}")]
    ExtractionFormat(String),

    /// The fused evaluation call failed
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Invalid configuration (chunking parameters, models, credentials)
    #[error("config error: {0}")]
    Config(String),

    /// JSON (de)serialization error outside model output handling
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "openai")]
impl From<openai_client::OpenAIError> for TailorError {
    fn from(err: openai_client::OpenAIError) -> Self {
        match err {
            openai_client::OpenAIError::Config(msg) => Self::Config(msg),
            other => Self::Provider(other.to_string()),
        }
    }
}

/// Result type alias for tailoring operations.
pub type Result<T> = std::result::Result<T, TailorError>;
