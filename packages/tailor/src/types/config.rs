//! Configuration types for the tailoring pipelines.

use serde::{Deserialize, Serialize};

use crate::pipeline::retrieval::DEFAULT_TOP_K;

/// Token budget and temperature for one kind of generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Configuration for the whole tailoring core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailorConfig {
    /// Maximum characters per chunk. Default: 1000.
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks. Must be below `chunk_size`.
    /// Default: 200.
    pub chunk_overlap: usize,

    /// Documents retrieved per query. Default: 5.
    pub retrieval_k: usize,

    /// Persona evaluations in flight at once.
    ///
    /// 1 runs the committee sequentially. Default: 3.
    pub committee_concurrency: usize,

    /// Structured extraction: low temperature favours determinism.
    pub extraction: GenerationParams,

    /// Per-persona evaluation.
    pub persona: GenerationParams,

    /// Fused evaluation over structured data + retrieved context.
    pub complete_evaluation: GenerationParams,

    /// Section rephrasing.
    pub rephrase: GenerationParams,

    /// Template recommendation.
    pub recommend: GenerationParams,

    /// Free-text CV generation.
    pub generate: GenerationParams,
}

impl Default for TailorConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            retrieval_k: DEFAULT_TOP_K,
            committee_concurrency: 3,
            extraction: GenerationParams::new(2000, 0.3),
            persona: GenerationParams::new(500, 0.7),
            complete_evaluation: GenerationParams::new(1500, 0.3),
            rephrase: GenerationParams::new(800, 0.7),
            recommend: GenerationParams::new(800, 0.3),
            generate: GenerationParams::new(2000, 0.7),
        }
    }
}

impl TailorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set chunk size and overlap.
    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k;
        self
    }

    /// Set committee concurrency (clamped to at least 1).
    pub fn with_committee_concurrency(mut self, concurrency: usize) -> Self {
        self.committee_concurrency = concurrency.max(1);
        self
    }
}
