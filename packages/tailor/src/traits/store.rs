//! Vector index trait.
//!
//! The index is a single shared store with no per-session namespace. The
//! only way to scope it to one candidate is a full clear before indexing,
//! which `RetrievalPipeline` sessions enforce.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::document::{IndexedVector, RetrievedDocument};

/// Store for embedded chunks (semantic search).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite vectors by id.
    async fn upsert(&self, vectors: Vec<IndexedVector>) -> Result<()>;

    /// Nearest neighbours of `embedding`, highest score first, at most `top_k`.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedDocument>>;

    /// Remove every vector.
    async fn clear(&self) -> Result<()>;
}

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[2.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
