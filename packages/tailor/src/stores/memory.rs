//! In-memory vector index for tests, the CLI without Pinecone credentials,
//! and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, TailorError};
use crate::traits::store::{cosine_similarity, VectorIndex};
use crate::types::document::{IndexedVector, RetrievedDocument};

/// Brute-force cosine index keyed by vector id.
///
/// Data is lost on restart.
#[derive(Default)]
pub struct MemoryIndex {
    vectors: RwLock<HashMap<String, IndexedVector>>,
    dimension: Option<usize>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject vectors whose length differs from `dimension`.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            vectors: RwLock::default(),
            dimension: Some(dimension),
        }
    }

    pub async fn len(&self) -> usize {
        self.vectors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.vectors.read().await.is_empty()
    }

    /// Look up a stored vector by id.
    pub async fn get(&self, id: &str) -> Option<IndexedVector> {
        self.vectors.read().await.get(id).cloned()
    }

    fn check_dimension(&self, len: usize) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != len => Err(TailorError::Storage(format!(
                "vector dimension {} does not match index dimension {}",
                len, expected
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, vectors: Vec<IndexedVector>) -> Result<()> {
        for vector in &vectors {
            self.check_dimension(vector.embedding.len())?;
        }

        let mut stored = self.vectors.write().await;
        let count = vectors.len();
        for vector in vectors {
            stored.insert(vector.id.clone(), vector);
        }
        debug!(upserted = count, total = stored.len(), "Memory index upsert");
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedDocument>> {
        self.check_dimension(embedding.len())?;

        let stored = self.vectors.read().await;
        let mut scored: Vec<_> = stored
            .values()
            .map(|v| RetrievedDocument::new(cosine_similarity(embedding, &v.embedding), v.metadata.clone()))
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn clear(&self) -> Result<()> {
        let mut stored = self.vectors.write().await;
        let removed = stored.len();
        stored.clear();
        debug!(removed, "Memory index cleared");
        Ok(())
    }
}
