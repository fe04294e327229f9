//! Chunks, indexed vectors and retrieved documents.

use serde::{Deserialize, Serialize};

/// Free-form metadata attached to an indexed chunk.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A bounded substring of source text prepared for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_index: usize,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

impl Chunk {
    /// Deterministic vector id: `doc_{source_index}_chunk_{chunk_index}`.
    pub fn vector_id(&self) -> String {
        vector_id(self.source_index, self.chunk_index)
    }

    /// Metadata stored next to the embedding. Chunk fields win over `extra`.
    pub fn metadata(&self, extra: &Metadata) -> Metadata {
        let mut metadata = extra.clone();
        metadata.insert("text".into(), self.text.clone().into());
        metadata.insert("chunk_index".into(), self.chunk_index.into());
        metadata.insert("total_chunks".into(), self.total_chunks.into());
        metadata
    }
}

pub fn vector_id(source_index: usize, chunk_index: usize) -> String {
    format!("doc_{}_chunk_{}", source_index, chunk_index)
}

/// An embedded chunk as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedVector {
    pub id: String,
    #[serde(rename = "values")]
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

impl IndexedVector {
    pub fn from_chunk(chunk: &Chunk, embedding: Vec<f32>, extra: &Metadata) -> Self {
        Self {
            id: chunk.vector_id(),
            embedding,
            metadata: chunk.metadata(extra),
        }
    }

    /// The chunk text carried in metadata.
    pub fn text(&self) -> &str {
        metadata_text(&self.metadata)
    }
}

/// One similarity hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub text: String,
    /// Similarity, higher is closer
    pub score: f32,
    pub metadata: Metadata,
}

impl RetrievedDocument {
    pub fn new(score: f32, metadata: Metadata) -> Self {
        Self {
            text: metadata_text(&metadata).to_string(),
            score,
            metadata,
        }
    }
}

/// Join retrieved texts into one prompt context block.
pub fn join_context(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn metadata_text(metadata: &Metadata) -> &str {
    metadata.get("text").and_then(|v| v.as_str()).unwrap_or("")
}
