//! Retrieval pipeline: chunk, embed, index, and query candidate text.
//!
//! The vector index is one shared store with no per-candidate namespace.
//! `begin_session` scopes it to a single document: it takes the pipeline's
//! session lock, clears the index, and hands back a [`ClearedSession`]. Only
//! an indexed session can retrieve, so stale chunks from a previous candidate
//! can never be read back.
//!
//! ```rust,ignore
//! let session = pipeline.begin_session().await?;
//! let session = session.index(&cv_text, &Metadata::new()).await?;
//! let context = session.retrieve(&job_description, 5).await?;
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

use crate::error::{Result, TailorError};
use crate::pipeline::chunker::TextChunker;
use crate::traits::ai::EmbeddingProvider;
use crate::traits::store::VectorIndex;
use crate::types::document::{IndexedVector, Metadata, RetrievedDocument};

/// Default number of documents returned by `retrieve`.
pub const DEFAULT_TOP_K: usize = 5;

/// Chunker + embedder + vector index.
pub struct RetrievalPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Option<Arc<dyn VectorIndex>>,
    chunker: TextChunker,
    session_lock: Mutex<()>,
}

impl RetrievalPipeline {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index: Some(index),
            chunker: TextChunker::default(),
            session_lock: Mutex::new(()),
        }
    }

    /// A pipeline with no index behind it; every operation fails with
    /// `IndexUnavailable`.
    pub fn without_index(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            index: None,
            chunker: TextChunker::default(),
            session_lock: Mutex::new(()),
        }
    }

    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    fn index_handle(&self) -> Result<&dyn VectorIndex> {
        self.index.as_deref().ok_or_else(|| {
            TailorError::IndexUnavailable("no vector index configured".into())
        })
    }

    /// Chunk, embed and upsert one document as source 0. Returns the chunk count.
    pub async fn index(&self, raw_text: &str, metadata: &Metadata) -> Result<usize> {
        self.index_documents(&[raw_text], metadata).await
    }

    /// Index several documents; document `i` gets ids `doc_{i}_chunk_{j}`.
    ///
    /// Upserts overwrite by id, so indexing the same text twice leaves one
    /// vector per chunk. Metadata values should be flat (strings, numbers,
    /// bools, string lists); Pinecone rejects nested objects.
    #[instrument(skip(self, texts, metadata), fields(documents = texts.len()))]
    pub async fn index_documents(&self, texts: &[&str], metadata: &Metadata) -> Result<usize> {
        let index = self.index_handle()?;

        let chunks: Vec<_> = texts
            .iter()
            .enumerate()
            .flat_map(|(i, text)| self.chunker.chunk(text, i))
            .collect();

        if chunks.is_empty() {
            return Ok(0);
        }

        let chunk_texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&chunk_texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(TailorError::Provider(format!(
                "embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let vectors: Vec<_> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedVector::from_chunk(chunk, embedding, metadata))
            .collect();

        let count = vectors.len();
        index.upsert(vectors).await?;

        info!(chunks = count, "Indexed documents");
        Ok(count)
    }

    /// Remove every vector from the index.
    pub async fn clear(&self) -> Result<()> {
        self.index_handle()?.clear().await?;
        debug!("Cleared vector index");
        Ok(())
    }

    /// Top-`k` chunks for `query`, highest score first.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
        let index = self.index_handle()?;
        let embedding = self.embedder.embed(query).await?;

        let mut documents = index.query(&embedding, k).await?;
        documents.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        documents.truncate(k);

        debug!(retrieved = documents.len(), k, "Retrieved documents");
        Ok(documents)
    }

    /// Lock the pipeline for one document and clear the index.
    ///
    /// The lock is held until the returned session (or the [`IndexedSession`]
    /// it becomes) is dropped. Sessions on the same pipeline run one at a
    /// time; separate processes sharing an index still need their own lock.
    pub async fn begin_session(&self) -> Result<ClearedSession<'_>> {
        self.index_handle()?;
        let guard = self.session_lock.lock().await;
        self.clear().await?;
        Ok(ClearedSession {
            pipeline: self,
            _guard: guard,
        })
    }
}

/// An emptied index, ready for exactly one round of indexing.
pub struct ClearedSession<'a> {
    pipeline: &'a RetrievalPipeline,
    _guard: MutexGuard<'a, ()>,
}

impl<'a> ClearedSession<'a> {
    pub async fn index(self, raw_text: &str, metadata: &Metadata) -> Result<IndexedSession<'a>> {
        self.index_documents(&[raw_text], metadata).await
    }

    pub async fn index_documents(
        self,
        texts: &[&str],
        metadata: &Metadata,
    ) -> Result<IndexedSession<'a>> {
        let chunks = self.pipeline.index_documents(texts, metadata).await?;
        Ok(IndexedSession {
            pipeline: self.pipeline,
            chunks,
            _guard: self._guard,
        })
    }
}

/// An index holding only this session's document.
pub struct IndexedSession<'a> {
    pipeline: &'a RetrievalPipeline,
    chunks: usize,
    _guard: MutexGuard<'a, ()>,
}

impl IndexedSession<'_> {
    /// Number of chunks indexed in this session.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
        self.pipeline.retrieve(query, k).await
    }
}
