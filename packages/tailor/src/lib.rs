//! Retrieval-augmented CV tailoring.
//!
//! Chunks and indexes candidate text, retrieves the passages that matter for
//! a job, extracts a fixed structured schema, and evaluates the candidate
//! with a committee of personas or one fused call.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tailor::{MemoryIndex, Tailor, TailorConfig};
//! use tailor::testing::MockAI;
//!
//! let ai = Arc::new(MockAI::new().with_default_response("{}"));
//! let tailor = Tailor::new(ai.clone(), ai, Some(Arc::new(MemoryIndex::new())), TailorConfig::default())?;
//!
//! let tailored = tailor.tailor(&cv_text, &job_description).await?;
//! println!("{}", tailored.analysis.overall_score);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (GenerationClient, EmbeddingProvider, VectorIndex)
//! - [`types`] - Candidate schema, evaluations, template recommendations, config
//! - [`pipeline`] - Chunking, retrieval sessions, extraction, evaluation, rewriting
//! - [`stores`] - Vector index implementations (MemoryIndex, PineconeIndex)
//! - [`ai`] - Provider implementations (OpenAI, behind the `openai` feature)
//! - [`testing`] - Scripted AI double for tests

pub mod error;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

pub use error::{Result, TailorError};
pub use pipeline::{
    career_signals, normalize_candidate_data, strip_code_fences, ClearedSession,
    CommitteeEvaluator, CvWriter, ExtractionPipeline, IndexedSession, RetrievalPipeline,
    SectionRephraser, SectionType, Tailor, TailoredCv, TemplateRecommender, TextChunker,
};
pub use stores::{MemoryIndex, PineconeConfig, PineconeIndex};
pub use traits::{
    ai::{Completion, EmbeddingProvider, GenerationClient},
    store::{cosine_similarity, VectorIndex},
};
pub use types::{
    CareerSignals, Chunk, CommitteeReport, CommitteeResult, CompleteEvaluation,
    GenerationParams, IndexedVector, Metadata, Persona, PersonaEvaluation, Recommendation,
    RetrievedDocument, StructuredCandidateData, TailorConfig, TemplateAlternative, TemplateKind,
    TemplateRecommendation,
};
