//! Tailoring pipelines.
//!
//! - Chunking and retrieval over a vector index, with clear-then-index sessions
//! - Structured extraction and schema normalization
//! - Persona committee and fused evaluation
//! - Section rephrasing, template recommendation, free-text CV writing
//! - `Tailor`, which runs retrieval, extraction and evaluation end to end

pub mod chunker;
pub mod committee;
pub mod extract;
pub mod generate;
pub mod prompts;
pub mod recommend;
pub mod rephrase;
pub mod retrieval;
pub mod tailor;

pub use chunker::TextChunker;
pub use committee::CommitteeEvaluator;
pub use extract::{normalize_candidate_data, strip_code_fences, ExtractionPipeline};
pub use generate::CvWriter;
pub use recommend::{career_signals, parse_recommendation, TemplateRecommender};
pub use rephrase::{SectionRephraser, SectionType};
pub use retrieval::{ClearedSession, IndexedSession, RetrievalPipeline, DEFAULT_TOP_K};
pub use tailor::{Tailor, TailoredCv};
