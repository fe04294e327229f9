//! Collaborator traits consumed by the pipelines.

pub mod ai;
pub mod store;

pub use ai::{Completion, EmbeddingProvider, GenerationClient};
pub use store::{cosine_similarity, VectorIndex};
