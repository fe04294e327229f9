//! Provider implementations of the collaborator traits.
//!
//! Other providers only need to implement `GenerationClient` and
//! `EmbeddingProvider`.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAI;
