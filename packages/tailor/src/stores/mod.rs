//! Vector index implementations.

pub mod memory;
pub mod pinecone;

pub use memory::MemoryIndex;
pub use pinecone::{PineconeConfig, PineconeIndex};
