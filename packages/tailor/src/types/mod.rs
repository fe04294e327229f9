//! Data types shared by the pipelines.

pub mod candidate;
pub mod config;
pub mod document;
pub mod evaluation;
pub mod template;

pub use candidate::{
    Certification, Education, Experience, Personal, Project, Skills, StructuredCandidateData,
};
pub use config::{GenerationParams, TailorConfig};
pub use document::{Chunk, IndexedVector, Metadata, RetrievedDocument};
pub use evaluation::{
    CommitteeReport, CommitteeResult, CompleteEvaluation, Persona, PersonaEvaluation,
    Recommendation,
};
pub use template::{CareerSignals, TemplateAlternative, TemplateKind, TemplateRecommendation};
