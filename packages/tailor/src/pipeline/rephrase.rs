//! Section rephrasing.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::Result;
use crate::pipeline::prompts::format_rephrase_prompt;
use crate::traits::ai::{Completion, GenerationClient};
use crate::types::{GenerationParams, TailorConfig};

/// CV section kinds with their own rewrite instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionType {
    ProfessionalSummary,
    Experience,
    Project,
    Education,
    Skills,
    Certification,
    /// Anything else; rewritten with the generic instruction
    Other(String),
}

impl SectionType {
    /// Accepts `professional-summary` and `professional_summary` spellings,
    /// case-insensitively. Never fails.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "professional-summary" | "summary" => Self::ProfessionalSummary,
            "experience" => Self::Experience,
            "project" | "projects" => Self::Project,
            "education" => Self::Education,
            "skills" => Self::Skills,
            "certification" | "certifications" => Self::Certification,
            _ => Self::Other(name.trim().to_string()),
        }
    }

    /// System instruction for this section.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::ProfessionalSummary => "You are a professional CV writer. Rephrase this professional summary to better align with the target job requirements while keeping it truthful.",
            Self::Experience => "You are a professional CV writer. Rephrase this work experience description to better highlight relevant skills and achievements for the target job.",
            Self::Project => "You are a professional CV writer. Rephrase this project description to better showcase relevant technical skills and impact for the target job.",
            Self::Education => "You are a professional CV writer. Rephrase this education section to better emphasize relevant coursework, achievements, or projects for the target job.",
            Self::Skills => "You are a professional CV writer. Rephrase and reorganize these skills to better match the target job requirements, most relevant first.",
            Self::Certification => "You are a professional CV writer. Rephrase this certification description to better emphasize its relevance to the target job.",
            Self::Other(_) => "You are a professional CV writer. Rephrase this CV section to better align with the target job requirements.",
        }
    }

    /// Title-cased label used in the prompt ("Professional Summary").
    pub fn label(&self) -> String {
        let raw = match self {
            Self::ProfessionalSummary => "professional summary",
            Self::Experience => "experience",
            Self::Project => "project",
            Self::Education => "education",
            Self::Skills => "skills",
            Self::Certification => "certification",
            Self::Other(name) => name.as_str(),
        };
        raw.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Rewrites one CV section for a target job.
pub struct SectionRephraser {
    client: Arc<dyn GenerationClient>,
    params: GenerationParams,
}

impl SectionRephraser {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self::from_config(client, &TailorConfig::default())
    }

    pub fn from_config(client: Arc<dyn GenerationClient>, config: &TailorConfig) -> Self {
        Self {
            client,
            params: config.rephrase,
        }
    }

    /// Rephrase `content`, returning the trimmed answer. Provider failures propagate.
    #[instrument(skip(self, content, job), fields(content_len = content.len()))]
    pub async fn rephrase_section(
        &self,
        content: &str,
        section: &SectionType,
        job: &str,
    ) -> Result<String> {
        let instruction = section.instruction();
        let request = Completion::new(
            instruction,
            format_rephrase_prompt(instruction, &section.label(), job, content),
        )
        .max_tokens(self.params.max_tokens)
        .temperature(self.params.temperature);

        let rephrased = self.client.complete(request).await?.trim().to_string();

        debug!(before = content.len(), after = rephrased.len(), "Rephrased section");
        Ok(rephrased)
    }
}
