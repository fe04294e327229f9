//! Extraction pipeline - free-text CV to [`StructuredCandidateData`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, TailorError};
use crate::pipeline::prompts::{format_extract_prompt, EXTRACT_SYSTEM};
use crate::traits::ai::{Completion, GenerationClient};
use crate::types::{GenerationParams, StructuredCandidateData, TailorConfig};

/// Remove a leading ```` ```json ```` / ```` ``` ```` fence and a trailing
/// ```` ``` ```` if the model wrapped its answer in markdown.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string (`json`, `JSON`, ...) up to the first newline.
        text = match rest.find('\n') {
            Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => {
                &rest[newline + 1..]
            }
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Strip fences and parse model output as JSON.
pub(crate) fn parse_model_json<T: DeserializeOwned>(raw: &str) -> serde_json::Result<T> {
    serde_json::from_str(strip_code_fences(raw))
}

/// Make a parsed model response total over the candidate schema.
///
/// Missing keys get their empty default, `null` and scalar leaves are
/// coerced, and malformed list entries are dropped. Only a value that is not
/// a JSON object is rejected.
pub fn normalize_candidate_data(value: Value) -> Result<StructuredCandidateData> {
    if !value.is_object() {
        let kind = match value {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        };
        return Err(TailorError::ExtractionFormat(format!(
            "expected a JSON object, got {}",
            kind
        )));
    }

    serde_json::from_value(value).map_err(|e| TailorError::ExtractionFormat(e.to_string()))
}

/// Turns candidate text into structured data with one generation call.
pub struct ExtractionPipeline {
    client: Arc<dyn GenerationClient>,
    params: GenerationParams,
}

impl ExtractionPipeline {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            params: TailorConfig::default().extraction,
        }
    }

    pub fn from_config(client: Arc<dyn GenerationClient>, config: &TailorConfig) -> Self {
        Self {
            client,
            params: config.extraction,
        }
    }

    /// Extract `candidate_text`, using `context` (usually the job
    /// description) to steer what counts as relevant.
    #[instrument(skip_all, fields(text_len = candidate_text.len()))]
    pub async fn extract(
        &self,
        candidate_text: &str,
        context: &str,
    ) -> Result<StructuredCandidateData> {
        let request = Completion::new(EXTRACT_SYSTEM, format_extract_prompt(candidate_text, context))
            .max_tokens(self.params.max_tokens)
            .temperature(self.params.temperature);

        let raw = self.client.complete(request).await?;
        debug!(response_len = raw.len(), "Extraction response received");

        let value: Value = parse_model_json(&raw).map_err(|e| {
            warn!(error = %e, "Extraction response is not valid JSON");
            TailorError::ExtractionFormat(e.to_string())
        })?;

        let data = normalize_candidate_data(value)?;
        info!(
            experience = data.experience.len(),
            education = data.education.len(),
            projects = data.projects.len(),
            "Extracted candidate data"
        );
        Ok(data)
    }
}
