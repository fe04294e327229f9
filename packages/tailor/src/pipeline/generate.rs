//! Free-text CV writing: from raw experience, or by improving an existing CV.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::Result;
use crate::pipeline::prompts::{
    format_generate_prompt, format_improve_prompt, GENERATE_SYSTEM, IMPROVE_SYSTEM,
};
use crate::traits::ai::{Completion, GenerationClient};
use crate::types::{GenerationParams, TailorConfig};

pub struct CvWriter {
    client: Arc<dyn GenerationClient>,
    params: GenerationParams,
}

impl CvWriter {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self::from_config(client, &TailorConfig::default())
    }

    pub fn from_config(client: Arc<dyn GenerationClient>, config: &TailorConfig) -> Self {
        Self {
            client,
            params: config.generate,
        }
    }

    /// Write a CV for `job` from a description of the user's experience.
    #[instrument(skip_all, fields(experience_len = experience.len()))]
    pub async fn generate_cv(&self, job: &str, experience: &str) -> Result<String> {
        let cv = self
            .run(GENERATE_SYSTEM, format_generate_prompt(job, experience))
            .await?;
        info!(cv_len = cv.len(), "Generated CV");
        Ok(cv)
    }

    /// Rewrite `existing_cv` to fit `job`.
    #[instrument(skip_all, fields(cv_len = existing_cv.len()))]
    pub async fn improve_cv(&self, existing_cv: &str, job: &str) -> Result<String> {
        let cv = self
            .run(IMPROVE_SYSTEM, format_improve_prompt(existing_cv, job))
            .await?;
        info!(cv_len = cv.len(), "Improved CV");
        Ok(cv)
    }

    async fn run(&self, system: &str, user: String) -> Result<String> {
        let request = Completion::new(system, user)
            .max_tokens(self.params.max_tokens)
            .temperature(self.params.temperature);
        Ok(self.client.complete(request).await?.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TailorError;
    use crate::testing::MockAI;

    #[tokio::test]
    async fn test_generate_and_improve_use_their_prompts() {
        let ai = Arc::new(
            MockAI::new()
                .with_response("Generate tailored CVs", "# Jane Smith\nData Scientist")
                .with_response("Improve and tailor existing CVs", "# Jane Smith (improved)"),
        );
        let writer = CvWriter::new(ai.clone());

        let generated = writer
            .generate_cv("ML Engineer", "6 years of Python and ML")
            .await
            .unwrap();
        assert!(generated.starts_with("# Jane Smith"));

        let improved = writer.improve_cv("Jane Smith CV", "ML Engineer").await.unwrap();
        assert_eq!(improved, "# Jane Smith (improved)");

        let calls = ai.completions();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].user.contains("6 years of Python and ML"));
        assert!(calls[1].user.contains("Existing CV Content:\nJane Smith CV"));
        assert!(calls.iter().all(|c| c.max_tokens == 2000));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let writer = CvWriter::new(Arc::new(MockAI::new().with_failure("", "quota exceeded")));
        assert!(matches!(
            writer.generate_cv("job", "exp").await,
            Err(TailorError::Provider(_))
        ));
    }
}
