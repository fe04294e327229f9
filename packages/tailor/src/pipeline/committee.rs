//! Committee evaluation - several personas score a CV independently.
//!
//! A persona call that fails (provider error or unreadable answer) becomes a
//! degraded zero-score result; it never aborts the rest of the committee.
//! The fused `evaluate_complete` call has no such fallback.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, TailorError};
use crate::pipeline::extract::parse_model_json;
use crate::pipeline::prompts::{
    format_complete_evaluation_prompt, format_persona_prompt, persona_system_prompt,
    COMPLETE_EVALUATION_SYSTEM,
};
use crate::traits::ai::{Completion, GenerationClient};
use crate::types::document::join_context;
use crate::types::{
    CommitteeResult, CompleteEvaluation, GenerationParams, Persona, PersonaEvaluation,
    Recommendation, RetrievedDocument, StructuredCandidateData, TailorConfig,
};

/// Runs persona evaluations and the fused evaluation.
pub struct CommitteeEvaluator {
    client: Arc<dyn GenerationClient>,
    persona_params: GenerationParams,
    complete_params: GenerationParams,
    concurrency: usize,
}

/// What a persona is asked to return. Fields are loose because models mix
/// strings and lists, and write scores as `8` or `"8/10"`.
#[derive(Debug, Deserialize)]
struct PersonaResponse {
    score: Value,
    #[serde(default)]
    strengths: Value,
    #[serde(default, alias = "areas_for_improvement")]
    improvements: Value,
    #[serde(default)]
    recommendation: String,
    #[serde(default)]
    reasoning: String,
}

impl CommitteeEvaluator {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self::from_config(client, &TailorConfig::default())
    }

    pub fn from_config(client: Arc<dyn GenerationClient>, config: &TailorConfig) -> Self {
        Self {
            client,
            persona_params: config.persona,
            complete_params: config.complete_evaluation,
            concurrency: config.committee_concurrency.max(1),
        }
    }

    /// Persona calls in flight at once; 1 runs them one after another.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Evaluate as one persona. Never fails: errors become a degraded result.
    pub async fn evaluate_with_persona(
        &self,
        persona: &Persona,
        job: &str,
        candidate: &str,
    ) -> PersonaEvaluation {
        match self.try_evaluate_with_persona(persona, job, candidate).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                warn!(persona = %persona.name, error = %e, "Persona evaluation failed");
                PersonaEvaluation::degraded(&persona.name, e)
            }
        }
    }

    async fn try_evaluate_with_persona(
        &self,
        persona: &Persona,
        job: &str,
        candidate: &str,
    ) -> Result<PersonaEvaluation> {
        let request = Completion::new(
            persona_system_prompt(&persona.description),
            format_persona_prompt(&persona.description, job, candidate),
        )
        .max_tokens(self.persona_params.max_tokens)
        .temperature(self.persona_params.temperature);

        let raw = self.client.complete(request).await?;
        let response: PersonaResponse = parse_model_json(&raw)
            .map_err(|e| TailorError::Evaluation(format!("unreadable persona response: {}", e)))?;

        let score = read_score(&response.score).ok_or_else(|| {
            TailorError::Evaluation(format!("persona score is not numeric: {}", response.score))
        })?;

        debug!(persona = %persona.name, score, "Persona evaluation");
        Ok(PersonaEvaluation {
            persona_name: persona.name.clone(),
            score: score.clamp(1.0, 10.0),
            strengths: flatten_text(response.strengths),
            improvements: flatten_text(response.improvements),
            recommendation: Recommendation::parse_lenient(&response.recommendation),
            reasoning: response.reasoning,
        })
    }

    /// Evaluate with every persona, at most `concurrency` at a time.
    ///
    /// Results are keyed by persona name in the order the personas were
    /// given; a repeated name keeps the last evaluation.
    #[instrument(skip_all, fields(personas = personas.len(), concurrency = self.concurrency))]
    pub async fn evaluate_committee(
        &self,
        job: &str,
        candidate: &str,
        personas: &[Persona],
    ) -> CommitteeResult {
        let evaluations: Vec<PersonaEvaluation> = stream::iter(personas)
            .map(|persona| self.evaluate_with_persona(persona, job, candidate))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut result = CommitteeResult {
            evaluations: IndexMap::with_capacity(evaluations.len()),
        };
        for evaluation in evaluations {
            result
                .evaluations
                .insert(evaluation.persona_name.clone(), evaluation);
        }

        let report = result.report();
        info!(
            evaluated = report.evaluated,
            failed = report.failed,
            average = ?report.average_score,
            "Committee evaluation complete"
        );
        result
    }

    /// One holistic evaluation folding retrieved CV passages into the prompt.
    ///
    /// Any provider or parse failure is an `Evaluation` error.
    #[instrument(skip_all, fields(retrieved = retrieved.len()))]
    pub async fn evaluate_complete(
        &self,
        job: &str,
        candidate_json: &str,
        retrieved: &[RetrievedDocument],
    ) -> Result<CompleteEvaluation> {
        let request = Completion::new(
            COMPLETE_EVALUATION_SYSTEM,
            format_complete_evaluation_prompt(job, candidate_json, &join_context(retrieved)),
        )
        .max_tokens(self.complete_params.max_tokens)
        .temperature(self.complete_params.temperature);

        let raw = self
            .client
            .complete(request)
            .await
            .map_err(|e| TailorError::Evaluation(e.to_string()))?;

        let evaluation: CompleteEvaluation = parse_model_json(&raw).map_err(|e| {
            warn!(error = %e, "Complete evaluation response unreadable");
            TailorError::Evaluation(format!("unreadable evaluation response: {}", e))
        })?;

        info!(overall_score = evaluation.overall_score, "Complete evaluation");
        Ok(evaluation)
    }

    /// [`evaluate_complete`](Self::evaluate_complete) over structured data.
    pub async fn evaluate_candidate(
        &self,
        job: &str,
        candidate: &StructuredCandidateData,
        retrieved: &[RetrievedDocument],
    ) -> Result<CompleteEvaluation> {
        let candidate_json = serde_json::to_string_pretty(candidate)?;
        self.evaluate_complete(job, &candidate_json, retrieved).await
    }
}

/// `8`, `"8"` or `"8/10"`. Non-finite values ("NaN", "inf") are unreadable.
fn read_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches("/10").trim().parse().ok(),
        _ => None,
    };
    score.filter(|s: &f64| s.is_finite())
}

/// Lists are joined with "; " so every field stays a plain string.
fn flatten_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(flatten_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAI;
    use crate::types::Metadata;

    const GOOD: &str = r#"{"score": 8, "strengths": ["Python", "ML"], "improvements": "More MLOps", "recommendation": "Hire", "reasoning": "Solid fit"}"#;

    #[tokio::test]
    async fn test_one_failing_persona_is_isolated() {
        let ai = Arc::new(
            MockAI::new()
                .with_failure("an HR manager", "rate limited")
                .with_default_response(GOOD),
        );
        let evaluator = CommitteeEvaluator::new(ai.clone());

        let result = evaluator
            .evaluate_committee("ML Engineer", "{}", &Persona::default_committee())
            .await;

        assert_eq!(result.len(), 3);
        let names: Vec<_> = result.evaluations.keys().cloned().collect();
        assert_eq!(names, vec!["Technical Recruiter", "HR Manager", "Hiring Manager"]);

        let hr = result.get("HR Manager").unwrap();
        assert_eq!(hr.score, 0.0);
        assert_eq!(hr.recommendation, Recommendation::No);
        assert!(hr.reasoning.contains("rate limited"));

        for name in ["Technical Recruiter", "Hiring Manager"] {
            let eval = result.get(name).unwrap();
            assert_eq!(eval.score, 8.0);
            assert_eq!(eval.recommendation, Recommendation::Hire);
            assert_eq!(eval.strengths, "Python; ML");
        }
        assert_eq!(ai.completions().len(), 3);
    }

    #[tokio::test]
    async fn test_unparseable_persona_response_degrades() {
        let ai = Arc::new(MockAI::new().with_default_response("I think they are great, 9/10."));
        let evaluator = CommitteeEvaluator::new(ai);

        let eval = evaluator
            .evaluate_with_persona(&Persona::new("Recruiter", "a recruiter"), "job", "cv")
            .await;
        assert!(eval.is_degraded());
        assert!(eval.reasoning.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_score_is_clamped_and_parsed_from_text() {
        let ai = Arc::new(
            MockAI::new()
                .with_response("a generous reviewer", r#"{"score": 14, "recommendation": "Strong hire"}"#)
                .with_response("a string scorer", r#"{"score": "7/10", "recommendation": "maybe"}"#),
        );
        let evaluator = CommitteeEvaluator::new(ai);

        let high = evaluator
            .evaluate_with_persona(&Persona::new("A", "a generous reviewer"), "job", "cv")
            .await;
        assert_eq!(high.score, 10.0);
        assert_eq!(high.recommendation, Recommendation::Hire);

        let text = evaluator
            .evaluate_with_persona(&Persona::new("B", "a string scorer"), "job", "cv")
            .await;
        assert_eq!(text.score, 7.0);
        assert_eq!(text.recommendation, Recommendation::Maybe);
    }

    #[tokio::test]
    async fn test_non_finite_score_degrades() {
        let ai = Arc::new(
            MockAI::new()
                .with_response("a nan scorer", r#"{"score": "NaN", "recommendation": "Hire"}"#)
                .with_response("an infinite scorer", r#"{"score": "inf", "recommendation": "Hire"}"#),
        );
        let evaluator = CommitteeEvaluator::new(ai);
        let personas = vec![
            Persona::new("A", "a nan scorer"),
            Persona::new("B", "an infinite scorer"),
        ];

        let result = evaluator.evaluate_committee("job", "cv", &personas).await;
        for eval in result.evaluations.values() {
            assert_eq!(eval.score, 0.0);
            assert_eq!(eval.recommendation, Recommendation::No);
        }
        assert_eq!(result.report().average_score, None);
    }

    #[test]
    fn test_read_score() {
        assert_eq!(read_score(&serde_json::json!(8)), Some(8.0));
        assert_eq!(read_score(&serde_json::json!(" 7/10 ")), Some(7.0));
        assert_eq!(read_score(&serde_json::json!("NaN")), None);
        assert_eq!(read_score(&serde_json::json!("-inf")), None);
        assert_eq!(read_score(&serde_json::json!(null)), None);
    }

    #[tokio::test]
    async fn test_sequential_committee_keeps_order() {
        let ai = Arc::new(MockAI::new().with_default_response(GOOD));
        let evaluator = CommitteeEvaluator::new(ai.clone()).with_concurrency(1);
        let personas = vec![
            Persona::new("Zed", "persona zed"),
            Persona::new("Amy", "persona amy"),
        ];

        let result = evaluator.evaluate_committee("job", "cv", &personas).await;

        let names: Vec<_> = result.evaluations.keys().cloned().collect();
        assert_eq!(names, vec!["Zed", "Amy"]);
        let calls = ai.completions();
        assert!(calls[0].user.contains("persona zed"));
        assert!(calls[1].user.contains("persona amy"));
        assert_eq!(calls[0].max_tokens, 500);
    }

    #[tokio::test]
    async fn test_evaluate_complete_includes_retrieved_context() {
        let ai = Arc::new(MockAI::new().with_default_response(
            r#"```json
{"overall_score": 8.5, "strengths": ["Python"], "weaknesses": [], "recommendations": ["Quantify impact"], "summary": "Good"}
```"#,
        ));
        let evaluator = CommitteeEvaluator::new(ai.clone());

        let mut metadata = Metadata::new();
        metadata.insert("text".into(), "Built ML pipelines in Python".into());
        let retrieved = vec![RetrievedDocument::new(0.9, metadata)];

        let eval = evaluator
            .evaluate_complete("Python ML role", "{}", &retrieved)
            .await
            .unwrap();
        assert_eq!(eval.overall_score, 8.5);
        assert_eq!(eval.recommendations, vec!["Quantify impact"]);

        let calls = ai.completions();
        assert!(calls[0].user.contains("Built ML pipelines in Python"));
        assert_eq!(calls[0].max_tokens, 1500);
    }

    #[tokio::test]
    async fn test_evaluate_complete_failures_propagate() {
        let failing = CommitteeEvaluator::new(Arc::new(MockAI::new().with_failure("", "timeout")));
        assert!(matches!(
            failing.evaluate_complete("job", "{}", &[]).await,
            Err(TailorError::Evaluation(_))
        ));

        let garbled = CommitteeEvaluator::new(Arc::new(
            MockAI::new().with_default_response(r#"{"summary": "no score"}"#),
        ));
        assert!(matches!(
            garbled.evaluate_complete("job", "{}", &[]).await,
            Err(TailorError::Evaluation(_))
        ));
    }

    #[test]
    fn test_flatten_text() {
        assert_eq!(flatten_text(Value::Null), "");
        assert_eq!(
            flatten_text(serde_json::json!(["a", null, "b"])),
            "a; b"
        );
    }
}
