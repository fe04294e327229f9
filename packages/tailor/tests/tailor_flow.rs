//! End-to-end flows over MockAI and the in-memory index.

use std::sync::Arc;

use serde_json::json;
use tailor::testing::{MockAI, MockAICall};
use tailor::{
    CommitteeEvaluator, MemoryIndex, Metadata, Persona, Recommendation, RetrievalPipeline,
    StructuredCandidateData, Tailor, TailorConfig, TemplateKind, TemplateRecommender, TextChunker,
};

const JANE_CV: &str = "Jane Smith, Data Scientist, 6 years, Python, ML";
const JOB: &str = "We are hiring a Data Scientist with strong Python and Machine Learning experience.";

const JANE_EXTRACTION: &str = r#"```json
{
    "personal": {"name": "Jane Smith", "email": null},
    "professional_summary": "Data Scientist with 6 years of experience",
    "experience": [{"role": "Data Scientist", "company": "", "startDate": "2019", "endDate": "Present"}],
    "skills": {"technical": ["Python", "ML"]}
}
```"#;

const JANE_EVALUATION: &str = r#"{
    "overall_score": 8.5,
    "strengths": ["Python", "Machine learning experience"],
    "weaknesses": ["No listed projects"],
    "recommendations": ["Add quantified ML outcomes"],
    "summary": "Strong match for a Python ML role."
}"#;

fn jane_ai() -> Arc<MockAI> {
    Arc::new(
        MockAI::new()
            .with_response("Extract structured data", JANE_EXTRACTION)
            .with_response("hiring committee", JANE_EVALUATION),
    )
}

#[tokio::test]
async fn tailor_produces_structured_data_with_analysis() {
    let ai = jane_ai();
    let index = Arc::new(MemoryIndex::new());
    let tailor = Tailor::new(ai.clone(), ai.clone(), Some(index.clone()), TailorConfig::default())
        .unwrap();

    let tailored = tailor.tailor(JANE_CV, JOB).await.unwrap();

    assert!(tailored.data.personal.name.contains("Jane Smith"));
    assert_eq!(tailored.data.skills.technical, vec!["Python", "ML"]);
    assert_eq!(tailored.analysis.overall_score, 8.5);

    let out = serde_json::to_value(&tailored).unwrap();
    assert_eq!(out["personal"]["name"], "Jane Smith");
    assert_eq!(out["personal"]["email"], "");
    assert!(out["analysis"]["overall_score"].is_number());
    assert_eq!(out["licensesAndCertifications"], json!([]));

    // the retrieved CV chunk reaches the evaluation prompt
    let completions = ai.completions();
    assert_eq!(completions.len(), 2);
    assert!(completions[1].user.contains(JANE_CV));
    assert_eq!(index.len().await, 1);
}

#[tokio::test]
async fn tailor_clears_previous_candidate() {
    let ai = jane_ai();
    let index = Arc::new(MemoryIndex::new());
    let tailor = Tailor::new(ai.clone(), ai.clone(), Some(index.clone()), TailorConfig::default())
        .unwrap();

    let previous = "John Doe, Forklift Operator, warehouse logistics and Python scripting";
    tailor
        .retrieval()
        .index_documents(&["unrelated", previous], &Metadata::new())
        .await
        .unwrap();
    assert_eq!(index.len().await, 2);

    tailor.tailor(JANE_CV, JOB).await.unwrap();

    let completions = ai.completions();
    assert!(!completions[1].user.contains("John Doe"));
    assert!(index.get("doc_1_chunk_0").await.is_none());
}

#[tokio::test]
async fn clear_before_reindex_isolates_documents() {
    let ai = Arc::new(MockAI::new());
    let pipeline = RetrievalPipeline::new(ai, Arc::new(MemoryIndex::new()))
        .with_chunker(TextChunker::new(60, 10).unwrap());

    let doc_a = "Alice Chen. Senior Rust engineer. Built distributed storage systems in Rust.";
    let doc_b = "Bob Stone. Pastry chef. Runs a bakery and teaches sourdough classes.";

    let session = pipeline.begin_session().await.unwrap();
    let session = session.index(doc_b, &Metadata::new()).await.unwrap();
    assert!(!session.retrieve("bakery sourdough", 5).await.unwrap().is_empty());
    drop(session);

    let session = pipeline.begin_session().await.unwrap();
    let session = session.index(doc_a, &Metadata::new()).await.unwrap();
    let results = session.retrieve("bakery sourdough pastry", 10).await.unwrap();

    assert!(!results.is_empty());
    for doc in &results {
        assert!(doc_a.contains(doc.text.as_str()), "stale chunk: {}", doc.text);
    }
}

#[tokio::test]
async fn indexing_same_ids_keeps_latest_content() {
    let ai = Arc::new(MockAI::new());
    let index = Arc::new(MemoryIndex::new());
    let pipeline = RetrievalPipeline::new(ai, index.clone());

    pipeline.index("Version one of the CV", &Metadata::new()).await.unwrap();
    pipeline.index("Version two of the CV", &Metadata::new()).await.unwrap();

    assert_eq!(index.len().await, 1);
    let results = pipeline.retrieve("CV", 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "Version two of the CV");
    assert_eq!(results[0].metadata["chunk_index"], 0);
    assert_eq!(results[0].metadata["total_chunks"], 1);
}

#[tokio::test]
async fn committee_survives_one_failing_persona() {
    let ai = Arc::new(
        MockAI::new()
            .with_failure("a hiring manager", "upstream timeout")
            .with_default_response(
                r#"{"score": 7, "strengths": "Python", "improvements": "Testing", "recommendation": "Maybe", "reasoning": "Decent"}"#,
            ),
    );
    let committee = CommitteeEvaluator::new(ai);

    let result = committee
        .evaluate_committee(JOB, JANE_CV, &Persona::default_committee())
        .await;

    assert_eq!(result.len(), 3);
    let scored: Vec<_> = result.evaluations.values().filter(|e| e.score > 0.0).collect();
    assert_eq!(scored.len(), 2);

    let failed = result.get("Hiring Manager").unwrap();
    assert_eq!(failed.score, 0.0);
    assert_eq!(failed.recommendation, Recommendation::No);
    assert!(failed.reasoning.contains("upstream timeout"));

    let report = result.report();
    assert_eq!(report.failed, 1);
    assert_eq!(report.average_score, Some(7.0));
}

#[tokio::test]
async fn template_recommendation_falls_back_on_provider_error() {
    let ai = Arc::new(MockAI::new().with_failure("CV consultant", "invalid api key"));
    let recommender = TemplateRecommender::new(ai);

    let data: StructuredCandidateData = serde_json::from_value(json!({
        "experience": [
            {"role": "Sales Associate", "startDate": "2015", "endDate": "2017"},
            {"role": "Software Engineer", "startDate": "2020", "endDate": "Present"}
        ]
    }))
    .unwrap();

    let recommendation = recommender.recommend_template(JOB, &data).await;
    assert_eq!(recommendation.recommended_template, TemplateKind::Combination);
    assert_eq!(recommendation.confidence_score, 50.0);

    let out = serde_json::to_value(&recommendation).unwrap();
    assert_eq!(out["recommendedTemplate"], "combination");
    assert_eq!(out["alternatives"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn extract_cv_data_runs_retrieval_then_extraction() {
    let ai = jane_ai();
    let index = Arc::new(MemoryIndex::new());
    let tailor = Tailor::new(ai.clone(), ai.clone(), Some(index.clone()), TailorConfig::default())
        .unwrap();

    let data = tailor.extract_cv_data(JANE_CV, JOB).await.unwrap();

    assert_eq!(data.personal.name, "Jane Smith");
    assert_eq!(data.skills.languages, Vec::<String>::new());
    assert_eq!(index.len().await, 1);

    // the CV chunk is embedded, then the job as query, then one extraction call
    let calls = ai.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], MockAICall::Embed { text: JANE_CV.to_string() });
    assert_eq!(calls[1], MockAICall::Embed { text: JOB.to_string() });
    assert!(matches!(&calls[2], MockAICall::Complete(c) if c.user.contains(JANE_CV)));
}

#[tokio::test]
async fn repeated_tailoring_makes_the_same_calls() {
    let ai = jane_ai();
    let tailor = Tailor::new(
        ai.clone(),
        ai.clone(),
        Some(Arc::new(MemoryIndex::new())),
        TailorConfig::default(),
    )
    .unwrap();

    tailor.tailor(JANE_CV, JOB).await.unwrap();
    let first = ai.calls();
    ai.clear_calls();
    assert!(ai.calls().is_empty());

    tailor.tailor(JANE_CV, JOB).await.unwrap();
    assert_eq!(ai.calls(), first);
}
