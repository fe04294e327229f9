//! End-to-end tailoring: index the CV, retrieve what matters for the job,
//! extract structured data, and attach a fused evaluation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::Result;
use crate::pipeline::chunker::TextChunker;
use crate::pipeline::committee::CommitteeEvaluator;
use crate::pipeline::extract::ExtractionPipeline;
use crate::pipeline::generate::CvWriter;
use crate::pipeline::recommend::TemplateRecommender;
use crate::pipeline::rephrase::SectionRephraser;
use crate::pipeline::retrieval::RetrievalPipeline;
use crate::traits::ai::{EmbeddingProvider, GenerationClient};
use crate::traits::store::VectorIndex;
use crate::types::{
    CompleteEvaluation, Metadata, RetrievedDocument, StructuredCandidateData, TailorConfig,
};

/// Structured CV data with its evaluation attached under `analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredCv {
    #[serde(flatten)]
    pub data: StructuredCandidateData,
    pub analysis: CompleteEvaluation,
}

/// Every tailoring operation behind one handle.
pub struct Tailor {
    retrieval: RetrievalPipeline,
    extraction: ExtractionPipeline,
    committee: CommitteeEvaluator,
    rephraser: SectionRephraser,
    recommender: TemplateRecommender,
    writer: CvWriter,
    config: TailorConfig,
}

impl Tailor {
    /// Fails only on invalid chunking parameters. A `None` index is allowed;
    /// retrieval-backed operations then fail with `IndexUnavailable`.
    pub fn new(
        client: Arc<dyn GenerationClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Option<Arc<dyn VectorIndex>>,
        config: TailorConfig,
    ) -> Result<Self> {
        let chunker = TextChunker::from_config(&config)?;
        let retrieval = match index {
            Some(index) => RetrievalPipeline::new(embedder, index),
            None => RetrievalPipeline::without_index(embedder),
        }
        .with_chunker(chunker);

        Ok(Self {
            retrieval,
            extraction: ExtractionPipeline::from_config(client.clone(), &config),
            committee: CommitteeEvaluator::from_config(client.clone(), &config),
            rephraser: SectionRephraser::from_config(client.clone(), &config),
            recommender: TemplateRecommender::from_config(client.clone(), &config),
            writer: CvWriter::from_config(client, &config),
            config,
        })
    }

    pub fn config(&self) -> &TailorConfig {
        &self.config
    }

    pub fn retrieval(&self) -> &RetrievalPipeline {
        &self.retrieval
    }

    pub fn extraction(&self) -> &ExtractionPipeline {
        &self.extraction
    }

    pub fn committee(&self) -> &CommitteeEvaluator {
        &self.committee
    }

    pub fn rephraser(&self) -> &SectionRephraser {
        &self.rephraser
    }

    pub fn recommender(&self) -> &TemplateRecommender {
        &self.recommender
    }

    pub fn writer(&self) -> &CvWriter {
        &self.writer
    }

    /// Clear the index, index `cv_text` alone, and retrieve for `job`.
    /// The session lock is released before returning.
    async fn retrieve_for(&self, cv_text: &str, job: &str) -> Result<Vec<RetrievedDocument>> {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), "cv".into());

        let session = self.retrieval.begin_session().await?;
        let session = session.index(cv_text, &metadata).await?;
        session.retrieve(job, self.config.retrieval_k).await
    }

    /// Index, retrieve, extract, evaluate. Any failure aborts the whole call.
    #[instrument(skip_all, fields(cv_len = cv_text.len(), job_len = job.len()))]
    pub async fn tailor(&self, cv_text: &str, job: &str) -> Result<TailoredCv> {
        let retrieved = self.retrieve_for(cv_text, job).await?;
        info!(retrieved = retrieved.len(), "Retrieved CV context");

        let data = self.extraction.extract(cv_text, job).await?;
        let analysis = self
            .committee
            .evaluate_candidate(job, &data, &retrieved)
            .await?;

        info!(overall_score = analysis.overall_score, "Tailored CV");
        Ok(TailoredCv { data, analysis })
    }

    /// The retrieval prelude of [`tailor`](Self::tailor) followed by
    /// extraction only. The index is left holding this CV.
    #[instrument(skip_all, fields(cv_len = cv_text.len()))]
    pub async fn extract_cv_data(&self, cv_text: &str, job: &str) -> Result<StructuredCandidateData> {
        let retrieved = self.retrieve_for(cv_text, job).await?;
        info!(retrieved = retrieved.len(), "Retrieved CV context");

        self.extraction.extract(cv_text, job).await
    }
}
