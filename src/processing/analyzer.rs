//! Ranking engine tying extraction, embeddings, and similarity ranking together

use crate::config::Config;
use crate::error::{Result, ResumeRankerError};
use crate::input::manager::InputManager;
use crate::input::text_extractor::DocumentSource;
use crate::output::report::RankingReport;
use crate::processing::document::Candidate;
use crate::processing::embedding_manager::LazyStaticModel;
use crate::processing::embeddings::{Embedder, EmbeddingEngine};
use crate::processing::ranker::Ranker;
use crate::processing::text_processor::normalize;
use log::info;
use std::sync::Arc;
use std::time::Instant;

/// Runs one ranking request end to end.
///
/// The embedding engine is handed in explicitly and may be shared across
/// engines; the job description is a per-call argument.
pub struct RankingEngine {
    embeddings: EmbeddingEngine,
    input_manager: InputManager,
}

impl RankingEngine {
    pub fn new(embeddings: EmbeddingEngine) -> Self {
        Self {
            embeddings,
            input_manager: InputManager::new(),
        }
    }

    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        Self::new(EmbeddingEngine::new(embedder))
    }

    /// Engine backed by the configured Model2Vec model. The model loads on the first ranking call.
    pub fn from_config(config: &Config, model_override: Option<&str>) -> Self {
        Self::with_embedder(Arc::new(LazyStaticModel::from_config(config, model_override)))
    }

    pub fn embeddings(&self) -> &EmbeddingEngine {
        &self.embeddings
    }

    pub fn input_manager(&mut self) -> &mut InputManager {
        &mut self.input_manager
    }

    /// Rank `candidates` against `job_description`, returning at most `top_k` rows.
    ///
    /// Request-level problems (bad `top_k`, empty job description, nothing
    /// readable, model failure) abort the call. Unreadable candidates are
    /// listed in the report's `skipped` section.
    pub async fn rank(
        &mut self,
        job_description: &str,
        candidates: &mut [Candidate],
        top_k: usize,
    ) -> Result<RankingReport> {
        let start_time = Instant::now();

        if top_k == 0 {
            return Err(ResumeRankerError::InvalidTopK(top_k));
        }

        let job_description = normalize(job_description);
        if job_description.is_empty() {
            return Err(ResumeRankerError::EmptyJobDescription);
        }

        info!("Ranking {} candidates (top {})", candidates.len(), top_k);
        let loaded = self.input_manager.load_candidates(candidates).await;
        if loaded.candidates.is_empty() {
            return Err(ResumeRankerError::NoCandidates);
        }

        let mut result = Ranker::new(&self.embeddings).rank(&job_description, &loaded.candidates, top_k)?;

        let mut skipped = loaded.skipped;
        skipped.append(&mut result.skipped);
        result.skipped = skipped;

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Ranking finished in {}ms: {} ranked, {} skipped",
            processing_time_ms,
            result.entries.len(),
            result.skipped.len()
        );

        Ok(RankingReport::new(
            job_description,
            top_k,
            candidates.len(),
            result,
            self.embeddings.model_name().to_string(),
            processing_time_ms,
        ))
    }

    /// Read a job description from a file in any supported format.
    pub async fn load_job_description(&mut self, source: &DocumentSource) -> Result<String> {
        self.input_manager.extract_text(source, None).await
    }
}
