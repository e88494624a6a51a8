//! Ranking report structures

use crate::processing::ranker::{RankedCandidate, RankedResult, SkippedCandidate};
use serde::{Deserialize, Serialize};

/// Everything a front end needs to show the outcome of one ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    pub job_description: String,
    pub top_k: usize,
    pub candidates_considered: usize,
    pub entries: Vec<RankedCandidate>,
    pub skipped: Vec<SkippedCandidate>,
    pub embedding_model: String,
    pub processing_time_ms: u64,
}

impl RankingReport {
    pub fn new(
        job_description: String,
        top_k: usize,
        candidates_considered: usize,
        result: RankedResult,
        embedding_model: String,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            job_description,
            top_k,
            candidates_considered,
            entries: result.entries,
            skipped: result.skipped,
            embedding_model,
            processing_time_ms,
        }
    }

    pub fn best(&self) -> Option<&RankedCandidate> {
        self.entries.first()
    }

    /// Short preview of the job description for headers
    pub fn job_preview(&self, max_chars: usize) -> String {
        if self.job_description.chars().count() <= max_chars {
            return self.job_description.clone();
        }

        let truncated: String = self.job_description.chars().take(max_chars).collect();
        match truncated.rfind(' ') {
            Some(idx) if idx > 0 => format!("{}...", &truncated[..idx]),
            _ => format!("{}...", truncated),
        }
    }
}
