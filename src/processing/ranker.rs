//! Similarity ranking of candidates against a job description

use crate::error::{Result, ResumeRankerError};
use crate::processing::embeddings::{EmbeddingEngine, Role};
use crate::processing::text_processor::normalize;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// 1-based position in the ranking
    pub rank: usize,
    pub name: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub entries: Vec<RankedCandidate>,
    pub skipped: Vec<SkippedCandidate>,
}

pub struct Ranker<'a> {
    engine: &'a EmbeddingEngine,
}

impl<'a> Ranker<'a> {
    pub fn new(engine: &'a EmbeddingEngine) -> Self {
        Self { engine }
    }

    /// Rank `(name, text)` candidates by similarity to `job_description`.
    ///
    /// Candidates whose text normalizes to nothing are skipped, not scored.
    /// Equal similarities keep their input order.
    pub fn rank(&self, job_description: &str, candidates: &[(String, String)], top_k: usize) -> Result<RankedResult> {
        if top_k == 0 {
            return Err(ResumeRankerError::InvalidTopK(top_k));
        }

        let job_description = normalize(job_description);
        if job_description.is_empty() {
            return Err(ResumeRankerError::EmptyJobDescription);
        }

        let mut names = Vec::with_capacity(candidates.len());
        let mut texts = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();

        for (name, text) in candidates {
            let text = normalize(text);
            if text.is_empty() {
                warn!("Skipping candidate '{}': no readable text", name);
                skipped.push(SkippedCandidate {
                    name: name.clone(),
                    reason: "no readable text".to_string(),
                });
                continue;
            }
            names.push(name);
            texts.push(text);
        }

        if texts.is_empty() {
            return Err(ResumeRankerError::NoCandidates);
        }

        let query = self.engine.embed_one(&job_description, Role::Query)?;
        let passages = self.engine.embed(&texts, Role::Passage)?;

        let mut scored = Vec::with_capacity(passages.len());
        for (name, passage) in names.into_iter().zip(passages.iter()) {
            scored.push((name, query.dot(passage)?));
        }

        // sort_by is stable, so exact ties keep input order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let entries: Vec<RankedCandidate> = scored
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(i, (name, similarity))| RankedCandidate {
                rank: i + 1,
                name: name.clone(),
                similarity,
            })
            .collect();

        debug!(
            "Ranked {} candidates, returning top {} ({} skipped)",
            texts.len(),
            entries.len(),
            skipped.len()
        );

        Ok(RankedResult { entries, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::Embedder;
    use std::sync::Arc;

    /// Counts occurrences of a fixed vocabulary; ignores the role prefix words.
    struct VocabEmbedder {
        vocab: Vec<&'static str>,
    }

    impl Embedder for VocabEmbedder {
        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let lower = text.to_lowercase();
                    self.vocab
                        .iter()
                        .map(|word| lower.split_whitespace().filter(|w| w == word).count() as f32)
                        .collect()
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "vocab"
        }
    }

    fn engine() -> EmbeddingEngine {
        EmbeddingEngine::new(Arc::new(VocabEmbedder {
            vocab: vec!["rust", "kafka", "distributed", "react", "css"],
        }))
    }

    fn candidates(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(n, t)| (n.to_string(), t.to_string())).collect()
    }

    #[test]
    fn test_orders_by_similarity() {
        let engine = engine();
        let result = Ranker::new(&engine)
            .rank(
                "rust kafka distributed",
                &candidates(&[("ui", "react css"), ("half", "rust react"), ("full", "rust kafka distributed")]),
                3,
            )
            .unwrap();

        let names: Vec<&str> = result.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["full", "half", "ui"]);
        assert_eq!(result.entries[0].rank, 1);
        assert!((result.entries[0].similarity - 1.0).abs() < 1e-6);
        assert_eq!(result.entries[2].similarity, 0.0);
    }

    #[test]
    fn test_top_k_truncates() {
        let engine = engine();
        let result = Ranker::new(&engine)
            .rank("rust", &candidates(&[("a", "rust"), ("b", "kafka"), ("c", "css")]), 2)
            .unwrap();
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].name, "a");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let engine = engine();
        let result = Ranker::new(&engine)
            .rank(
                "rust",
                &candidates(&[("first", "css"), ("second", "rust"), ("third", "react"), ("fourth", "rust")]),
                4,
            )
            .unwrap();

        let names: Vec<&str> = result.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["second", "fourth", "first", "third"]);
    }

    #[test]
    fn test_empty_text_skipped_without_affecting_others() {
        let engine = engine();
        let ranker = Ranker::new(&engine);
        let base = candidates(&[("a", "rust kafka"), ("b", "react")]);
        let with_blank = candidates(&[("a", "rust kafka"), ("blank", " \n\0 "), ("b", "react")]);

        let expected = ranker.rank("rust kafka", &base, 5).unwrap();
        let actual = ranker.rank("rust kafka", &with_blank, 5).unwrap();

        assert_eq!(actual.entries, expected.entries);
        assert_eq!(actual.skipped.len(), 1);
        assert_eq!(actual.skipped[0].name, "blank");
    }

    #[test]
    fn test_invalid_inputs() {
        let engine = engine();
        let ranker = Ranker::new(&engine);
        let some = candidates(&[("a", "rust")]);

        assert!(matches!(ranker.rank("rust", &some, 0), Err(ResumeRankerError::InvalidTopK(0))));
        assert!(matches!(ranker.rank("", &some, 3), Err(ResumeRankerError::EmptyJobDescription)));
        assert!(matches!(ranker.rank(" \t\0", &some, 3), Err(ResumeRankerError::EmptyJobDescription)));
        assert!(matches!(ranker.rank("rust", &[], 3), Err(ResumeRankerError::NoCandidates)));
        assert!(matches!(
            ranker.rank("rust", &candidates(&[("a", ""), ("b", "  ")]), 3),
            Err(ResumeRankerError::NoCandidates)
        ));
    }

    #[test]
    fn test_similarities_within_bounds() {
        let engine = engine();
        let result = Ranker::new(&engine)
            .rank(
                "rust rust kafka css",
                &candidates(&[("a", "rust"), ("b", "css css css"), ("c", "distributed"), ("d", "kafka rust css")]),
                10,
            )
            .unwrap();

        assert_eq!(result.entries.len(), 4);
        for pair in result.entries.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        for entry in &result.entries {
            assert!((-1.0..=1.0).contains(&entry.similarity));
        }
    }
}
