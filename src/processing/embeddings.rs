//! Embedding generation with query/passage role prefixes

use crate::error::{Result, ResumeRankerError};
use log::debug;
use std::sync::Arc;
use std::time::Instant;

/// Which side of the retrieval pair a text plays.
///
/// The embedding model was trained with asymmetric prefixes, so the job
/// description and the resumes must carry different markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Query,
    Passage,
}

impl Role {
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::Query => "query: ",
            Role::Passage => "passage: ",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        format!("{}{}", self.prefix(), text.trim())
    }
}

/// Unit-length embedding; cosine similarity between two of these is their dot product.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    /// L2-normalize a raw model output. A zero vector stays zero.
    pub fn from_raw(mut values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 && norm.is_finite() {
            values.iter_mut().for_each(|x| *x /= norm);
        }
        Self(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Dot product, clamped to [-1, 1] to absorb rounding drift.
    pub fn dot(&self, other: &EmbeddingVector) -> Result<f32> {
        if self.dim() != other.dim() {
            return Err(ResumeRankerError::Embedding(format!(
                "Embedding dimensions don't match: {} vs {}",
                self.dim(),
                other.dim()
            )));
        }

        let dot: f32 = self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum();
        Ok(dot.clamp(-1.0, 1.0))
    }
}

/// A backend that turns a batch of texts into raw vectors, one per text, in order.
///
/// Implementations must be pure functions of their input: the same text yields
/// the same vector regardless of which batch it arrives in.
pub trait Embedder: Send + Sync {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;
}

/// Shared, read-only handle to an embedding backend.
#[derive(Clone)]
pub struct EmbeddingEngine {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingEngine {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Embed `texts` under `role`, preserving order.
    pub fn embed(&self, texts: &[String], role: Role) -> Result<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start_time = Instant::now();
        let prefixed: Vec<String> = texts.iter().map(|text| role.apply(text)).collect();
        let raw = self.embedder.encode(&prefixed)?;

        if raw.len() != texts.len() {
            return Err(ResumeRankerError::Embedding(format!(
                "Model returned {} embeddings for {} texts",
                raw.len(),
                texts.len()
            )));
        }

        if let Some(index) = raw.iter().position(|v| v.iter().any(|x| !x.is_finite())) {
            return Err(ResumeRankerError::Embedding(format!(
                "Model returned a non-finite embedding for text {}",
                index
            )));
        }

        let vectors: Vec<EmbeddingVector> = raw.into_iter().map(EmbeddingVector::from_raw).collect();
        let dim = vectors[0].dim();
        if dim == 0 || vectors.iter().any(|v| v.dim() != dim) {
            return Err(ResumeRankerError::Embedding(
                "Model returned empty or inconsistent embedding dimensions".to_string(),
            ));
        }

        debug!(
            "Embedded {} {:?} texts ({} dims) in {:.2?}",
            texts.len(),
            role,
            dim,
            start_time.elapsed()
        );
        Ok(vectors)
    }

    pub fn embed_one(&self, text: &str, role: Role) -> Result<EmbeddingVector> {
        self.embed(&[text.to_string()], role)?
            .into_iter()
            .next()
            .ok_or_else(|| ResumeRankerError::Embedding("No embedding returned".to_string()))
    }
}
