//! Error handling for the resume ranker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeRankerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    /// Parsing failed part-way through; `recovered` holds whatever text was read before the failure.
    #[error("Corrupt document '{source_name}': {reason}")]
    CorruptDocument {
        source_name: String,
        reason: String,
        recovered: String,
    },

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Job description is empty")]
    EmptyJobDescription,

    #[error("No candidates with readable text")]
    NoCandidates,

    #[error("top_k must be a positive integer, got {0}")]
    InvalidTopK(usize),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

impl ResumeRankerError {
    /// Errors that only affect a single candidate; siblings keep going.
    pub fn is_candidate_level(&self) -> bool {
        matches!(
            self,
            ResumeRankerError::Io(_)
                | ResumeRankerError::NotFound(_)
                | ResumeRankerError::UnsupportedFormat(_)
                | ResumeRankerError::CorruptDocument { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ResumeRankerError>;

/// model2vec reports failures through anyhow
impl From<anyhow::Error> for ResumeRankerError {
    fn from(err: anyhow::Error) -> Self {
        ResumeRankerError::Embedding(err.to_string())
    }
}
