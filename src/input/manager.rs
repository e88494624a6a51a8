//! Input manager for loading job descriptions and candidate resumes

use crate::error::{Result, ResumeRankerError};
use crate::input::file_detector::DocumentFormat;
use crate::input::text_extractor::{self, DocumentSource};
use crate::processing::document::Candidate;
use crate::processing::ranker::SkippedCandidate;
use crate::processing::text_processor::normalize;
use log::{info, warn};
use std::collections::HashMap;
use std::path::PathBuf;

/// Candidate texts ready for ranking, plus the candidates that could not be read.
#[derive(Debug, Default)]
pub struct LoadedCandidates {
    pub candidates: Vec<(String, String)>,
    pub skipped: Vec<SkippedCandidate>,
}

/// Path plus the declared format the text was extracted under.
type CacheKey = (PathBuf, Option<DocumentFormat>);

pub struct InputManager {
    cache: HashMap<CacheKey, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Extract and normalize a document's text.
    ///
    /// A corrupt document that still yielded some text is accepted with a
    /// warning; only a corrupt document with nothing recovered is an error.
    pub async fn extract_text(&mut self, source: &DocumentSource, format: Option<DocumentFormat>) -> Result<String> {
        let cache_key = match source {
            DocumentSource::Path(path) if self.enable_cache => Some((path.clone(), format)),
            _ => None,
        };

        if let Some(key) = &cache_key {
            if let Some(cached_text) = self.cache.get(key) {
                info!("Using cached text for: {}", key.0.display());
                return Ok(cached_text.clone());
            }
        }

        let text = match text_extractor::extract_text(source, format).await {
            Ok(raw) => normalize(&raw),
            Err(ResumeRankerError::CorruptDocument {
                source_name,
                reason,
                recovered,
            }) => {
                let recovered = normalize(&recovered);
                if recovered.is_empty() {
                    return Err(ResumeRankerError::CorruptDocument {
                        source_name,
                        reason,
                        recovered,
                    });
                }
                warn!(
                    "{} is damaged ({}); using {} recovered characters",
                    source_name,
                    reason,
                    recovered.chars().count()
                );
                recovered
            }
            Err(e) => return Err(e),
        };

        if let Some(key) = cache_key {
            self.cache.insert(key, text.clone());
        }

        Ok(text)
    }

    /// Extract every candidate, isolating failures: a candidate that cannot be
    /// read is reported in `skipped` and the rest carry on.
    pub async fn load_candidates(&mut self, candidates: &mut [Candidate]) -> LoadedCandidates {
        let mut loaded = LoadedCandidates::default();

        for candidate in candidates.iter_mut() {
            match candidate.extracted_text(self).await {
                Ok(text) => {
                    let text = text.to_string();
                    loaded.candidates.push((candidate.name.clone(), text));
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", candidate.name, e);
                    loaded.skipped.push(SkippedCandidate {
                        name: candidate.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Loaded {} of {} candidates",
            loaded.candidates.len(),
            loaded.candidates.len() + loaded.skipped.len()
        );
        loaded
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
