//! Lazy loading of the Model2Vec embedding model

use crate::config::Config;
use crate::error::{Result, ResumeRankerError};
use crate::processing::embeddings::Embedder;
use log::{info, warn};
use model2vec_rs::model::StaticModel;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::time::Instant;

/// Model2Vec backend that loads its weights on first use.
///
/// Construction is cheap. The first `encode` pays the load (hub download or
/// local read); later calls reuse the same model. A failed load is reported
/// as `ModelUnavailable` and attempted again only when the caller calls again.
pub struct LazyStaticModel {
    model_name: String,
    source: PathBuf,
    batch_size: usize,
    max_tokens: usize,
    model: OnceCell<StaticModel>,
}

impl LazyStaticModel {
    pub fn new(model_name: impl Into<String>, source: impl Into<PathBuf>, batch_size: usize, max_tokens: usize) -> Self {
        Self {
            model_name: model_name.into(),
            source: source.into(),
            batch_size: batch_size.max(1),
            max_tokens,
            model: OnceCell::new(),
        }
    }

    /// Backend for the configured model, or `model_override` when given.
    pub fn from_config(config: &Config, model_override: Option<&str>) -> Self {
        let model_name = model_override.unwrap_or(&config.embedding.model);
        let source = config.resolve_model_source(model_name);
        Self::new(model_name, source, config.embedding.batch_size, config.embedding.max_tokens)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    fn model(&self) -> Result<&StaticModel> {
        self.model.get_or_try_init(|| {
            let start_time = Instant::now();
            info!("Loading embedding model {} from {}", self.model_name, self.source.display());

            let model = StaticModel::from_pretrained(&self.source, None, Some(true), None).map_err(|e| {
                warn!("Embedding model {} failed to load: {}", self.model_name, e);
                ResumeRankerError::ModelUnavailable(format!("{}: {}", self.model_name, e))
            })?;

            info!("Model loaded successfully in {:.2?}", start_time.elapsed());
            Ok(model)
        })
    }
}

impl Embedder for LazyStaticModel {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = self.model()?;
        Ok(model.encode_with_args(texts, Some(self.max_tokens), self.batch_size))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
