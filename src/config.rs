//! Configuration management for the resume ranker

use crate::error::{Result, ResumeRankerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub ranking: RankingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Hugging Face repo id, or a directory name under `models_dir`
    pub model: String,
    pub models_dir: PathBuf,
    pub batch_size: usize,
    pub max_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-ranker")
            .join("models");

        Self {
            embedding: EmbeddingConfig {
                model: "minishlab/potion-retrieval-32M".to_string(),
                models_dir,
                batch_size: 32,
                max_tokens: 512,
            },
            ranking: RankingConfig { top_k: 10 },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location (created with defaults if missing).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::load_from(&default_path)?
                } else {
                    let config = Self::default();
                    config.save_to(&default_path)?;
                    config
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ResumeRankerError::Configuration(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ResumeRankerError::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeRankerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write the defaults to `path`, or to the default location. Returns the file written.
    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        Self::default().save_to(&path)?;
        Ok(path)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-ranker")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding.model.trim().is_empty() {
            return Err(ResumeRankerError::Configuration(
                "embedding.model must not be empty".to_string(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(ResumeRankerError::Configuration(
                "embedding.batch_size must be at least 1".to_string(),
            ));
        }
        if self.ranking.top_k == 0 {
            return Err(ResumeRankerError::Configuration(
                "ranking.top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the embedding model: a downloaded copy under `models_dir` wins over the hub id.
    pub fn resolve_model_source(&self, model: &str) -> PathBuf {
        let local_path = self.embedding.models_dir.join(model);
        if local_path.exists() {
            local_path
        } else {
            PathBuf::from(model)
        }
    }
}
