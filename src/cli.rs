//! CLI interface for the resume ranker

use crate::processing::document::Candidate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-ranker")]
#[command(about = "Rank candidate resumes against a job description")]
#[command(long_about = "Rank .txt, .pdf and .docx resumes by semantic similarity to a job description using text embeddings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank candidates against a job description
    Rank(RankArgs),

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Args)]
pub struct RankArgs {
    /// Job description file (TXT, PDF, DOCX)
    #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
    pub job: Option<PathBuf>,

    /// Job description given inline
    #[arg(long)]
    pub job_text: Option<String>,

    /// Candidate resume as NAME=PATH, or just PATH to name it after the file
    #[arg(short = 'C', long = "candidate", required = true)]
    pub candidates: Vec<String>,

    /// Number of candidates to return (defaults to ranking.top_k from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Embedding model to use (Hugging Face repo id or local model directory name)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output format: console, json, markdown
    #[arg(short, long)]
    pub output: Option<String>,

    /// Save output to file instead of printing it
    #[arg(short, long)]
    pub save: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse a `NAME=PATH` or bare `PATH` candidate argument.
pub fn parse_candidate_arg(arg: &str) -> Result<Candidate, String> {
    let (name, path) = match arg.split_once('=') {
        Some((name, path)) => (name.trim().to_string(), PathBuf::from(path.trim())),
        None => {
            let path = PathBuf::from(arg.trim());
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default();
            (name, path)
        }
    };

    if name.is_empty() {
        return Err(format!("Candidate '{}' has no name", arg));
    }
    if path.as_os_str().is_empty() {
        return Err(format!("Candidate '{}' has no file path", name));
    }

    Ok(Candidate::from_path(name, path))
}

pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
