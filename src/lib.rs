//! Resume ranker library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, ResumeRankerError};
pub use processing::analyzer::RankingEngine;
pub use processing::document::Candidate;
pub use processing::ranker::{RankedCandidate, RankedResult, Ranker, SkippedCandidate};
