//! Normalization, embeddings, and ranking

pub mod analyzer;
pub mod document;
pub mod embedding_manager;
pub mod embeddings;
pub mod ranker;
pub mod text_processor;
