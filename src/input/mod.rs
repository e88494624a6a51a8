//! Input processing module
//! Handles file detection, text extraction, and candidate loading

pub mod file_detector;
pub mod manager;
pub mod text_extractor;
