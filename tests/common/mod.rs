//! Shared helpers for integration tests

#![allow(dead_code)]

use resume_ranker::processing::embeddings::Embedder;
use resume_ranker::Result;
use std::io::{Cursor, Write};

/// Deterministic embedder: one dimension per vocabulary word, counting occurrences.
pub struct KeywordEmbedder {
    vocab: Vec<String>,
}

impl KeywordEmbedder {
    pub fn new(vocab: &[&str]) -> Self {
        Self {
            vocab: vocab.iter().map(|w| w.to_lowercase()).collect(),
        }
    }
}

impl Embedder for KeywordEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let words: Vec<String> = text
                    .split(|c: char| !c.is_alphanumeric() && c != '-')
                    .map(|w| w.to_lowercase())
                    .collect();
                self.vocab
                    .iter()
                    .map(|v| words.iter().filter(|w| *w == v).count() as f32)
                    .collect()
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
