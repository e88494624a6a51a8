//! Candidate documents

use crate::error::Result;
use crate::input::file_detector::DocumentFormat;
use crate::input::manager::InputManager;
use crate::input::text_extractor::DocumentSource;
use crate::processing::text_processor::normalize;
use std::path::PathBuf;

/// A resume to be ranked. The extracted text is computed on first request and kept.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub source: DocumentSource,
    /// Declared format; when absent it is taken from the file extension
    pub format: Option<DocumentFormat>,
    extracted_text: Option<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, source: DocumentSource) -> Self {
        Self {
            name: name.into(),
            source,
            format: None,
            extracted_text: None,
        }
    }

    pub fn from_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(name, DocumentSource::Path(path.into()))
    }

    pub fn from_bytes(name: impl Into<String>, file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::new(
            name,
            DocumentSource::Bytes {
                name: file_name.into(),
                data,
            },
        )
    }

    /// Candidate whose text is already known, e.g. pasted rather than uploaded.
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        let text = text.into();
        Self {
            source: DocumentSource::Bytes {
                name: format!("{}.txt", name),
                data: text.clone().into_bytes(),
            },
            name,
            format: Some(DocumentFormat::PlainText),
            extracted_text: Some(normalize(&text)),
        }
    }

    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Normalized text of the resume, extracting it on first use.
    pub async fn extracted_text(&mut self, input_manager: &mut InputManager) -> Result<&str> {
        if self.extracted_text.is_none() {
            let text = input_manager.extract_text(&self.source, self.format).await?;
            self.extracted_text = Some(text);
        }
        Ok(self.extracted_text.as_deref().unwrap_or_default())
    }

    pub fn cached_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }
}
