//! File type detection

use crate::error::{Result, ResumeRankerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub const SUPPORTED_EXTENSIONS: [&'static str; 3] = ["txt", "pdf", "docx"];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(DocumentFormat::PlainText),
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    /// Detect the format of a path or upload name from its extension.
    pub fn detect(name: &Path) -> Result<Self> {
        let extension = name.extension().and_then(|ext| ext.to_str()).ok_or_else(|| {
            ResumeRankerError::UnsupportedFormat(format!("File has no extension: {}", name.display()))
        })?;

        Self::from_extension(extension).ok_or_else(|| {
            ResumeRankerError::UnsupportedFormat(format!(
                "Unsupported file extension .{} for {} (allowed: {})",
                extension,
                name.display(),
                Self::SUPPORTED_EXTENSIONS.join(", ")
            ))
        })
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentFormat::PlainText => "txt",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(DocumentFormat::detect(Path::new("cv.PDF")).unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::detect(Path::new("a/b/cv.Docx")).unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::detect(Path::new("notes.txt")).unwrap(), DocumentFormat::PlainText);
    }

    #[test]
    fn test_unknown_extensions_rejected() {
        for name in ["cv.doc", "cv.rtf", "cv.md", "cv"] {
            let result = DocumentFormat::detect(Path::new(name));
            assert!(
                matches!(result, Err(ResumeRankerError::UnsupportedFormat(_))),
                "{} should be unsupported",
                name
            );
        }
    }
}
