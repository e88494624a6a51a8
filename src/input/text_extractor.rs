//! Text extraction from various file formats

use crate::error::{Result, ResumeRankerError};
use crate::input::file_detector::DocumentFormat;
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::{Cursor, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Where a document's bytes come from: a file on disk or an in-memory upload.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Path(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

impl DocumentSource {
    pub fn display_name(&self) -> String {
        match self {
            DocumentSource::Path(path) => path.display().to_string(),
            DocumentSource::Bytes { name, .. } => name.clone(),
        }
    }

    /// Format implied by the file name's extension.
    pub fn detect_format(&self) -> Result<DocumentFormat> {
        match self {
            DocumentSource::Path(path) => DocumentFormat::detect(path),
            DocumentSource::Bytes { name, .. } => DocumentFormat::detect(Path::new(name)),
        }
    }

    pub async fn ensure_exists(&self) -> Result<()> {
        if let DocumentSource::Path(path) = self {
            match fs::try_exists(path).await {
                Ok(true) => {}
                Ok(false) => return Err(ResumeRankerError::NotFound(path.display().to_string())),
                Err(e) => return Err(ResumeRankerError::Io(e)),
            }
        }
        Ok(())
    }

    pub async fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            DocumentSource::Path(path) => match fs::read(path).await {
                Ok(bytes) => Ok(Cow::Owned(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(ResumeRankerError::NotFound(path.display().to_string()))
                }
                Err(e) => Err(ResumeRankerError::Io(e)),
            },
            DocumentSource::Bytes { data, .. } => Ok(Cow::Borrowed(data.as_slice())),
        }
    }
}

pub trait TextExtractor {
    fn extract(&self, source: &DocumentSource) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Check the source exists, resolve its format, and run the matching extractor.
///
/// A declared `format` takes precedence over the file extension.
pub async fn extract_text(source: &DocumentSource, format: Option<DocumentFormat>) -> Result<String> {
    source.ensure_exists().await?;

    let format = match format {
        Some(format) => format,
        None => source.detect_format()?,
    };

    debug!("Extracting {} text from {}", format, source.display_name());
    match format {
        DocumentFormat::PlainText => PlainTextExtractor.extract(source).await,
        DocumentFormat::Pdf => PdfExtractor.extract(source).await,
        DocumentFormat::Docx => DocxExtractor.extract(source).await,
    }
}

fn corrupt(source_name: &str, reason: impl ToString, recovered: String) -> ResumeRankerError {
    ResumeRankerError::CorruptDocument {
        source_name: source_name.to_string(),
        reason: reason.to_string(),
        recovered,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "parser panicked".to_string())
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, source: &DocumentSource) -> Result<String> {
        let bytes = source.read_bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, source: &DocumentSource) -> Result<String> {
        let bytes = source.read_bytes().await?;
        Self::extract_from_mem(&bytes, &source.display_name())
    }
}

impl PdfExtractor {
    /// Page-by-page extraction; pages that fail to decode are skipped.
    pub fn extract_from_mem(bytes: &[u8], source_name: &str) -> Result<String> {
        let document = match panic::catch_unwind(|| lopdf::Document::load_mem(bytes)) {
            Ok(Ok(document)) => document,
            Ok(Err(e)) => return Err(corrupt(source_name, format!("failed to load PDF: {}", e), String::new())),
            Err(payload) => return Err(corrupt(source_name, panic_message(payload.as_ref()), String::new())),
        };

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        let mut pages = Vec::with_capacity(page_numbers.len());

        for page_number in &page_numbers {
            let result = panic::catch_unwind(AssertUnwindSafe(|| document.extract_text(&[*page_number])));
            match result {
                Ok(Ok(text)) => pages.push(text),
                Ok(Err(e)) => debug!("Skipping page {} of {}: {}", page_number, source_name, e),
                Err(payload) => debug!(
                    "Skipping page {} of {}: {}",
                    page_number,
                    source_name,
                    panic_message(payload.as_ref())
                ),
            }
        }

        let text = pages.join("\n");
        if !text.trim().is_empty() || page_numbers.is_empty() {
            return Ok(text);
        }

        // lopdf's decoder misses some font encodings; give pdf-extract a go on the whole file
        debug!("No page text recovered from {}, retrying with pdf-extract", source_name);
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                warn!("pdf-extract could not read {}: {}", source_name, e);
                Ok(text)
            }
            Err(payload) => {
                warn!("pdf-extract panicked on {}: {}", source_name, panic_message(payload.as_ref()));
                Ok(text)
            }
        }
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, source: &DocumentSource) -> Result<String> {
        let bytes = source.read_bytes().await?;
        Self::extract_from_mem(&bytes, &source.display_name())
    }
}

/// Paragraph text read from `word/document.xml`, plus the error that stopped reading, if any.
struct DocxParagraphs {
    paragraphs: Vec<String>,
    failure: Option<String>,
}

impl DocxExtractor {
    const DOCUMENT_PART: &'static str = "word/document.xml";

    /// Paragraph text in document order, one paragraph per line.
    pub fn extract_from_mem(bytes: &[u8], source_name: &str) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| corrupt(source_name, format!("not a docx container: {}", e), String::new()))?;

        let mut xml = Vec::new();
        let read_failure = {
            let mut part = archive
                .by_name(Self::DOCUMENT_PART)
                .map_err(|e| corrupt(source_name, format!("missing {}: {}", Self::DOCUMENT_PART, e), String::new()))?;
            part.read_to_end(&mut xml).err().map(|e| format!("failed to inflate document: {}", e))
        };

        let xml = String::from_utf8_lossy(&xml);
        let parsed = Self::read_paragraphs(&xml);
        let text = parsed.paragraphs.join("\n");

        match read_failure.or(parsed.failure) {
            Some(reason) => Err(corrupt(source_name, reason, text)),
            None => Ok(text),
        }
    }

    /// Paragraphs are emitted in the order they open. Paragraphs nested inside
    /// text boxes get their own line and leave the enclosing paragraph intact.
    fn read_paragraphs(xml: &str) -> DocxParagraphs {
        let mut reader = Reader::from_str(xml);
        let mut paragraphs: Vec<String> = Vec::new();
        // indices into `paragraphs` of the currently open `w:p` elements
        let mut open: Vec<usize> = Vec::new();
        let mut in_text = false;
        let mut in_properties = false;

        let failure = loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"w:p" => {
                        open.push(paragraphs.len());
                        paragraphs.push(String::new());
                    }
                    b"w:t" => in_text = true,
                    b"w:pPr" => in_properties = true,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"w:p" => {
                        open.pop();
                    }
                    b"w:t" => in_text = false,
                    b"w:pPr" => in_properties = false,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match (e.name().as_ref(), open.last()) {
                    (b"w:p", _) => paragraphs.push(String::new()),
                    (b"w:tab", Some(&index)) if !in_properties => paragraphs[index].push('\t'),
                    (b"w:br" | b"w:cr", Some(&index)) => paragraphs[index].push('\n'),
                    _ => {}
                },
                Ok(Event::Text(t)) if in_text => match (t.unescape(), open.last()) {
                    (Ok(text), Some(&index)) => paragraphs[index].push_str(&text),
                    (Ok(_), None) => {}
                    (Err(e), _) => break Some(format!("bad text at byte {}: {}", reader.buffer_position(), e)),
                },
                Ok(Event::Eof) => {
                    if !open.is_empty() {
                        break Some("document ends inside a paragraph".to_string());
                    }
                    break None;
                }
                Ok(_) => {}
                Err(e) => break Some(format!("XML error at byte {}: {}", reader.buffer_position(), e)),
            }
        };

        if failure.is_some() {
            paragraphs.retain(|p| !p.is_empty());
        }

        DocxParagraphs { paragraphs, failure }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::io::Write;
    use tempfile::TempDir;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
    }

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    #[test]
    fn test_docx_paragraphs_in_order() {
        let body = format!("{}{}{}", paragraph("Jane Doe"), paragraph("Rust &amp; Go"), paragraph("Berlin"));
        let text = DocxExtractor::extract_from_mem(&docx_bytes(&wrap_body(&body)), "cv.docx").unwrap();
        assert_eq!(text, "Jane Doe\nRust & Go\nBerlin");
    }

    #[test]
    fn test_docx_runs_tabs_and_breaks() {
        let body = concat!(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>",
            "<w:r><w:t>Skills:</w:t></w:r><w:r><w:tab/><w:t>Kafka</w:t></w:r>",
            "<w:r><w:br/><w:t xml:space=\"preserve\"> Postgres</w:t></w:r></w:p>",
            "<w:p/>"
        );
        let text = DocxExtractor::extract_from_mem(&docx_bytes(&wrap_body(body)), "cv.docx").unwrap();
        assert_eq!(text, "Skills:\tKafka\n Postgres\n");
    }

    #[test]
    fn test_docx_text_box_keeps_enclosing_paragraph() {
        let body = concat!(
            "<w:p><w:r><w:t>Senior Rust Engineer</w:t></w:r>",
            "<w:r><w:pict><w:txbxContent><w:p><w:r><w:t>Contact box</w:t></w:r></w:p></w:txbxContent></w:pict></w:r>",
            "<w:r><w:tab/><w:t>Berlin</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>Kafka</w:t></w:r></w:p>"
        );
        let text = DocxExtractor::extract_from_mem(&docx_bytes(&wrap_body(body)), "cv.docx").unwrap();
        assert_eq!(text, "Senior Rust Engineer\tBerlin\nContact box\nKafka");
    }

    #[test]
    fn test_docx_truncated_keeps_recovered_paragraphs() {
        let xml = wrap_body(&format!("{}{}", paragraph("First paragraph"), paragraph("Second")));
        let cut = xml.find("</w:body>").unwrap();
        let truncated = format!("{}<w:p><w:r><w:t>Thi", &xml[..cut]);

        match DocxExtractor::extract_from_mem(&docx_bytes(&truncated), "cv.docx") {
            Err(ResumeRankerError::CorruptDocument { recovered, .. }) => {
                assert!(recovered.starts_with("First paragraph\nSecond"));
            }
            other => panic!("expected CorruptDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_docx_without_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let result = DocxExtractor::extract_from_mem(&bytes, "cv.docx");
        assert!(matches!(
            result,
            Err(ResumeRankerError::CorruptDocument { ref recovered, .. }) if recovered.is_empty()
        ));
    }

    #[test]
    fn test_docx_not_a_zip() {
        let result = DocxExtractor::extract_from_mem(b"plain bytes", "cv.docx");
        assert!(matches!(result, Err(ResumeRankerError::CorruptDocument { .. })));
    }

    fn page_content(text: &str) -> Vec<u8> {
        Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        }
        .encode()
        .unwrap()
    }

    /// One page per entry, each with the given raw content stream.
    fn pdf_with_pages(contents: Vec<Vec<u8>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for content in contents {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pdf_pages_in_order() {
        let bytes = pdf_with_pages(vec![
            page_content("Distributed systems engineer"),
            page_content("Kafka and Rust"),
        ]);

        let text = PdfExtractor::extract_from_mem(&bytes, "cv.pdf").unwrap();
        let first = text.find("Distributed systems engineer").unwrap();
        let second = text.find("Kafka and Rust").unwrap();
        assert!(first < second);
        assert!(text[first..second].contains('\n'));
    }

    #[test]
    fn test_pdf_broken_page_does_not_lose_others() {
        let bytes = pdf_with_pages(vec![
            page_content("Distributed systems engineer"),
            b"BT /F1 24 Tf 72 700 Td (never closed Tj ET ]]] >>".to_vec(),
            page_content("Kafka and Rust"),
        ]);

        let text = PdfExtractor::extract_from_mem(&bytes, "cv.pdf").unwrap();
        let first = text.find("Distributed systems engineer").unwrap();
        let last = text.find("Kafka and Rust").unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_pdf_garbage_is_corrupt() {
        let result = PdfExtractor::extract_from_mem(b"%PDF-1.4 this is not really a pdf", "cv.pdf");
        match result {
            Err(ResumeRankerError::CorruptDocument { source_name, recovered, .. }) => {
                assert_eq!(source_name, "cv.pdf");
                assert!(recovered.is_empty());
            }
            other => panic!("expected CorruptDocument, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_plain_text_replaces_invalid_utf8() {
        let source = DocumentSource::Bytes {
            name: "cv.txt".to_string(),
            data: b"caf\xff Rust".to_vec(),
        };
        let text = extract_text(&source, None).await.unwrap();
        assert_eq!(text, "caf\u{FFFD} Rust");
    }

    #[tokio::test]
    async fn test_declared_format_overrides_extension() {
        let source = DocumentSource::Bytes {
            name: "upload.bin".to_string(),
            data: b"hello".to_vec(),
        };
        assert!(matches!(
            extract_text(&source, None).await,
            Err(ResumeRankerError::UnsupportedFormat(_))
        ));
        assert_eq!(extract_text(&source, Some(DocumentFormat::PlainText)).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let source = DocumentSource::Path(PathBuf::from("definitely/not/here.rtf"));
        assert!(matches!(
            extract_text(&source, None).await,
            Err(ResumeRankerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unreadable_parent_is_io_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("resume.txt");
        std::fs::write(&file, "Rust").unwrap();

        // a path "below" a regular file cannot be probed
        let source = DocumentSource::Path(file.join("child.txt"));
        assert!(matches!(
            extract_text(&source, None).await,
            Err(ResumeRankerError::Io(_))
        ));
    }
}
