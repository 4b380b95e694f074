use encoding_rs::{Encoding, UTF_8};
use lopdf::Document as PdfDocument;
use std::path::Path;
use tracing::{debug, warn};

use crate::utils::error::ApiError;

#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub content: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub file_type: String,
    pub pages: Option<usize>,
    pub char_count: usize,
    pub encoding: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

pub struct DocumentParser;

impl DocumentParser {
    /// Turn an uploaded artifact into flat text in reading order
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument, ApiError> {
        let kind = Self::detect_kind(filename, data)?;
        debug!("Parsing {} as {:?} ({} bytes)", filename, kind, data.len());

        let (content, metadata) = match kind {
            DocumentKind::Pdf => Self::parse_pdf(data)?,
            DocumentKind::PlainText => Self::parse_text(data),
        };

        debug!("Parsed {} characters from {}", metadata.char_count, filename);

        Ok(ParsedDocument { content, metadata })
    }

    /// Classify by extension, then confirm PDFs by their magic bytes
    pub fn detect_kind(filename: &str, data: &[u8]) -> Result<DocumentKind, ApiError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| {
                ApiError::UnsupportedFormat(format!("'{}' has no file extension", filename))
            })?;

        let guessed = mime_guess::from_ext(&extension).first_or_octet_stream();

        match (extension.as_str(), guessed.essence_str()) {
            ("pdf", _) | (_, "application/pdf") => {
                let sniffed = infer::get(data).map(|t| t.mime_type());
                if sniffed != Some("application/pdf") {
                    return Err(ApiError::UnsupportedFormat(format!(
                        "'{}' is not a valid PDF file",
                        filename
                    )));
                }
                Ok(DocumentKind::Pdf)
            }
            ("txt" | "md" | "markdown", _) => Ok(DocumentKind::PlainText),
            (_, mime) => Err(ApiError::UnsupportedFormat(format!(
                "Unsupported file type: .{} ({}). Only PDF and plain text files are allowed",
                extension, mime
            ))),
        }
    }

    /// Parse PDF using lopdf, page by page in page order
    fn parse_pdf(data: &[u8]) -> Result<(String, DocumentMetadata), ApiError> {
        let doc = PdfDocument::load_mem(data)
            .map_err(|e| ApiError::ExtractionFailure(format!("Failed to load PDF: {}", e)))?;
        let pages = doc.get_pages();
        let page_count = pages.len();

        let mut content = String::new();
        let mut failed_pages = 0usize;

        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(text) => {
                    content.push_str(&text);
                    content.push('\n');
                }
                Err(e) => {
                    failed_pages += 1;
                    warn!("Failed to extract text from page {}: {}", page_num, e);
                }
            }
        }

        if page_count > 0 && failed_pages == page_count {
            return Err(ApiError::ExtractionFailure(format!(
                "Could not extract text from any of {} pages",
                page_count
            )));
        }

        let metadata = DocumentMetadata {
            file_type: "application/pdf".to_string(),
            pages: Some(page_count),
            char_count: content.chars().count(),
            encoding: "UTF-8".to_string(),
        };

        Ok((content, metadata))
    }

    fn parse_text(data: &[u8]) -> (String, DocumentMetadata) {
        let (content, encoding) = Self::decode_text(data);

        let metadata = DocumentMetadata {
            file_type: "text/plain".to_string(),
            pages: None,
            char_count: content.chars().count(),
            encoding: encoding.name().to_string(),
        };

        (content, metadata)
    }

    fn decode_text(bytes: &[u8]) -> (String, &'static Encoding) {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return (text.to_string(), UTF_8);
        }

        // Lossy fallback, invalid sequences become U+FFFD
        let (decoded, encoding, _) = UTF_8.decode(bytes);
        (decoded.into_owned(), encoding)
    }
}
