//! Document text extraction behind a pluggable trait seam.
//!
//! Extractors turn raw upload bytes into plain text plus page geometry. The
//! chunker downstream is format-agnostic; everything format-specific lives
//! here.

mod pdf;
mod text;

pub use pdf::PdfExtractor;
pub use text::TextExtractor;

use anyhow::Error as PdfLibError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while extracting text from an uploaded document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No registered extractor accepts the declared content type.
    #[error("No extractor for content type: {0}")]
    UnsupportedType(String),
    /// Text document bytes were not valid UTF-8.
    #[error("Document is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),
    /// The PDF library rejected the document.
    #[error("Failed to parse PDF: {source}")]
    Pdf {
        /// Underlying error raised by the PDF library.
        #[source]
        source: PdfLibError,
    },
    /// Staging the document bytes for the extractor failed.
    #[error("Failed to stage document: {0}")]
    Io(#[from] std::io::Error),
}

/// Document-level metadata an extractor may recover from the source file.
///
/// Serialized with the camelCase keys the stored chunk metadata uses on the
/// wire; absent fields are omitted entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Document title, when declared by the source format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Author name, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Subject line, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Keyword list, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    /// Creation timestamp as reported by the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    /// Last-modification timestamp as reported by the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<String>,
}

/// Extracted text plus the page geometry the chunker needs.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Full document text with pages already joined.
    pub text: String,
    /// Cumulative character offsets marking the end of each page within
    /// `text`, ascending. Empty when the format has no page notion.
    pub page_breaks: Vec<usize>,
    /// Total page count reported by the source format.
    pub pages: usize,
    /// Document-level metadata recovered from the source.
    pub metadata: DocumentMetadata,
}

/// Interface implemented by format-specific text extractors.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Whether this extractor handles the declared content type.
    fn supports(&self, content_type: &str) -> bool;

    /// Extract text and page geometry from raw document bytes.
    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument, ExtractError>;
}

/// Ordered collection of extractors consulted per upload.
pub struct ExtractorSet {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorSet {
    /// Build the default set covering PDFs and the accepted text formats.
    pub fn with_defaults() -> Self {
        Self {
            extractors: vec![Box::new(PdfExtractor), Box::new(TextExtractor)],
        }
    }

    /// Build a set from explicit extractors, first match wins.
    pub fn new(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self { extractors }
    }

    /// Dispatch to the first extractor supporting the content type.
    pub async fn extract(
        &self,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<ExtractedDocument, ExtractError> {
        for extractor in &self.extractors {
            if extractor.supports(content_type) {
                return extractor.extract(bytes).await;
            }
        }
        Err(ExtractError::UnsupportedType(content_type.to_string()))
    }
}
