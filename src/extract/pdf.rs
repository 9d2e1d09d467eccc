//! PDF extraction backed by the `pdf_oxide` library.

use std::path::Path;

use async_trait::async_trait;
use pdf_oxide::converters::ConversionOptions;

use super::{DocumentMetadata, ExtractError, ExtractedDocument, Extractor};

/// Extractor for `application/pdf` uploads.
///
/// Pages are converted one at a time and joined with a single newline, so a
/// sentence broken across a page boundary stays inside one paragraph. The
/// cumulative length after each page becomes that page's break offset.
pub struct PdfExtractor;

#[async_trait]
impl Extractor for PdfExtractor {
    fn supports(&self, content_type: &str) -> bool {
        content_type == "application/pdf"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument, ExtractError> {
        // The library reads from a path, so stage the bytes in a temp file.
        let temp_path = std::env::temp_dir().join(format!("docchat-{}.pdf", uuid::Uuid::new_v4()));
        std::fs::write(&temp_path, bytes)?;
        let result = extract_from_path(&temp_path);
        let _ = std::fs::remove_file(&temp_path);
        result
    }
}

fn extract_from_path(path: &Path) -> Result<ExtractedDocument, ExtractError> {
    let mut doc = pdf_oxide::PdfDocument::open(path).map_err(|err| ExtractError::Pdf {
        source: anyhow::anyhow!("failed to open document: {err}"),
    })?;
    let pages = doc.page_count().map_err(|err| ExtractError::Pdf {
        source: anyhow::anyhow!("failed to read page count: {err}"),
    })?;

    let options = ConversionOptions::default();
    let mut text = String::new();
    let mut page_breaks = Vec::with_capacity(pages);
    for page_index in 0..pages {
        match doc.to_markdown(page_index, &options) {
            Ok(page_text) => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&page_text);
                page_breaks.push(text.len());
            }
            Err(err) => {
                // A damaged page should not sink the whole document.
                tracing::warn!(page = page_index + 1, error = %err, "Skipping unreadable PDF page");
            }
        }
    }

    Ok(ExtractedDocument {
        text,
        page_breaks,
        pages,
        metadata: DocumentMetadata::default(),
    })
}
