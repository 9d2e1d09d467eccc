//! Plain-text extraction for the non-PDF upload formats.

use async_trait::async_trait;

use super::{DocumentMetadata, ExtractError, ExtractedDocument, Extractor};

const TEXT_CONTENT_TYPES: [&str; 4] = [
    "text/plain",
    "text/markdown",
    "application/json",
    "text/csv",
];

/// Extractor for UTF-8 text formats.
///
/// Form feeds (`\f`) act as page separators: each segment becomes a page and
/// the separators are replaced by single newlines, mirroring how PDF pages
/// are joined. Text without form feeds is a single page with no break
/// offsets.
pub struct TextExtractor;

#[async_trait]
impl Extractor for TextExtractor {
    fn supports(&self, content_type: &str) -> bool {
        TEXT_CONTENT_TYPES.contains(&content_type)
    }

    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument, ExtractError> {
        let raw = String::from_utf8(bytes.to_vec())?;

        if !raw.contains('\u{0C}') {
            return Ok(ExtractedDocument {
                text: raw,
                page_breaks: Vec::new(),
                pages: 1,
                metadata: DocumentMetadata::default(),
            });
        }

        let mut text = String::with_capacity(raw.len());
        let mut page_breaks = Vec::new();
        let segments: Vec<&str> = raw.split('\u{0C}').collect();
        let pages = segments.len();
        for (index, segment) in segments.into_iter().enumerate() {
            if index > 0 {
                text.push('\n');
            }
            text.push_str(segment);
            page_breaks.push(text.len());
        }

        Ok(ExtractedDocument {
            text,
            page_breaks,
            pages,
            metadata: DocumentMetadata::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_is_a_single_page() {
        let document = TextExtractor
            .extract(b"one paragraph\n\nanother")
            .await
            .expect("extract");
        assert_eq!(document.text, "one paragraph\n\nanother");
        assert!(document.page_breaks.is_empty());
        assert_eq!(document.pages, 1);
    }

    #[tokio::test]
    async fn form_feeds_become_page_breaks() {
        let document = TextExtractor
            .extract(b"page one\x0Cpage two\x0Cpage three")
            .await
            .expect("extract");
        assert_eq!(document.text, "page one\npage two\npage three");
        assert_eq!(document.pages, 3);
        // Breaks sit at the end of each page's text within the joined string.
        assert_eq!(document.page_breaks, vec![8, 17, 28]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_rejected() {
        let error = TextExtractor.extract(&[0xFF, 0xFE, 0x00]).await.unwrap_err();
        assert!(matches!(error, ExtractError::InvalidEncoding(_)));
    }

    #[test]
    fn supports_all_text_formats() {
        for content_type in TEXT_CONTENT_TYPES {
            assert!(TextExtractor.supports(content_type));
        }
        assert!(!TextExtractor.supports("application/pdf"));
    }
}
