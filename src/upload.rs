//! Upload acceptance rules applied before any pipeline work starts.
//!
//! Rejected uploads never reach extraction, so the limits here bound both
//! memory use and the work handed to the AI provider.

use thiserror::Error;

/// Content types accepted on the general upload path.
pub const ACCEPTED_CONTENT_TYPES: [&str; 5] = [
    "application/pdf",
    "text/plain",
    "text/markdown",
    "application/json",
    "text/csv",
];

/// Maximum payload size for the general upload path.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Maximum payload size for the dedicated PDF path.
pub const MAX_PDF_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// An upload with its bytes fully materialized in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name, carried through progress events.
    pub name: String,
    /// Declared MIME type used to pick an extractor.
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Reasons an upload is rejected before ingestion.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The declared content type is not in the accepted list.
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    /// The payload exceeds the size cap for its path.
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Actual payload size.
        size: usize,
        /// Cap applied to this upload path.
        limit: usize,
    },
}

/// Validate an upload on the general path (any accepted type, 10 MB cap).
pub fn validate_upload(file: &UploadedFile) -> Result<(), ValidationError> {
    if !ACCEPTED_CONTENT_TYPES.contains(&file.content_type.as_str()) {
        return Err(ValidationError::UnsupportedType(file.content_type.clone()));
    }
    check_size(file.bytes.len(), MAX_UPLOAD_BYTES)
}

/// Validate an upload on the dedicated PDF path (PDF only, 50 MB cap).
pub fn validate_pdf_upload(file: &UploadedFile) -> Result<(), ValidationError> {
    if file.content_type != "application/pdf" {
        return Err(ValidationError::UnsupportedType(file.content_type.clone()));
    }
    check_size(file.bytes.len(), MAX_PDF_UPLOAD_BYTES)
}

fn check_size(size: usize, limit: usize) -> Result<(), ValidationError> {
    if size > limit {
        return Err(ValidationError::TooLarge { size, limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, len: usize) -> UploadedFile {
        UploadedFile {
            name: "sample".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn accepts_all_listed_types() {
        for content_type in ACCEPTED_CONTENT_TYPES {
            assert!(validate_upload(&file(content_type, 16)).is_ok());
        }
    }

    #[test]
    fn rejects_unlisted_type() {
        let error = validate_upload(&file("image/png", 16)).unwrap_err();
        assert!(matches!(error, ValidationError::UnsupportedType(t) if t == "image/png"));
    }

    #[test]
    fn rejects_oversized_general_upload() {
        let error = validate_upload(&file("text/plain", MAX_UPLOAD_BYTES + 1)).unwrap_err();
        assert!(matches!(
            error,
            ValidationError::TooLarge {
                limit: MAX_UPLOAD_BYTES,
                ..
            }
        ));
    }

    #[test]
    fn pdf_path_allows_larger_payloads() {
        assert!(validate_pdf_upload(&file("application/pdf", MAX_UPLOAD_BYTES + 1)).is_ok());
        let error =
            validate_pdf_upload(&file("application/pdf", MAX_PDF_UPLOAD_BYTES + 1)).unwrap_err();
        assert!(matches!(error, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn pdf_path_rejects_non_pdf() {
        let error = validate_pdf_upload(&file("text/plain", 16)).unwrap_err();
        assert!(matches!(error, ValidationError::UnsupportedType(_)));
    }
}
