//! Errors and records shared across the ingestion pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::AiError;
use crate::extract::{DocumentMetadata, ExtractError};
use crate::store::StoreError;

/// Failure while ingesting a document, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Text extraction from the uploaded bytes failed.
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractError),
    /// An embedding request to the AI provider failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] AiError),
    /// Persisting rows to the vector store failed.
    #[error("storage failed: {0}")]
    Storage(#[from] StoreError),
    /// The provider returned vectors of different widths within one run.
    #[error("embedding dimension changed mid-run: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Width of the first embedding in the run.
        expected: usize,
        /// Width of the offending embedding.
        actual: usize,
    },
}

/// Outcome of a completed ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionSummary {
    /// Identifier minted for this upload.
    pub document_id: String,
    /// Number of chunks persisted.
    pub chunks: usize,
    /// Number of pages in the source document.
    pub pages: usize,
}

/// Source-document identity carried into every chunk's metadata.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    /// Original file name as uploaded.
    pub filename: String,
    /// Declared MIME type of the upload.
    pub mime_type: String,
    /// Metadata recovered by the extractor, if any.
    pub metadata: DocumentMetadata,
}

/// Per-chunk metadata stored alongside the embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Byte offset where the chunk begins in the extracted text.
    pub start_index: usize,
    /// Byte offset just past the chunk in the extracted text.
    pub end_index: usize,
    /// 1-based page the chunk starts on, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Heading the chunk falls under, when detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Name of the uploaded file.
    pub filename: String,
    /// Declared MIME type of the upload.
    pub mime_type: String,
    /// Document-level metadata from the extractor.
    pub document_metadata: DocumentMetadata,
    /// RFC 3339 timestamp of the ingestion run.
    pub timestamp: String,
}
