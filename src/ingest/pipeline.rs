//! End-to-end ingestion of one uploaded document.

use std::sync::Arc;

use uuid::Uuid;

use crate::extract::ExtractorSet;
use crate::ingest::batch::BatchIngestor;
use crate::ingest::chunker::Chunker;
use crate::ingest::progress::{Progress, ProgressSink, Stage};
use crate::ingest::types::{DocumentInfo, IngestError, IngestionSummary};
use crate::metrics::ServerMetrics;
use crate::upload::UploadedFile;

/// Drives a validated upload through extraction, chunking, and storage.
pub struct IngestionPipeline {
    extractors: ExtractorSet,
    chunker: Chunker,
    ingestor: BatchIngestor,
    metrics: Arc<ServerMetrics>,
}

impl IngestionPipeline {
    /// Assemble a pipeline from its stages.
    pub fn new(
        extractors: ExtractorSet,
        chunker: Chunker,
        ingestor: BatchIngestor,
        metrics: Arc<ServerMetrics>,
    ) -> Self {
        Self {
            extractors,
            chunker,
            ingestor,
            metrics,
        }
    }

    /// Ingest one uploaded file, reporting progress along the way.
    ///
    /// Stages are reported in order: uploading, processing, embedding, then
    /// storing. The first three bracket their work with 0/100 and 100/100
    /// events; storing counts persisted chunks, opening with `0/n` and
    /// advancing once per chunk (a lone `0/0` event for empty documents).
    /// On failure the error names the stage that failed and nothing after
    /// the last completed batch has been written.
    pub async fn ingest_document(
        &self,
        file: UploadedFile,
        on_progress: ProgressSink<'_>,
    ) -> Result<IngestionSummary, IngestError> {
        let UploadedFile {
            name,
            content_type,
            bytes,
        } = file;
        let emit = |stage: Stage, progress: u64, total: u64| {
            on_progress(Progress {
                stage,
                progress,
                total,
                file_name: name.clone(),
            });
        };

        emit(Stage::Uploading, 0, 100);
        tracing::info!(
            file = %name,
            content_type = %content_type,
            bytes = bytes.len(),
            "Ingestion started"
        );
        emit(Stage::Uploading, 100, 100);

        emit(Stage::Processing, 0, 100);
        let extracted = self.extractors.extract(&bytes, &content_type).await?;
        emit(Stage::Processing, 100, 100);

        emit(Stage::Embedding, 0, 100);
        let chunks = self.chunker.chunk(&extracted.text, &extracted.page_breaks);
        emit(Stage::Embedding, 100, 100);

        let total = chunks.len() as u64;
        emit(Stage::Storing, 0, total);
        let document = DocumentInfo {
            filename: name.clone(),
            mime_type: content_type,
            metadata: extracted.metadata,
        };
        self.ingestor
            .ingest(&chunks, &document, &|stored| {
                emit(Stage::Storing, stored as u64, total);
            })
            .await?;

        let summary = IngestionSummary {
            document_id: Uuid::new_v4().to_string(),
            chunks: chunks.len(),
            pages: extracted.pages,
        };
        self.metrics.record_document(summary.chunks as u64);
        tracing::info!(
            document_id = %summary.document_id,
            chunks = summary.chunks,
            pages = summary.pages,
            "Document ingested"
        );
        Ok(summary)
    }
}
