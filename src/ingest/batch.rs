//! Batched embedding and persistence of chunked documents.

use std::sync::Arc;

use futures_util::future::try_join_all;
use time::OffsetDateTime;

use crate::ai::AiClient;
use crate::ingest::chunker::Chunk;
use crate::ingest::types::{ChunkMetadata, DocumentInfo, IngestError};
use crate::store::{ChunkRow, VectorStore, format_vector};

/// Default number of chunks embedded and inserted per batch.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Embeds chunks and writes them to the vector store, batch by batch.
///
/// Batches run sequentially; embeddings within a batch run concurrently.
/// Each batch lands with a single bulk insert, so a failure part-way
/// through a run leaves only whole batches behind.
pub struct BatchIngestor {
    ai: Arc<dyn AiClient>,
    store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl BatchIngestor {
    /// Create an ingestor over the given provider and store.
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn new(ai: Arc<dyn AiClient>, store: Arc<dyn VectorStore>, batch_size: usize) -> Self {
        Self {
            ai,
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Embed and persist `chunks`, reporting cumulative progress.
    ///
    /// `on_chunk` receives the running count of persisted chunks, advancing
    /// once per chunk after the batch containing it has been inserted. All
    /// chunks in a run share one ingestion timestamp. The first embedding
    /// fixes the expected vector width; any later deviation aborts the run
    /// before its batch is written.
    pub async fn ingest(
        &self,
        chunks: &[Chunk],
        document: &DocumentInfo,
        on_chunk: &(dyn Fn(usize) + Send + Sync),
    ) -> Result<(), IngestError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let uploaded_at = current_timestamp_rfc3339();
        let total = chunks.len();
        let mut expected_dimension: Option<usize> = None;
        let mut stored = 0usize;

        for batch in chunks.chunks(self.batch_size) {
            let embeddings =
                try_join_all(batch.iter().map(|chunk| self.ai.embed(&chunk.content))).await?;

            for embedding in &embeddings {
                match expected_dimension {
                    None => expected_dimension = Some(embedding.len()),
                    Some(expected) if embedding.len() != expected => {
                        return Err(IngestError::DimensionMismatch {
                            expected,
                            actual: embedding.len(),
                        });
                    }
                    Some(_) => {}
                }
            }

            let rows: Vec<ChunkRow> = batch
                .iter()
                .zip(&embeddings)
                .map(|(chunk, embedding)| build_row(chunk, document, &uploaded_at, embedding))
                .collect();
            self.store.insert(&rows).await?;

            for _ in batch {
                stored += 1;
                on_chunk(stored);
            }
            tracing::debug!(stored, total, "Chunk batch persisted");
        }

        Ok(())
    }
}

fn build_row(
    chunk: &Chunk,
    document: &DocumentInfo,
    timestamp: &str,
    embedding: &[f32],
) -> ChunkRow {
    let metadata = ChunkMetadata {
        start_index: chunk.start_index,
        end_index: chunk.end_index,
        page_number: chunk.page_number,
        section: chunk.section.clone(),
        filename: document.filename.clone(),
        mime_type: document.mime_type.clone(),
        document_metadata: document.metadata.clone(),
        timestamp: timestamp.to_string(),
    };
    ChunkRow {
        content: chunk.content.clone(),
        metadata: serde_json::to_value(&metadata).expect("chunk metadata serializes to JSON"),
        embedding: format_vector(embedding),
    }
}

/// Current timestamp formatted for chunk metadata.
fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
