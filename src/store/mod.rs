//! Vector store integration (Supabase + pgvector).

pub mod client;
pub mod types;

pub use client::SupabaseStore;
pub use types::{ChunkRow, HistoryRecord, SearchHit, StoreError, format_vector};

use async_trait::async_trait;

/// Interface implemented by vector store backends.
///
/// The ingestion side only appends; nothing in this system updates or
/// deletes stored chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist a batch of chunk rows in one request.
    async fn insert(&self, rows: &[ChunkRow]) -> Result<(), StoreError>;

    /// Similarity search thresholded and limited server-side, best first.
    async fn search(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError>;

    /// Append one chat exchange to the history table.
    async fn append_history(&self, record: &HistoryRecord) -> Result<(), StoreError>;
}
