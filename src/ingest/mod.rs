//! Document ingestion pipeline: extraction, chunking, embedding, and storage.

mod batch;
pub mod chunker;
mod pipeline;
pub mod progress;
mod types;

pub use batch::{BatchIngestor, DEFAULT_BATCH_SIZE};
pub use chunker::{Chunk, Chunker, DEFAULT_OVERLAP_WORDS, DEFAULT_TARGET_TOKENS};
pub use pipeline::IngestionPipeline;
pub use progress::{Progress, ProgressSink, Stage, skip_embedding_stage};
pub use types::{ChunkMetadata, DocumentInfo, IngestError, IngestionSummary};
