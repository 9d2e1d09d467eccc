//! Progress events emitted while a document moves through the pipeline.

use serde::Serialize;

/// Pipeline stages, in the order a document passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Upload received and validated.
    Uploading,
    /// Text extraction from the raw bytes.
    Processing,
    /// Chunking and embedding preparation.
    Embedding,
    /// Batched persistence into the vector store.
    Storing,
}

impl Stage {
    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Uploading => "uploading",
            Stage::Processing => "processing",
            Stage::Embedding => "embedding",
            Stage::Storing => "storing",
        }
    }
}

/// A single progress observation for one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    /// Stage the pipeline is currently in.
    pub stage: Stage,
    /// Units completed within the stage.
    pub progress: u64,
    /// Units the stage will complete in total.
    pub total: u64,
    /// Name of the file being ingested.
    pub file_name: String,
}

impl Progress {
    /// Whole-number completion percentage; an empty stage counts as done.
    pub fn percent(&self) -> u64 {
        if self.total == 0 {
            100
        } else {
            self.progress * 100 / self.total
        }
    }
}

/// Callback receiving progress events. Sinks must tolerate repeat events
/// and never block; delivery is fire-and-forget.
pub type ProgressSink<'a> = &'a (dyn Fn(Progress) + Send + Sync);

/// Wrap a sink so embedding-stage events are dropped. Callers that report
/// a coarser upload/process/store sequence install this over their sink.
pub fn skip_embedding_stage<S>(sink: S) -> impl Fn(Progress) + Send + Sync
where
    S: Fn(Progress) + Send + Sync,
{
    move |event: Progress| {
        if event.stage != Stage::Embedding {
            sink(event);
        }
    }
}
