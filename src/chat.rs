//! Retrieval-augmented chat over the ingested documents.

use std::sync::Arc;

use thiserror::Error;

use crate::ai::{AiClient, AiError};
use crate::metrics::ServerMetrics;
use crate::store::{HistoryRecord, StoreError, VectorStore};

/// Answer returned whenever the retrieval or generation steps fail.
pub const FALLBACK_ANSWER: &str = "Sorry, I encountered an error processing your request.";

/// Default number of chunks retrieved as context for a query.
pub const DEFAULT_MATCH_COUNT: usize = 3;

/// Default minimum similarity for a chunk to count as context.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.7;

/// Internal failure in one of the chat pipeline steps.
#[derive(Debug, Error)]
enum ChatError {
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Answers user queries grounded in retrieved document chunks.
pub struct ChatService {
    ai: Arc<dyn AiClient>,
    store: Arc<dyn VectorStore>,
    match_count: usize,
    match_threshold: f32,
    metrics: Arc<ServerMetrics>,
}

impl ChatService {
    /// Create a chat service with explicit retrieval settings.
    pub fn new(
        ai: Arc<dyn AiClient>,
        store: Arc<dyn VectorStore>,
        match_count: usize,
        match_threshold: f32,
        metrics: Arc<ServerMetrics>,
    ) -> Self {
        Self {
            ai,
            store,
            match_count,
            match_threshold,
            metrics,
        }
    }

    /// Answer `query` from stored context. Never fails: any error inside
    /// the pipeline is logged and replaced with [`FALLBACK_ANSWER`].
    pub async fn answer_query(&self, query: &str) -> String {
        self.metrics.record_query();
        match self.try_answer(query).await {
            Ok(answer) => answer,
            Err(error) => {
                tracing::warn!(error = %error, "Chat pipeline failed; returning fallback answer");
                FALLBACK_ANSWER.to_string()
            }
        }
    }

    async fn try_answer(&self, query: &str) -> Result<String, ChatError> {
        let embedding = self.ai.embed(query).await?;
        let hits = self
            .store
            .search(&embedding, self.match_threshold, self.match_count)
            .await?;
        tracing::debug!(hits = hits.len(), "Retrieved context for query");

        let context = hits
            .iter()
            .map(|hit| hit.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let answer = self.ai.answer(query, &context).await?;

        let record = HistoryRecord {
            user_query: query.to_string(),
            ai_response: answer.clone(),
            relevant_docs: hits.iter().map(|hit| hit.id.clone()).collect(),
        };
        // History is best-effort; the answer still goes out when it fails.
        if let Err(error) = self.store.append_history(&record).await {
            tracing::warn!(error = %error, "Failed to record chat history");
        }

        Ok(answer)
    }
}
