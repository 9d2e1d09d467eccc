//! Wire types shared by the vector store trait and the Supabase client.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors returned while interacting with the vector store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Store responded with an unexpected status code.
    #[error("Unexpected store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// One embedded chunk as persisted in the `documents` table.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkRow {
    /// Trimmed chunk text.
    pub content: String,
    /// Chunk metadata object (positional fields, file info, timestamp).
    pub metadata: Value,
    /// Embedding serialized as a pgvector literal.
    pub embedding: String,
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Row identifier assigned by the store.
    pub id: String,
    /// Stored chunk text.
    pub content: String,
    /// Stored chunk metadata.
    pub metadata: Value,
    /// Cosine similarity reported by the store.
    pub similarity: f32,
}

/// One chat exchange as persisted in the `chat_history` table.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    /// User's question verbatim.
    pub user_query: String,
    /// Answer returned to the user.
    pub ai_response: String,
    /// Row ids of the chunks that grounded the answer.
    pub relevant_docs: Vec<String>,
}

/// Serialize an embedding as a pgvector literal (`[v1,v2,...]`).
pub fn format_vector(embedding: &[f32]) -> String {
    let components: Vec<String> = embedding.iter().map(|value| value.to_string()).collect();
    format!("[{}]", components.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_literal_matches_pgvector_syntax() {
        assert_eq!(format_vector(&[0.1, -0.2, 3.0]), "[0.1,-0.2,3]");
        assert_eq!(format_vector(&[]), "[]");
    }
}
