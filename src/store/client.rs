//! HTTP client for the Supabase PostgREST surface.

use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{Value, json};

use super::VectorStore;
use super::types::{ChunkRow, HistoryRecord, SearchHit, StoreError, format_vector};
use async_trait::async_trait;

/// Lightweight HTTP client for the Supabase tables and RPCs this system uses.
pub struct SupabaseStore {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl SupabaseStore {
    /// Construct a new client for the given project URL and API key.
    pub fn new(url: &str, api_key: &str) -> Result<Self, StoreError> {
        let client = Client::builder().user_agent("docchat/0.1").build()?;
        let base_url = normalize_base_url(url).map_err(StoreError::InvalidUrl)?;
        tracing::debug!(url = %base_url, "Initialized Supabase HTTP client");

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Store request failed");
            Err(error)
        }
    }
}

#[async_trait]
impl VectorStore for SupabaseStore {
    async fn insert(&self, rows: &[ChunkRow]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let row_count = rows.len();
        let response = self
            .request(Method::POST, "rest/v1/documents")
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(rows = row_count, "Chunk rows inserted");
        })
        .await
    }

    async fn search(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let body = json!({
            "query_embedding": format_vector(embedding),
            "match_threshold": threshold,
            "match_count": limit,
        });

        let response = self
            .request(Method::POST, "rest/v1/rpc/match_documents")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Similarity search failed");
            return Err(error);
        }

        let rows: Vec<MatchRow> = response.json().await?;
        let hits = rows
            .into_iter()
            .map(|row| SearchHit {
                id: stringify_row_id(row.id),
                content: row.content,
                metadata: row.metadata,
                similarity: row.similarity,
            })
            .collect();
        Ok(hits)
    }

    async fn append_history(&self, record: &HistoryRecord) -> Result<(), StoreError> {
        let response = self
            .request(Method::POST, "rest/v1/chat_history")
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!("Chat exchange recorded");
        })
        .await
    }
}

/// Row shape returned by the `match_documents` RPC.
#[derive(Debug, Deserialize)]
struct MatchRow {
    id: Value,
    content: String,
    #[serde(default)]
    metadata: Value,
    similarity: f32,
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

fn stringify_row_id(id: Value) -> String {
    match id {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
