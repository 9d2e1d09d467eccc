//! AI provider gateway: embeddings and grounded answer generation.
//!
//! Both operations ride one trait so the ingestion pipeline and the chat
//! path share a single configured provider. Adapters exist for Google
//! Gemini and OpenAI; selection happens once at startup from configuration.

mod gemini;
mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::{AiSettings, Config};

/// Errors raised by AI provider adapters.
#[derive(Debug, Error)]
pub enum AiError {
    /// Transport-level failure reaching the provider.
    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("Unexpected {provider} response ({status}): {body}")]
    UnexpectedStatus {
        /// Provider label for diagnostics.
        provider: &'static str,
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Response body captured for diagnostics.
        body: String,
    },
    /// Provider returned a success status but not the expected shape.
    #[error("Malformed {provider} response: {detail}")]
    MalformedResponse {
        /// Provider label for diagnostics.
        provider: &'static str,
        /// What was missing or mistyped.
        detail: String,
    },
}

/// Interface implemented by AI provider backends.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Produce an embedding vector for the supplied text.
    ///
    /// A success response that does not carry a numeric vector is a
    /// [`AiError::MalformedResponse`]; no retries happen at this layer.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError>;

    /// Generate an answer to `query` grounded in `context`.
    async fn answer(&self, query: &str, context: &str) -> Result<String, AiError>;

    /// Lightweight provider round trip; `false` on any error.
    async fn check_availability(&self) -> bool;
}

/// Build the provider adapter selected by configuration.
pub fn client_from_config(config: &Config) -> Result<Arc<dyn AiClient>, AiError> {
    match &config.ai {
        AiSettings::Gemini { api_key, base_url } => Ok(Arc::new(GeminiClient::new(
            api_key.clone(),
            base_url.clone(),
        )?)),
        AiSettings::OpenAi { api_key, base_url } => Ok(Arc::new(OpenAiClient::new(
            api_key.clone(),
            base_url.clone(),
        )?)),
    }
}

/// Read a failed response into an [`AiError::UnexpectedStatus`].
pub(crate) async fn status_error(provider: &'static str, response: reqwest::Response) -> AiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let error = AiError::UnexpectedStatus {
        provider,
        status,
        body,
    };
    tracing::error!(error = %error, "AI provider request failed");
    error
}
