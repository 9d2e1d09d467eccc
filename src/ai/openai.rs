//! OpenAI adapter for embeddings and chat completions.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::{AiClient, AiError, status_error};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const EMBED_MODEL: &str = "text-embedding-ada-002";
const CHAT_MODEL: &str = "gpt-4-turbo-preview";
const PROVIDER: &str = "openai";

const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that answers questions based on the \
                             provided context. Only use the information from the context to \
                             answer questions. If you cannot find the answer in the context, say \
                             so.";

/// Returned when the model produces an empty completion.
pub const ANSWER_FALLBACK: &str = "Sorry, I couldn't generate an answer.";

/// HTTP client for the OpenAI embeddings and chat completion endpoints.
pub struct OpenAiClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl OpenAiClient {
    /// Construct a client; `base_url` overrides the public endpoint.
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, AiError> {
        let client = Client::builder().user_agent("docchat/0.1").build()?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, AiError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|err| AiError::MalformedResponse {
            provider: PROVIDER,
            detail: err.to_string(),
        })
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError> {
        let body = json!({ "model": EMBED_MODEL, "input": text });
        let value = self.post_json("/v1/embeddings", &body).await?;

        let values = value
            .pointer("/data/0/embedding")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse {
                provider: PROVIDER,
                detail: "response missing data[0].embedding".to_string(),
            })?;
        let mut embedding = Vec::with_capacity(values.len());
        for component in values {
            let number = component
                .as_f64()
                .ok_or_else(|| AiError::MalformedResponse {
                    provider: PROVIDER,
                    detail: "embedding component is not numeric".to_string(),
                })?;
            embedding.push(number as f32);
        }
        Ok(embedding)
    }

    async fn answer(&self, query: &str, context: &str) -> Result<String, AiError> {
        let body = json!({
            "model": CHAT_MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("Context: {context}\n\nQuestion: {query}") }
            ],
            "temperature": 0.5,
            "max_tokens": 500
        });
        let value = self.post_json("/v1/chat/completions", &body).await?;

        let message = value
            .pointer("/choices/0/message")
            .ok_or_else(|| AiError::MalformedResponse {
                provider: PROVIDER,
                detail: "response carries no choices".to_string(),
            })?;
        let answer = message
            .get("content")
            .and_then(Value::as_str)
            .filter(|content| !content.is_empty())
            .unwrap_or(ANSWER_FALLBACK);
        Ok(answer.to_string())
    }

    async fn check_availability(&self) -> bool {
        let response = self
            .client
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await;
        match response {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
