//! Google Gemini adapter using the `v1beta` REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::{AiClient, AiError, status_error};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const EMBED_MODEL: &str = "embedding-001";
const ANSWER_MODEL: &str = "gemini-pro";
const PROVIDER: &str = "gemini";

/// HTTP client for the Gemini embedding and generation endpoints.
pub struct GeminiClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl GeminiClient {
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

    async fn call_model(&self, model: &str, action: &str, body: &Value) -> Result<Value, AiError> {
        let url = format!("{}/v1beta/models/{model}:{action}", self.base_url);
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
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

    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let body = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });
        let value = self.call_model(ANSWER_MODEL, "generateContent", &body).await?;

        let parts = value
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse {
                provider: PROVIDER,
                detail: "response carries no candidate parts".to_string(),
            })?;
        let answer: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        Ok(answer)
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError> {
        let body = json!({
            "model": format!("models/{EMBED_MODEL}"),
            "content": { "parts": [ { "text": text } ] }
        });
        let value = self.call_model(EMBED_MODEL, "embedContent", &body).await?;

        let values = value
            .pointer("/embedding/values")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse {
                provider: PROVIDER,
                detail: "response missing embedding.values".to_string(),
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
        let prompt = format!(
            "Context: {context}\n\nQuestion: {query}\n\nAnswer the question based only on the \
             provided context. If you cannot find the answer in the context, say so."
        );
        self.generate(&prompt).await
    }

    async fn check_availability(&self) -> bool {
        self.generate("test").await.is_ok()
    }
}
