//! HTTP surface for the document chat server.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /documents` – Validate an upload, extract its text, and run the full
//!   ingestion pipeline. Accepts any of the supported content types under the
//!   general 10 MB cap and returns `{document_id, chunks, pages}`.
//! - `POST /documents/pdf` – Dedicated PDF path with the larger 50 MB cap and
//!   fine-grained progress reporting.
//! - `POST /chat` – Answer a question grounded in previously ingested chunks.
//!   Never fails; pipeline errors surface as a fallback answer.
//! - `GET /health` – Report whether the configured AI provider is reachable.
//! - `GET /metrics` – Observe ingestion and query counters.
//!
//! Uploads arrive as JSON with base64 payloads, so the same surface serves
//! browsers and scripted clients without multipart handling.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ai::AiClient;
use crate::chat::ChatService;
use crate::ingest::{
    IngestError, IngestionPipeline, IngestionSummary, Progress, skip_embedding_stage,
};
use crate::metrics::ServerMetrics;
use crate::upload::{self, MAX_PDF_UPLOAD_BYTES, UploadedFile, ValidationError};

/// Shared components handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<IngestionPipeline>,
    chat: Arc<ChatService>,
    ai: Arc<dyn AiClient>,
    metrics: Arc<ServerMetrics>,
}

impl AppState {
    /// Bundle the assembled components for the router.
    pub fn new(
        pipeline: Arc<IngestionPipeline>,
        chat: Arc<ChatService>,
        ai: Arc<dyn AiClient>,
        metrics: Arc<ServerMetrics>,
    ) -> Self {
        Self {
            pipeline,
            chat,
            ai,
            metrics,
        }
    }
}

/// Build the HTTP router exposing the document and chat API surface.
///
/// The body limit is sized for the PDF path plus base64 overhead; the
/// per-path caps are enforced after decoding.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/documents", post(upload_document))
        .route("/documents/pdf", post(upload_pdf))
        .route("/chat", post(chat_query))
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .layer(DefaultBodyLimit::max(MAX_PDF_UPLOAD_BYTES * 2))
        .with_state(state)
}

/// Request body for the upload endpoints.
#[derive(Deserialize)]
struct UploadRequest {
    /// Original file name, echoed back through progress events.
    filename: String,
    /// Declared MIME type of the payload.
    content_type: String,
    /// File bytes, base64-encoded (standard alphabet with padding).
    data: String,
}

impl UploadRequest {
    fn decode(self) -> Result<UploadedFile, AppError> {
        let bytes = STANDARD
            .decode(self.data.as_bytes())
            .map_err(|error| AppError::Payload(format!("Invalid base64 payload: {error}")))?;
        Ok(UploadedFile {
            name: self.filename,
            content_type: self.content_type,
            bytes,
        })
    }
}

/// Ingest a document on the general path.
///
/// Progress is logged rather than streamed; the embedding stage is folded
/// away so the log shows the coarse upload/process/store sequence.
async fn upload_document(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<IngestionSummary>, AppError> {
    let file = request.decode()?;
    upload::validate_upload(&file)?;

    let sink = skip_embedding_stage(log_progress);
    let summary = state.pipeline.ingest_document(file, &sink).await?;
    Ok(Json(summary))
}

/// Ingest a PDF on the dedicated path with the larger size cap.
async fn upload_pdf(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<IngestionSummary>, AppError> {
    let file = request.decode()?;
    upload::validate_pdf_upload(&file)?;

    let summary = state.pipeline.ingest_document(file, &log_progress).await?;
    Ok(Json(summary))
}

fn log_progress(event: Progress) {
    tracing::debug!(
        stage = event.stage.as_str(),
        progress = event.progress,
        total = event.total,
        file = %event.file_name,
        "Ingestion progress"
    );
}

/// Request body for the `POST /chat` endpoint.
#[derive(Deserialize)]
struct ChatRequest {
    /// User question to answer from stored context.
    query: String,
}

/// Response body for the `POST /chat` endpoint.
#[derive(Serialize)]
struct ChatResponse {
    answer: String,
}

/// Answer a query over the ingested corpus.
async fn chat_query(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let answer = state.chat.answer_query(&request.query).await;
    Json(ChatResponse { answer })
}

/// Response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    ai_available: bool,
}

/// Report provider reachability; degraded state maps to 503.
async fn health(State(state): State<AppState>) -> Response {
    let available = state.ai.check_availability().await;
    let status = if available {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        status: if available { "ok" } else { "degraded" },
        ai_available: available,
    };
    (status, Json(body)).into_response()
}

/// Return ingestion and query counters.
async fn get_metrics(State(state): State<AppState>) -> Json<crate::metrics::MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

enum AppError {
    Validation(ValidationError),
    Payload(String),
    Ingest(IngestError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(error) => {
                let status = match &error {
                    ValidationError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    ValidationError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                };
                (status, error.to_string())
            }
            AppError::Payload(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Ingest(error) => {
                tracing::error!(error = %error, "Ingestion request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        };
        (status, message).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(inner: ValidationError) -> Self {
        Self::Validation(inner)
    }
}

impl From<IngestError> for AppError {
    fn from(inner: IngestError) -> Self {
        Self::Ingest(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiError;
    use crate::chat::{DEFAULT_MATCH_COUNT, DEFAULT_MATCH_THRESHOLD};
    use crate::extract::ExtractorSet;
    use crate::ingest::{BatchIngestor, Chunker, DEFAULT_BATCH_SIZE};
    use crate::store::{ChunkRow, HistoryRecord, SearchHit, StoreError, VectorStore};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request},
    };
    use serde_json::json;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct StubAi {
        available: bool,
    }

    #[async_trait]
    impl AiClient for StubAi {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, AiError> {
            Ok(vec![0.5, 0.25])
        }

        async fn answer(&self, _query: &str, _context: &str) -> Result<String, AiError> {
            Ok("stub answer".to_string())
        }

        async fn check_availability(&self) -> bool {
            self.available
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        rows: Mutex<Vec<ChunkRow>>,
        hits: Vec<SearchHit>,
        history: Mutex<Option<HistoryRecord>>,
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn insert(&self, rows: &[ChunkRow]) -> Result<(), StoreError> {
            self.rows.lock().unwrap().extend(rows.to_vec());
            Ok(())
        }

        async fn search(
            &self,
            _embedding: &[f32],
            _threshold: f32,
            _limit: usize,
        ) -> Result<Vec<SearchHit>, StoreError> {
            Ok(self.hits.clone())
        }

        async fn append_history(&self, record: &HistoryRecord) -> Result<(), StoreError> {
            *self.history.lock().unwrap() = Some(record.clone());
            Ok(())
        }
    }

    fn test_state(ai: StubAi, store: Arc<RecordingStore>) -> AppState {
        let ai: Arc<dyn AiClient> = Arc::new(ai);
        let metrics = Arc::new(ServerMetrics::default());
        let pipeline = Arc::new(IngestionPipeline::new(
            ExtractorSet::with_defaults(),
            Chunker::default(),
            BatchIngestor::new(ai.clone(), store.clone(), DEFAULT_BATCH_SIZE),
            metrics.clone(),
        ));
        let chat = Arc::new(ChatService::new(
            ai.clone(),
            store,
            DEFAULT_MATCH_COUNT,
            DEFAULT_MATCH_THRESHOLD,
            metrics.clone(),
        ));
        AppState::new(pipeline, chat, ai, metrics)
    }

    fn post_json(uri: &str, payload: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json body")
    }

    #[tokio::test]
    async fn upload_ingests_a_text_document() {
        let store = Arc::new(RecordingStore::default());
        let app = create_router(test_state(StubAi { available: true }, store.clone()));

        let payload = json!({
            "filename": "notes.txt",
            "content_type": "text/plain",
            "data": STANDARD.encode("One paragraph of text."),
        });
        let response = app
            .oneshot(post_json("/documents", payload))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["chunks"], 1);
        assert_eq!(json["pages"], 1);
        assert_eq!(json["document_id"].as_str().unwrap().len(), 36);
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upload_rejects_unknown_content_type() {
        let store = Arc::new(RecordingStore::default());
        let app = create_router(test_state(StubAi { available: true }, store.clone()));

        let payload = json!({
            "filename": "img.png",
            "content_type": "image/png",
            "data": STANDARD.encode("not really a png"),
        });
        let response = app
            .oneshot(post_json("/documents", payload))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_rejects_malformed_base64() {
        let store = Arc::new(RecordingStore::default());
        let app = create_router(test_state(StubAi { available: true }, store));

        let payload = json!({
            "filename": "notes.txt",
            "content_type": "text/plain",
            "data": "this is not base64!!!",
        });
        let response = app
            .oneshot(post_json("/documents", payload))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pdf_route_rejects_other_types() {
        let store = Arc::new(RecordingStore::default());
        let app = create_router(test_state(StubAi { available: true }, store));

        let payload = json!({
            "filename": "notes.txt",
            "content_type": "text/plain",
            "data": STANDARD.encode("plain text"),
        });
        let response = app
            .oneshot(post_json("/documents/pdf", payload))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn chat_answers_and_records_history() {
        let store = Arc::new(RecordingStore {
            hits: vec![SearchHit {
                id: "4".to_string(),
                content: "Stored passage.".to_string(),
                metadata: serde_json::Value::Null,
                similarity: 0.92,
            }],
            ..Default::default()
        });
        let app = create_router(test_state(StubAi { available: true }, store.clone()));

        let response = app
            .oneshot(post_json("/chat", json!({ "query": "What is stored?" })))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["answer"], "stub answer");

        let history = store.history.lock().unwrap();
        assert_eq!(history.as_ref().unwrap().relevant_docs, vec!["4"]);
    }

    #[tokio::test]
    async fn health_reflects_provider_availability() {
        let store = Arc::new(RecordingStore::default());
        let app = create_router(test_state(StubAi { available: true }, store));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["ai_available"], true);

        let store = Arc::new(RecordingStore::default());
        let app = create_router(test_state(StubAi { available: false }, store));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["status"], "degraded");
    }

    #[tokio::test]
    async fn metrics_count_uploads_and_queries() {
        let store = Arc::new(RecordingStore::default());
        let app = create_router(test_state(StubAi { available: true }, store));

        let payload = json!({
            "filename": "notes.txt",
            "content_type": "text/plain",
            "data": STANDARD.encode("Counted paragraph."),
        });
        let response = app
            .clone()
            .oneshot(post_json("/documents", payload))
            .await
            .expect("upload response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(post_json("/chat", json!({ "query": "count me" })))
            .await
            .expect("chat response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("metrics response");
        let json = body_json(response).await;
        assert_eq!(json["documents_ingested"], 1);
        assert_eq!(json["chunks_ingested"], 1);
        assert_eq!(json["queries_answered"], 1);
    }
}
