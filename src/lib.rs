#![deny(missing_docs)]

//! Core library for the docchat document-grounded chat server.

/// AI provider gateway (embeddings and answer generation).
pub mod ai;
/// HTTP routing and REST handlers.
pub mod api;
/// Retrieval-augmented chat over ingested documents.
pub mod chat;
/// Environment-driven configuration management.
pub mod config;
/// Document text extraction adapters.
pub mod extract;
/// Ingestion pipeline: chunking, embedding, and storage.
pub mod ingest;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion and query metrics helpers.
pub mod metrics;
/// Supabase vector store integration.
pub mod store;
/// Upload acceptance rules.
pub mod upload;
