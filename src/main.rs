use docchat::{ai, api, chat, config, extract, ingest, logging, metrics, store};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Configuration error: {error}");
            std::process::exit(1);
        }
    };
    logging::init_tracing();
    tracing::debug!(provider = config.ai.provider_name(), "Configuration loaded");

    let ai = ai::client_from_config(&config).expect("Failed to build AI client");
    let store = Arc::new(
        store::SupabaseStore::new(&config.supabase_url, &config.supabase_key)
            .expect("Failed to build Supabase client"),
    );
    let metrics = Arc::new(metrics::ServerMetrics::new());

    let chunker = ingest::Chunker::new(
        config
            .chunk_target_tokens
            .unwrap_or(ingest::DEFAULT_TARGET_TOKENS),
        config
            .chunk_overlap_words
            .unwrap_or(ingest::DEFAULT_OVERLAP_WORDS),
    );
    let ingestor = ingest::BatchIngestor::new(
        ai.clone(),
        store.clone(),
        config.ingest_batch_size.unwrap_or(ingest::DEFAULT_BATCH_SIZE),
    );
    let pipeline = Arc::new(ingest::IngestionPipeline::new(
        extract::ExtractorSet::with_defaults(),
        chunker,
        ingestor,
        metrics.clone(),
    ));
    let chat = Arc::new(chat::ChatService::new(
        ai.clone(),
        store,
        config
            .search_match_count
            .unwrap_or(chat::DEFAULT_MATCH_COUNT),
        config
            .search_match_threshold
            .unwrap_or(chat::DEFAULT_MATCH_THRESHOLD),
        metrics.clone(),
    ));
    let app = api::create_router(api::AppState::new(pipeline, chat, ai, metrics));

    let (listener, port) = bind_listener(config.server_port)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.unwrap();
}

async fn bind_listener(configured_port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = configured_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8300..=8399;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8300-8399",
    ))
}
