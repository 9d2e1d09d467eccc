use std::env;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docchat server.
///
/// Built once in `main` and handed to each component; nothing reads the
/// environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Supabase project backing the vector store.
    pub supabase_url: String,
    /// Supabase API key sent as both `apikey` and bearer token.
    pub supabase_key: String,
    /// AI provider used for embeddings and answer generation.
    pub ai: AiSettings,
    /// Optional override for the chunker's token target.
    pub chunk_target_tokens: Option<usize>,
    /// Optional override for the chunker's word overlap.
    pub chunk_overlap_words: Option<usize>,
    /// Optional override for the embedding batch size.
    pub ingest_batch_size: Option<usize>,
    /// Optional override for the number of chunks retrieved per query.
    pub search_match_count: Option<usize>,
    /// Optional override for the similarity threshold applied server-side.
    pub search_match_threshold: Option<f32>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Provider selection together with the credentials it was validated with.
///
/// Carrying the key inside the variant means a configured provider can never
/// be missing its credentials downstream.
#[derive(Debug, Clone)]
pub enum AiSettings {
    /// Google Gemini REST API.
    Gemini {
        /// API key passed as the `key` query parameter.
        api_key: String,
        /// Optional base URL override, used by tests and proxies.
        base_url: Option<String>,
    },
    /// OpenAI REST API.
    OpenAi {
        /// API key passed as a bearer token.
        api_key: String,
        /// Optional base URL override, used by tests and proxies.
        base_url: Option<String>,
    },
}

impl AiSettings {
    /// Short provider label for logs and error messages.
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Gemini { .. } => "gemini",
            Self::OpenAi { .. } => "openai",
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = load_env_optional("AI_PROVIDER").unwrap_or_else(|| "gemini".to_string());
        let ai = match provider.to_lowercase().as_str() {
            "gemini" => AiSettings::Gemini {
                api_key: load_env("GEMINI_API_KEY")?,
                base_url: load_env_optional("GEMINI_BASE_URL"),
            },
            "openai" => AiSettings::OpenAi {
                api_key: load_env("OPENAI_API_KEY")?,
                base_url: load_env_optional("OPENAI_BASE_URL"),
            },
            _ => return Err(ConfigError::InvalidValue("AI_PROVIDER".to_string())),
        };
        Ok(Self {
            supabase_url: load_env("SUPABASE_URL")?,
            supabase_key: load_env("SUPABASE_ANON_KEY")?,
            ai,
            chunk_target_tokens: parse_optional("CHUNK_TARGET_TOKENS")?,
            chunk_overlap_words: parse_optional("CHUNK_OVERLAP_WORDS")?,
            ingest_batch_size: parse_optional("INGEST_BATCH_SIZE")?,
            search_match_count: parse_optional("SEARCH_MATCH_COUNT")?,
            search_match_threshold: parse_optional("SEARCH_MATCH_THRESHOLD")?,
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}
