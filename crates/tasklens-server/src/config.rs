//! Configuration for the Tasklens Server
//!
//! Values come from environment variables (a `.env` file is loaded first by
//! the binaries). Anything unset falls back to a default; anything set but
//! unparsable is an error.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

use tasklens_kb::embedding::{
    ChunkerConfig, EmbeddingServiceConfig, DEFAULT_CHUNK_CONCURRENCY, DEFAULT_MODEL, DEFAULT_OPENAI_MODEL,
    DEFAULT_TEI_URL,
};
use tasklens_kb::{ConfigError, SearchOptions, StoreConfig};

use crate::error::{ServerError, ServerResult};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable logs for development
    Pretty,
    /// One JSON object per line for log aggregation
    Json,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Host to bind to
    pub bind_address: String,

    /// Port to listen on
    pub port: u16,

    /// Record store connection
    pub store: StoreConfig,

    /// Embedding backend
    pub embedding: EmbeddingServiceConfig,

    /// Chunking of long texts
    pub chunker: ChunkerConfig,

    /// Max chunk embeddings in flight per text
    pub chunk_concurrency: usize,

    /// Search defaults when a request omits them
    pub search: SearchOptions,

    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5001,
            store: StoreConfig::default(),
            embedding: EmbeddingServiceConfig::default(),
            chunker: ChunkerConfig::default(),
            chunk_concurrency: DEFAULT_CHUNK_CONCURRENCY,
            search: SearchOptions::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `load` uses the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("SERVICE_HOST") {
            config.bind_address = host;
        }
        if let Some(port) = parse_var(&lookup, "SERVICE_PORT")? {
            config.port = port;
        }

        if let Some(uri) = lookup("STORE_URI") {
            config.store.uri = uri;
        }
        if let Some(database) = lookup("STORE_DATABASE") {
            config.store.database = database;
        }
        if let Some(collection) = lookup("STORE_COLLECTION") {
            config.store.collection = collection;
        }
        if let Some(username) = lookup("STORE_USERNAME") {
            config.store.username = username;
        }
        if let Some(password) = lookup("STORE_PASSWORD") {
            config.store.password = password;
        }

        config.embedding = embedding_config(&lookup)?;

        let max_words = parse_var(&lookup, "CHUNK_MAX_WORDS")?.unwrap_or(config.chunker.max_words());
        let overlap_words = parse_var(&lookup, "CHUNK_OVERLAP_WORDS")?.unwrap_or(config.chunker.overlap_words());
        config.chunker = ChunkerConfig::new(max_words, overlap_words)?;

        if let Some(concurrency) = parse_var::<usize, _>(&lookup, "CHUNK_CONCURRENCY")? {
            if concurrency == 0 {
                return Err(invalid("CHUNK_CONCURRENCY", "0"));
            }
            config.chunk_concurrency = concurrency;
        }

        if let Some(top_n) = parse_var::<usize, _>(&lookup, "SEARCH_TOP_N")? {
            if top_n == 0 {
                return Err(invalid("SEARCH_TOP_N", "0"));
            }
            config.search.top_n = top_n;
        }
        if let Some(min_score) = parse_var::<f32, _>(&lookup, "SEARCH_MIN_SCORE")? {
            if !min_score.is_finite() {
                return Err(invalid("SEARCH_MIN_SCORE", &min_score.to_string()));
            }
            config.search.min_score = min_score;
        }

        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.log_level = log_level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = match format.to_ascii_lowercase().as_str() {
                "pretty" | "text" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => return Err(invalid("LOG_FORMAT", &format)),
            };
        }

        Ok(config)
    }

    /// Socket address to listen on
    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|_| invalid("SERVICE_HOST", &self.bind_address))
    }

    /// Logs the effective configuration without secrets
    pub fn log_summary(&self) {
        info!(
            bind_address = %self.bind_address,
            port = self.port,
            store_uri = %self.store.uri,
            database = %self.store.database,
            collection = %self.store.collection,
            embedding_provider = self.embedding.provider_name(),
            chunk_max_words = self.chunker.max_words(),
            chunk_overlap_words = self.chunker.overlap_words(),
            chunk_concurrency = self.chunk_concurrency,
            search_top_n = self.search.top_n,
            search_min_score = self.search.min_score,
            "Loaded configuration"
        );
    }
}

fn embedding_config<F>(lookup: &F) -> ServerResult<EmbeddingServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = lookup("EMBEDDING_PROVIDER").unwrap_or_else(|| "tei".to_string());
    match provider.to_ascii_lowercase().as_str() {
        "tei" => Ok(EmbeddingServiceConfig::Tei {
            url: lookup("EMBEDDING_URL").unwrap_or_else(|| DEFAULT_TEI_URL.to_string()),
            model: lookup("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(30),
        }),
        "openai" => {
            let api_key = lookup("OPENAI_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| ServerError::from(ConfigError::Missing("OPENAI_API_KEY".to_string())))?;
            Ok(EmbeddingServiceConfig::OpenAI {
                api_key,
                model: lookup("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            })
        }
        "mock" => Ok(EmbeddingServiceConfig::Mock {
            dimensions: parse_var(lookup, "EMBEDDING_DIMENSIONS")?.unwrap_or(384),
        }),
        _ => Err(ConfigError::Unsupported {
            kind: "embedding provider".to_string(),
            value: provider,
        }
        .into()),
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> ServerResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| invalid(key, &raw)),
    }
}

fn invalid(key: &str, value: &str) -> ServerError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> ServerResult<ServerConfig> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 5001);
        assert_eq!(config.store.database, "todo-app-db");
        assert_eq!(config.store.collection, "tasks");
        assert_eq!(config.chunker.max_words(), 200);
        assert_eq!(config.chunker.overlap_words(), 50);
        assert_eq!(config.search, SearchOptions { top_n: 10, min_score: 0.4 });
        assert_eq!(config.embedding.provider_name(), "tei");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SERVICE_PORT", "8000"),
            ("STORE_URI", "bolt://db:7687"),
            ("EMBEDDING_PROVIDER", "mock"),
            ("EMBEDDING_DIMENSIONS", "64"),
            ("CHUNK_MAX_WORDS", "100"),
            ("CHUNK_OVERLAP_WORDS", "10"),
            ("SEARCH_TOP_N", "3"),
            ("SEARCH_MIN_SCORE", "0.25"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.store.uri, "bolt://db:7687");
        assert_eq!(config.embedding, EmbeddingServiceConfig::Mock { dimensions: 64 });
        assert_eq!(config.chunker.stride(), 90);
        assert_eq!(config.search, SearchOptions { top_n: 3, min_score: 0.25 });
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        for (key, value) in [
            ("SERVICE_PORT", "eighty"),
            ("CHUNK_MAX_WORDS", "-1"),
            ("SEARCH_TOP_N", "0"),
            ("SEARCH_MIN_SCORE", "high"),
            ("CHUNK_CONCURRENCY", "0"),
        ] {
            assert!(load(&[(key, value)]).is_err(), "{}={} should be rejected", key, value);
        }
    }

    #[test]
    fn test_overlap_not_below_max_is_rejected() {
        let err = load(&[("CHUNK_MAX_WORDS", "50"), ("CHUNK_OVERLAP_WORDS", "50")]).unwrap_err();
        assert!(matches!(
            err,
            ServerError::Config(ConfigError::InvalidChunking {
                max_words: 50,
                overlap_words: 50
            })
        ));
    }

    #[test]
    fn test_openai_requires_key() {
        assert!(load(&[("EMBEDDING_PROVIDER", "openai")]).is_err());
        let config = load(&[("EMBEDDING_PROVIDER", "openai"), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.embedding.provider_name(), "openai");
    }

    #[test]
    fn test_unknown_provider() {
        let err = load(&[("EMBEDDING_PROVIDER", "word2vec")]).unwrap_err();
        assert!(err.to_string().contains("word2vec"));
    }

    #[test]
    fn test_socket_addr() {
        let config = load(&[("SERVICE_HOST", "127.0.0.1"), ("SERVICE_PORT", "9000")]).unwrap();
        assert_eq!(config.socket_addr().unwrap(), "127.0.0.1:9000".parse().unwrap());
    }
}
