/// Configuration management for reels-service
///
/// Loads configuration from environment variables with development
/// defaults. Secrets (JWT secret, provider API keys) have no defaults.
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub openai: OpenAiConfig,
    pub vector_store: VectorStoreConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CacheConfig {
    pub redis_url: String,
    pub feed_ttl_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiry_days: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_base: String,
    pub transcription_model: String,
    pub embedding_model: String,
    pub chat_model: String,
}

/// Pinecone-style serverless index. Both fields must be present for the
/// summary pipeline to reach the vector store.
#[derive(Clone, Debug, Deserialize)]
pub struct VectorStoreConfig {
    pub api_key: Option<String>,
    pub index_host: Option<String>,
    pub top_k: usize,
    pub upsert_batch_size: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            app: AppConfig {
                host: std::env::var("REELS_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("REELS_SERVICE_PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .unwrap_or(5000),
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/studyreel".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            cache: CacheConfig {
                redis_url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost".to_string()),
                feed_ttl_secs: std::env::var("FEED_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            },
            storage: StorageConfig {
                upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
                max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500 * 1024 * 1024),
            },
            auth: AuthConfig {
                jwt_secret: std::env::var("JWT_SECRET")
                    .map_err(|_| "JWT_SECRET must be set (no default)")?,
                token_expiry_days: std::env::var("JWT_EXPIRES_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(7),
            },
            openai: OpenAiConfig {
                api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
                api_base: std::env::var("OPENAI_API_BASE")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                transcription_model: std::env::var("TRANSCRIPTION_MODEL")
                    .unwrap_or_else(|_| "whisper-1".to_string()),
                embedding_model: std::env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
                chat_model: std::env::var("CHAT_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            },
            vector_store: VectorStoreConfig {
                api_key: std::env::var("PINECONE_API_KEY").ok(),
                index_host: std::env::var("PINECONE_INDEX_HOST").ok(),
                top_k: std::env::var("VECTOR_TOP_K")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                upsert_batch_size: std::env::var("VECTOR_UPSERT_BATCH_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(50),
            },
        })
    }

    pub fn is_development(&self) -> bool {
        self.app.env == "development"
    }
}

impl VectorStoreConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.index_host.as_deref().is_some_and(|h| !h.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_store_requires_both_fields() {
        let cfg = VectorStoreConfig {
            api_key: Some("pk-test".to_string()),
            index_host: None,
            top_k: 5,
            upsert_batch_size: 50,
        };
        assert!(!cfg.is_configured());

        let cfg = VectorStoreConfig {
            api_key: Some("pk-test".to_string()),
            index_host: Some("https://idx.svc.pinecone.io".to_string()),
            top_k: 5,
            upsert_batch_size: 50,
        };
        assert!(cfg.is_configured());
    }

    #[test]
    fn empty_strings_do_not_count_as_configured() {
        let cfg = VectorStoreConfig {
            api_key: Some(String::new()),
            index_host: Some("https://idx.svc.pinecone.io".to_string()),
            top_k: 5,
            upsert_batch_size: 50,
        };
        assert!(!cfg.is_configured());
    }
}
