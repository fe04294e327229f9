use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::Path;
use std::time::Duration;

use tailor::TailorConfig;

/// CLI configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    pub pinecone: Option<PineconeSettings>,
    pub request_timeout: Duration,
}

#[derive(Clone)]
pub struct PineconeSettings {
    pub api_key: String,
    pub index_host: String,
    pub namespace: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("openai_base_url", &self.openai_base_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("pinecone", &self.pinecone.as_ref().map(|p| &p.index_host))
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let pinecone = match env::var("PINECONE_API_KEY").ok().filter(|k| !k.trim().is_empty()) {
            Some(api_key) => Some(PineconeSettings {
                api_key,
                index_host: env::var("PINECONE_INDEX_HOST")
                    .context("PINECONE_INDEX_HOST must be set when PINECONE_API_KEY is set")?,
                namespace: env::var("PINECONE_NAMESPACE").ok(),
            }),
            None => None,
        };

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-ada-002".to_string()),
            pinecone,
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
        })
    }
}

/// Pipeline settings from an optional JSON file; missing keys keep defaults.
pub fn load_tailor_config(path: Option<&Path>) -> Result<TailorConfig> {
    let Some(path) = path else {
        return Ok(TailorConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
}
