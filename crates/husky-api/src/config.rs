use config::{Config as ConfigLoader, ConfigError, Environment, File};
use husky_types::HuskyConfig;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub mongodb: MongoDbConfig,
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    pub logging: LoggingConfig,

    /// Engine settings: models, collections, thresholds, links
    #[serde(default)]
    pub husky: HuskyConfig,

    // Secrets (from ENV only)
    #[serde(skip)]
    pub mongodb_uri: String,
    #[serde(skip)]
    pub openai_api_key: String,
    #[serde(skip)]
    pub qdrant_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight persistence on shutdown
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

fn default_shutdown_grace_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
    /// Database holding the directory tables, when not `database`
    #[serde(default)]
    pub directory_database: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QdrantConfig {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible endpoint, the public API when unset
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn section_env(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .keep_prefix(true)
        .separator("_")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_, MONGODB_, QDRANT_, LLM_ and LOG_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(section_env("SERVER"))
            .add_source(section_env("MONGODB"))
            .add_source(section_env("QDRANT"))
            .set_override_option("llm.base_url", std::env::var("LLM_BASE_URL").ok())?
            .set_override_option("logging.level", std::env::var("LOG_LEVEL").ok())?
            .set_override_option("logging.format", std::env::var("LOG_FORMAT").ok())?;

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets are never read from TOML
        cfg.mongodb_uri = std::env::var("MONGODB_URI").map_err(|_| {
            ConfigError::Message("MONGODB_URI environment variable is required".to_string())
        })?;
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string())
        })?;
        cfg.qdrant_api_key = std::env::var("QDRANT_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        builder.build()?.try_deserialize()
    }
}
