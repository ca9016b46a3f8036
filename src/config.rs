use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::catalog::recommend::KeywordTable;

/// Main configuration structure loaded from persona_books.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub auth: AuthConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Book catalog endpoint, limits, and the personality keyword table
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub recommend_max_results: u32,
    pub search_max_results: u32,
    /// Personality label -> search keywords
    pub keywords: BTreeMap<String, Vec<String>>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/books/v1".to_string(),
            timeout_ms: 10_000,
            recommend_max_results: 10,
            search_max_results: 20,
            keywords: KeywordTable::default().into_map(),
        }
    }
}

/// Argon2id cost parameters for stored password hashes
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            argon2_memory_kib: 19_456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub http_bind: std::net::SocketAddr,
    pub database_path: PathBuf,
    pub google_books_api_key: Option<String>,
    pub log_level: String,
    pub http_request_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            http_bind: std::net::SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_path: PathBuf::from("persona_books.db"),
            google_books_api_key: None,
            log_level: "persona_books=info,tower_http=info".to_string(),
            http_request_timeout_ms: 30_000,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("PERSONA_HTTP_BIND")
            && let Ok(bind) = v.parse::<std::net::SocketAddr>()
        {
            cfg.http_bind = bind;
        }
        if let Ok(path) = std::env::var("PERSONA_DB_PATH") {
            cfg.database_path = PathBuf::from(path);
        }
        cfg.google_books_api_key = std::env::var("GOOGLE_BOOKS_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if let Ok(level) = std::env::var("RUST_LOG") {
            cfg.log_level = level;
        }
        if let Some(timeout) = std::env::var("PERSONA_HTTP_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            cfg.http_request_timeout_ms = timeout;
        }

        cfg
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses PERSONA_BOOKS_CONFIG environment variable or defaults to "persona_books.toml"
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("PERSONA_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path = std::env::var("PERSONA_BOOKS_CONFIG")
            .unwrap_or_else(|_| "persona_books.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        // Env-first overrides for the catalog endpoint
        if let Ok(url) = std::env::var("PERSONA_CATALOG_BASE_URL") {
            tracing::debug!("PERSONA_CATALOG_BASE_URL env override applied");
            config.catalog.base_url = url;
        }
        if let Some(timeout) = std::env::var("PERSONA_CATALOG_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            tracing::debug!("PERSONA_CATALOG_TIMEOUT_MS env override applied");
            config.catalog.timeout_ms = timeout;
        }

        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Parse the file-backed sections; runtime settings stay at their defaults.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let catalog = &self.catalog;
        if !catalog.base_url.starts_with("http://") && !catalog.base_url.starts_with("https://") {
            anyhow::bail!(
                "catalog.base_url '{}' must start with http:// or https://",
                catalog.base_url
            );
        }
        if catalog.timeout_ms == 0 {
            anyhow::bail!("catalog.timeout_ms must be greater than zero");
        }
        for (name, cap) in [
            ("recommend_max_results", catalog.recommend_max_results),
            ("search_max_results", catalog.search_max_results),
        ] {
            // Google Books rejects maxResults above 40
            if cap == 0 || cap > 40 {
                anyhow::bail!("catalog.{} must be between 1 and 40, got {}", name, cap);
            }
        }
        if !catalog.keywords.contains_key(KeywordTable::FALLBACK_LABEL) {
            anyhow::bail!(
                "catalog.keywords must define a '{}' entry",
                KeywordTable::FALLBACK_LABEL
            );
        }
        if catalog.keywords.values().any(|words| words.is_empty()) {
            anyhow::bail!("catalog.keywords entries must list at least one keyword");
        }

        argon2::Params::new(
            self.auth.argon2_memory_kib,
            self.auth.argon2_iterations,
            self.auth.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid argon2 parameters: {}", e))?;

        Ok(())
    }
}
