//! Configuration management for justask
//!
//! Handles loading, saving, and validating configuration from TOML files.
//! Every tunable the answer paths consume lives here; components receive
//! the validated structure by reference instead of reading the environment.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::models::Strategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Qdrant connection URL
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Environment variable name for Qdrant API key
    #[serde(default = "default_qdrant_api_key_env")]
    pub qdrant_api_key_env: String,

    /// Vector collections searched by the fan-out retriever
    #[serde(default = "default_collections")]
    pub collections: Vec<String>,

    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Completion model configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Retrieval limits
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Routing policy
    #[serde(default)]
    pub router: RouterConfig,

    /// Relational store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding backend URL
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Model name/identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension (must match every collection's configured size)
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

/// Completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Completion backend URL
    #[serde(default = "default_completion_url")]
    pub url: String,

    /// Model name/identifier
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// Sampling temperature; 0 is fully deterministic
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Hits requested from each collection
    #[serde(default = "default_per_collection_limit")]
    pub per_collection_limit: usize,

    /// Global context budget after the cross-collection merge
    #[serde(default = "default_context_budget")]
    pub context_budget: usize,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Fall back to semantic search when the SQL path fails
    #[serde(default = "default_fallback_enabled")]
    pub fallback_enabled: bool,

    /// Skip automatic classification and always use this strategy
    #[serde(default)]
    pub default_strategy: Option<Strategy>,
}

/// Relational store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Environment variable name for the Postgres connection URL
    #[serde(default = "default_database_url_env")]
    pub url_env: String,

    /// Dialect name embedded in the SQL generation prompt
    #[serde(default = "default_sql_dialect")]
    pub dialect: String,

    /// Schema descriptor file, relative paths resolve against the base dir
    #[serde(default = "default_schema_file")]
    pub schema_file: String,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for justask data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
            qdrant_api_key_env: default_qdrant_api_key_env(),
            collections: default_collections(),
            embedding: EmbeddingConfig::default(),
            completion: CompletionConfig::default(),
            retrieval: RetrievalConfig::default(),
            router: RouterConfig::default(),
            database: DatabaseConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            url: default_completion_url(),
            model: default_completion_model(),
            temperature: default_temperature(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            per_collection_limit: default_per_collection_limit(),
            context_budget: default_context_budget(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: default_fallback_enabled(),
            default_strategy: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url_env: default_database_url_env(),
            dialect: default_sql_dialect(),
            schema_file: default_schema_file(),
        }
    }
}

impl Config {
    /// Get the default base directory for justask (~/.justask)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".justask")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Get the Qdrant API key from environment
    pub fn qdrant_api_key(&self) -> Option<String> {
        std::env::var(&self.qdrant_api_key_env).ok()
    }

    /// Get the Postgres connection URL from environment
    pub fn database_url(&self) -> Result<String> {
        std::env::var(&self.database.url_env).map_err(|_| {
            Error::Config(format!(
                "Database URL not set; export {}",
                self.database.url_env
            ))
        })
    }

    /// Resolve the schema descriptor path against the base dir
    pub fn schema_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.database.schema_file);
        if path.is_absolute() {
            path
        } else {
            self.paths.base_dir.join(path)
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.collections.is_empty() {
            return Err(Error::Config(
                "collections must name at least one vector collection".to_string(),
            ));
        }

        if self.embedding.dimension == 0 {
            return Err(Error::Config(
                "embedding.dimension must be positive".to_string(),
            ));
        }

        if self.retrieval.per_collection_limit == 0 {
            return Err(Error::Config(
                "retrieval.per_collection_limit must be positive".to_string(),
            ));
        }

        if self.retrieval.context_budget == 0 {
            return Err(Error::Config(
                "retrieval.context_budget must be positive".to_string(),
            ));
        }

        if self.completion.temperature < 0.0 || self.completion.temperature > 2.0 {
            return Err(Error::Config(
                "completion.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        Ok(())
    }
}
