use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::canonical::DEFAULT_BASE_URL;
use crate::reconciler::ReadPolicy;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ParserConfig {
    /// Site the canonical recipe URLs point at
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Whether a cache-miss read writes the fetched recipe back
    #[serde(default)]
    pub read_policy: ReadPolicy,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            read_policy: ReadPolicy::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Which document store backs the reconciler
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Memory,
    /// One JSON file per recipe in `StoreConfig::path`
    #[default]
    File,
    /// MongoDB Atlas Data API
    DataApi,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    /// Directory used by the file store
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Required when `kind` is `data_api`
    pub data_api: Option<DataApiConfig>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            path: default_store_path(),
            data_api: None,
        }
    }
}

/// Configuration for the MongoDB Atlas Data API store
#[derive(Debug, Deserialize, Clone)]
pub struct DataApiConfig {
    /// Base endpoint, e.g. `https://data.mongodb-api.com/app/<app-id>/endpoint/data/v1`
    pub endpoint: String,
    /// API key (can also be set via the DATA_API_KEY environment variable)
    pub api_key: Option<String>,
    /// Cluster name
    #[serde(default = "default_data_source")]
    pub data_source: String,
    /// Database name (can also be set via the DB_NAME environment variable)
    pub database: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_store_path() -> String {
    "./database/".to_string()
}

fn default_data_source() -> String {
    "Cluster0".to_string()
}

fn default_collection() -> String {
    "recipes".to_string()
}

impl ParserConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_PARSER__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_PARSER__STORE__KIND
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables, see [`ParserConfig::load`].
pub fn load_config() -> Result<ParserConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("RECIPE_PARSER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
