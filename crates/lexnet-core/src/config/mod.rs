//! Configuration management for Lexnet.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `lexnet.toml` file
//! 3. User config `~/.config/lexnet/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

use crate::builder::{MatchLogic, RankingMode, SearchField};
use crate::model::TimeScope;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where datasets live.
    pub data: DataConfig,

    /// Time scopes.
    pub scopes: ScopeConfig,

    /// Default builder budgets.
    pub builder: BuilderConfig,

    /// Relationship listing budgets.
    pub relationships: RelationshipConfig,

    /// Local API server.
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./lexnet.toml` (project local)
    /// 2. `~/.config/lexnet/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("lexnet.toml").exists() {
            return Self::from_file("lexnet.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("lexnet").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(source) = std::env::var("LEXNET_DATA_SOURCE") {
            self.data.source = source;
        }
        if let Ok(manifest) = std::env::var("LEXNET_MANIFEST") {
            self.data.manifest = manifest;
        }
        if let Ok(scope) = std::env::var("LEXNET_DEFAULT_SCOPE") {
            self.scopes.default = scope;
        }
        if let Ok(max) = std::env::var("LEXNET_MAX_TOTAL_NODES") {
            if let Ok(n) = max.parse() {
                self.builder.max_total_nodes = n;
            }
        }
        if let Ok(limit) = std::env::var("LEXNET_RELATIONSHIP_LIMIT") {
            if let Ok(n) = limit.parse() {
                self.relationships.limit = n;
            }
        }
        if let Ok(port) = std::env::var("LEXNET_PORT") {
            if let Ok(n) = port.parse() {
                self.server.port = n;
            }
        }
    }

    /// Reject settings no session could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scopes.available.is_empty() {
            return Err(ConfigError::Invalid("scopes.available is empty".to_string()));
        }
        if !self.scopes.available.contains(&self.scopes.default) {
            return Err(ConfigError::Invalid(format!(
                "scopes.default '{}' is not one of {:?}",
                self.scopes.default, self.scopes.available
            )));
        }
        if self.builder.fields.is_empty() {
            return Err(ConfigError::Invalid("builder.fields is empty".to_string()));
        }
        if self.builder.max_total_nodes == 0 {
            return Err(ConfigError::Invalid("builder.max_total_nodes must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Data location configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory path or `http(s)://` base URL holding the datasets.
    pub source: String,

    /// Manifest file name relative to `source`.
    pub manifest: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_DATA_SOURCE.to_string(),
            manifest: DEFAULT_MANIFEST_FILE.to_string(),
        }
    }
}

/// Time scope configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Scope tags the datasets use.
    pub available: Vec<String>,

    /// Scope active at start.
    pub default: String,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            available: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            default: DEFAULT_SCOPE.to_string(),
        }
    }
}

impl ScopeConfig {
    pub fn default_scope(&self) -> TimeScope {
        TimeScope::new(self.default.clone())
    }

    /// The configured tags, which bound the scopes a session may switch to.
    pub fn available_scopes(&self) -> Vec<TimeScope> {
        self.available.iter().map(TimeScope::new).collect()
    }
}

/// Default builder settings, used when a request leaves them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub expansion_depth: usize,
    pub max_nodes_per_expansion: usize,
    pub max_total_nodes: usize,
    pub ranking: RankingMode,
    pub logic: MatchLogic,
    /// Fields searched by default.
    pub fields: Vec<SearchField>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            expansion_depth: DEFAULT_EXPANSION_DEPTH,
            max_nodes_per_expansion: DEFAULT_MAX_NODES_PER_EXPANSION,
            max_total_nodes: DEFAULT_MAX_TOTAL_NODES,
            ranking: RankingMode::default(),
            logic: MatchLogic::default(),
            fields: SearchField::ALL.to_vec(),
        }
    }
}

/// Relationship listing budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Maximum relationships per listing.
    pub limit: usize,

    /// Maximum distinct nodes per listing.
    pub max_nodes: usize,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RELATIONSHIP_LIMIT,
            max_nodes: DEFAULT_RELATIONSHIP_MAX_NODES,
        }
    }
}

/// Local API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    /// Open the API root in a browser on start.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            open_browser: false,
        }
    }
}
