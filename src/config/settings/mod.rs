#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const DEFAULT_PREVIEW_ROWS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub cortex: CortexConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Static credentials and session context for the warehouse connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WarehouseConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub account: String,
    pub warehouse: String,
    pub database: String,
    pub schema: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CortexConfig {
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub port: u16,
    /// Path to the schema document, a text file of table-schema blocks
    /// separated by blank lines.
    pub schema_document: PathBuf,
    /// Tables surfaced by the dashboard. Each table is expected to have
    /// `<table>_duplicate_records` and `<table>_clean_view` views in the
    /// warehouse. Doubles as the identifier allow-list for query building.
    pub tables: Vec<String>,
    pub preview_rows: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            host: "localhost".to_string(),
            port: 443,
            user: String::new(),
            password: String::new(),
            account: String::new(),
            warehouse: String::new(),
            database: String::new(),
            schema: String::new(),
            role: None,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            model: "nomic-embed-text:latest".to_string(),
        }
    }
}

impl Default for CortexConfig {
    fn default() -> Self {
        Self {
            model: "snowflake-llama-3.3-70b".to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: 8470,
            schema_document: PathBuf::from("formatted_schema.md"),
            tables: Vec::new(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid max_tokens: {0} (must be between 1 and 32768)")]
    InvalidMaxTokens(u32),
    #[error("Missing warehouse credential: {0}")]
    MissingCredential(&'static str),
    #[error("Invalid preview row limit: {0} (must be between 1 and 1000)")]
    InvalidPreviewRows(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                warehouse: WarehouseConfig::default(),
                embedding: EmbeddingConfig::default(),
                cortex: CortexConfig::default(),
                dashboard: DashboardConfig::default(),
                base_dir: config_dir.as_ref().to_path_buf(),
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    /// Load from the platform config directory.
    #[inline]
    pub fn load_default() -> Result<Self> {
        let config_dir = super::get_config_dir()?;
        Self::load(config_dir)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                self.base_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.warehouse.validate()?;
        self.embedding.validate()?;
        self.cortex.validate()?;
        self.dashboard.validate()?;
        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }
}

fn validate_endpoint(protocol: &str, host: &str, port: u16) -> Result<Url, ConfigError> {
    if protocol != "http" && protocol != "https" {
        return Err(ConfigError::InvalidProtocol(protocol.to_string()));
    }

    if port == 0 {
        return Err(ConfigError::InvalidPort(port));
    }

    let url_str = format!("{}://{}:{}", protocol, host, port);
    Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
}

impl WarehouseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(&self.protocol, &self.host, self.port)?;

        if self.user.trim().is_empty() {
            return Err(ConfigError::MissingCredential("user"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingCredential("password"));
        }
        if self.account.trim().is_empty() {
            return Err(ConfigError::MissingCredential("account"));
        }
        if self.warehouse.trim().is_empty() {
            return Err(ConfigError::MissingCredential("warehouse"));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingCredential("database"));
        }
        if self.schema.trim().is_empty() {
            return Err(ConfigError::MissingCredential("schema"));
        }

        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        validate_endpoint(&self.protocol, &self.host, self.port)
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(&self.protocol, &self.host, self.port)?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        validate_endpoint(&self.protocol, &self.host, self.port)
    }
}

impl CortexConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if self.max_tokens == 0 || self.max_tokens > 32768 {
            return Err(ConfigError::InvalidMaxTokens(self.max_tokens));
        }

        Ok(())
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        if self.preview_rows == 0 || self.preview_rows > 1000 {
            return Err(ConfigError::InvalidPreviewRows(self.preview_rows));
        }

        Ok(())
    }
}
