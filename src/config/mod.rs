// Configuration management module
// Handles TOML configuration for the warehouse connection, the embedding
// server, the Cortex completion model, and the dashboard itself.

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    Config, ConfigError, CortexConfig, DashboardConfig, EmbeddingConfig, WarehouseConfig,
};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("dq-dashboard"))
        .ok_or(ConfigError::DirectoryError)
}
