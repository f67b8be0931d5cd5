use super::*;
use tempfile::TempDir;

fn valid_warehouse() -> WarehouseConfig {
    WarehouseConfig {
        protocol: "https".to_string(),
        host: "example.snowflakecomputing.com".to_string(),
        port: 443,
        user: "analyst".to_string(),
        password: "hunter2".to_string(),
        account: "tfo-account".to_string(),
        warehouse: "COMPUTE_WH".to_string(),
        database: "TFO".to_string(),
        schema: "TFO_SCHEMA".to_string(),
        role: Some("ANALYST_ROLE".to_string()),
    }
}

fn valid_config(base_dir: PathBuf) -> Config {
    Config {
        warehouse: valid_warehouse(),
        embedding: EmbeddingConfig::default(),
        cortex: CortexConfig::default(),
        dashboard: DashboardConfig {
            tables: vec!["ASSETMASTER".to_string(), "PORTFOLIO".to_string()],
            ..DashboardConfig::default()
        },
        base_dir,
    }
}

#[test]
fn defaults_when_no_config_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config::load(dir.path()).expect("Failed to load config");

    assert_eq!(config.embedding.port, 11434);
    assert_eq!(config.embedding.model, "nomic-embed-text:latest");
    assert_eq!(config.cortex.model, "snowflake-llama-3.3-70b");
    assert_eq!(config.cortex.max_tokens, DEFAULT_MAX_TOKENS);
    assert_eq!(config.dashboard.preview_rows, DEFAULT_PREVIEW_ROWS);
    assert!(config.dashboard.tables.is_empty());
}

#[test]
fn save_and_reload_roundtrip() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = valid_config(dir.path().to_path_buf());

    config.save().expect("Failed to save config");
    let loaded = Config::load(dir.path()).expect("Failed to reload config");

    assert_eq!(loaded, config);
}

#[test]
fn missing_credentials_rejected() {
    let mut warehouse = valid_warehouse();
    warehouse.user = String::new();
    assert!(matches!(
        warehouse.validate(),
        Err(ConfigError::MissingCredential("user"))
    ));

    let mut warehouse = valid_warehouse();
    warehouse.database = "  ".to_string();
    assert!(matches!(
        warehouse.validate(),
        Err(ConfigError::MissingCredential("database"))
    ));
}

#[test]
fn role_is_optional() {
    let mut warehouse = valid_warehouse();
    warehouse.role = None;
    assert!(warehouse.validate().is_ok());
}

#[test]
fn invalid_protocol_rejected() {
    let mut embedding = EmbeddingConfig::default();
    embedding.protocol = "ftp".to_string();
    assert!(matches!(
        embedding.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));
}

#[test]
fn invalid_port_rejected() {
    let mut warehouse = valid_warehouse();
    warehouse.port = 0;
    assert!(matches!(
        warehouse.validate(),
        Err(ConfigError::InvalidPort(0))
    ));
}

#[test]
fn max_tokens_bounds() {
    let mut cortex = CortexConfig::default();
    cortex.max_tokens = 0;
    assert!(matches!(
        cortex.validate(),
        Err(ConfigError::InvalidMaxTokens(0))
    ));

    cortex.max_tokens = 40000;
    assert!(cortex.validate().is_err());

    cortex.max_tokens = 8192;
    assert!(cortex.validate().is_ok());
}

#[test]
fn warehouse_base_url() {
    let warehouse = valid_warehouse();
    let url = warehouse.base_url().expect("Failed to build URL");
    assert_eq!(url.host_str(), Some("example.snowflakecomputing.com"));
    assert_eq!(url.scheme(), "https");
}

#[test]
fn malformed_toml_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("config.toml"), "not [valid toml").expect("Failed to write file");

    assert!(Config::load(dir.path()).is_err());
}
