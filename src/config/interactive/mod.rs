
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Password};

use super::{Config, CortexConfig, DashboardConfig, EmbeddingConfig, WarehouseConfig};
use crate::embeddings::EmbeddingClient;
use crate::warehouse::WarehouseClient;

#[inline]
pub fn run_interactive_config() -> Result<()> {
    println!(
        "{}",
        style("🔧 Data Quality Dashboard Configuration").bold().cyan()
    );
    println!();

    let mut config = load_existing_config()?;

    println!("{}", style("Warehouse Connection").bold().yellow());
    println!("Static credentials used for every SQL and Cortex request.");
    println!();
    configure_warehouse(&mut config.warehouse)?;

    println!();
    println!("{}", style("Embedding Server").bold().yellow());
    println!("Local Ollama instance used for schema-block retrieval.");
    println!();
    configure_embedding(&mut config.embedding)?;

    println!();
    println!("{}", style("Cortex Completion").bold().yellow());
    configure_cortex(&mut config.cortex)?;

    println!();
    println!("{}", style("Dashboard").bold().yellow());
    configure_dashboard(&mut config.dashboard)?;

    println!();
    println!("{}", style("Testing configuration...").yellow());

    if test_embedding_connection(&config.embedding) {
        println!("{}", style("✓ Embedding server reachable!").green());
    } else {
        println!(
            "{}",
            style("⚠ Warning: Could not reach the embedding server").yellow()
        );
        println!("You can continue, but retrieval will fail until it is running.");
    }

    if test_warehouse_connection(&config.warehouse) {
        println!("{}", style("✓ Warehouse connection successful!").green());
    } else {
        println!(
            "{}",
            style("⚠ Warning: Could not connect to the warehouse").yellow()
        );
    }

    config.save().context("Failed to save configuration")?;
    println!();
    println!(
        "{} {}",
        style("Configuration saved to").green(),
        config.config_file_path().display()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    let config_dir = super::get_config_dir()?;
    Config::load(config_dir).context("Failed to load existing configuration")
}

fn configure_warehouse(warehouse: &mut WarehouseConfig) -> Result<()> {
    warehouse.host = Input::new()
        .with_prompt("Warehouse host")
        .default(warehouse.host.clone())
        .interact_text()?;
    warehouse.user = Input::new()
        .with_prompt("User")
        .default(warehouse.user.clone())
        .interact_text()?;
    warehouse.password = Password::new()
        .with_prompt("Password")
        .allow_empty_password(false)
        .interact()?;
    warehouse.account = Input::new()
        .with_prompt("Account")
        .default(warehouse.account.clone())
        .interact_text()?;
    warehouse.warehouse = Input::new()
        .with_prompt("Warehouse (compute)")
        .default(warehouse.warehouse.clone())
        .interact_text()?;
    warehouse.database = Input::new()
        .with_prompt("Database")
        .default(warehouse.database.clone())
        .interact_text()?;
    warehouse.schema = Input::new()
        .with_prompt("Schema")
        .default(warehouse.schema.clone())
        .interact_text()?;

    let use_role = Confirm::new()
        .with_prompt("Set an explicit role?")
        .default(warehouse.role.is_some())
        .interact()?;
    warehouse.role = if use_role {
        let role: String = Input::new()
            .with_prompt("Role")
            .default(warehouse.role.clone().unwrap_or_default())
            .interact_text()?;
        Some(role)
    } else {
        None
    };

    Ok(())
}

fn configure_embedding(embedding: &mut EmbeddingConfig) -> Result<()> {
    embedding.host = Input::new()
        .with_prompt("Embedding server host")
        .default(embedding.host.clone())
        .interact_text()?;
    embedding.port = Input::new()
        .with_prompt("Embedding server port")
        .default(embedding.port)
        .interact_text()?;
    embedding.model = Input::new()
        .with_prompt("Embedding model")
        .default(embedding.model.clone())
        .interact_text()?;
    Ok(())
}

fn configure_cortex(cortex: &mut CortexConfig) -> Result<()> {
    cortex.model = Input::new()
        .with_prompt("Completion model")
        .default(cortex.model.clone())
        .interact_text()?;
    cortex.max_tokens = Input::new()
        .with_prompt("Max completion tokens")
        .default(cortex.max_tokens)
        .interact_text()?;
    Ok(())
}

fn configure_dashboard(dashboard: &mut DashboardConfig) -> Result<()> {
    dashboard.port = Input::new()
        .with_prompt("Dashboard port")
        .default(dashboard.port)
        .interact_text()?;

    let schema_document: String = Input::new()
        .with_prompt("Schema document path")
        .default(dashboard.schema_document.display().to_string())
        .interact_text()?;
    dashboard.schema_document = schema_document.into();

    let tables: String = Input::new()
        .with_prompt("Tables (comma separated)")
        .default(dashboard.tables.join(","))
        .allow_empty(true)
        .interact_text()?;
    dashboard.tables = parse_table_list(&tables);

    Ok(())
}

/// Split a comma-separated table list, dropping empty entries.
pub(crate) fn parse_table_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn test_embedding_connection(embedding: &EmbeddingConfig) -> bool {
    EmbeddingClient::new(embedding)
        .and_then(|client| client.ping())
        .is_ok()
}

fn test_warehouse_connection(warehouse: &WarehouseConfig) -> bool {
    match WarehouseClient::new(warehouse) {
        Ok(client) => client.execute("SELECT 1").is_ok(),
        Err(_) => false,
    }
}

pub(crate) fn mask_password(password: &str) -> String {
    if password.is_empty() {
        "(not set)".to_string()
    } else {
        "*".repeat(password.chars().count().min(8))
    }
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = load_existing_config()?;

    println!("{}", style("Current Configuration").bold().cyan());
    println!();
    println!("{}", style("[warehouse]").bold());
    println!("  host: {}:{}", config.warehouse.host, config.warehouse.port);
    println!("  user: {}", config.warehouse.user);
    println!(
        "  password: {}",
        mask_password(&config.warehouse.password)
    );
    println!("  account: {}", config.warehouse.account);
    println!("  warehouse: {}", config.warehouse.warehouse);
    println!(
        "  database.schema: {}.{}",
        config.warehouse.database, config.warehouse.schema
    );
    println!(
        "  role: {}",
        config.warehouse.role.as_deref().unwrap_or("(default)")
    );
    println!();
    println!("{}", style("[embedding]").bold());
    println!("  host: {}:{}", config.embedding.host, config.embedding.port);
    println!("  model: {}", config.embedding.model);
    println!();
    println!("{}", style("[cortex]").bold());
    println!("  model: {}", config.cortex.model);
    println!("  max_tokens: {}", config.cortex.max_tokens);
    println!();
    println!("{}", style("[dashboard]").bold());
    println!("  port: {}", config.dashboard.port);
    println!(
        "  schema_document: {}",
        config.dashboard.schema_document.display()
    );
    println!("  tables: {}", config.dashboard.tables.join(", "));
    println!("  preview_rows: {}", config.dashboard.preview_rows);

    Ok(())
}
