use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::describer::{SchemaDescriber, load_schema_document};
use crate::embeddings::EmbeddingClient;
use crate::warehouse::{ResultTable, WarehouseClient};
use crate::{DqError, Result};

/// Start the dashboard web server
#[inline]
pub async fn serve(port: Option<u16>) -> Result<()> {
    let config = Config::load_default()?;
    crate::web::serve(config, port).await
}

/// Verify connectivity to the warehouse and the embedding server
#[inline]
pub fn check() -> Result<()> {
    let config = Config::load_default()?;

    let embedder =
        EmbeddingClient::new(&config.embedding).map_err(|e| DqError::Embedding(e.to_string()))?;
    match embedder.health_check() {
        Ok(()) => println!(
            "✓ Embedding server reachable, model '{}' available",
            config.embedding.model
        ),
        Err(e) => println!("✗ Embedding server check failed: {:#}", e),
    }

    let warehouse = WarehouseClient::new(&config.warehouse)?;
    match warehouse.execute("SELECT 1") {
        Ok(_) => println!(
            "✓ Warehouse reachable as '{}' on {}",
            config.warehouse.user, config.warehouse.host
        ),
        Err(e) => println!("✗ Warehouse check failed: {}", e),
    }

    Ok(())
}

/// Generate an AI description of a table's columns, printing it or writing
/// it to a file
#[inline]
pub fn describe(table: &str, output: Option<&Path>) -> Result<()> {
    let config = Config::load_default()?;

    let embedder =
        EmbeddingClient::new(&config.embedding).map_err(|e| DqError::Embedding(e.to_string()))?;
    let warehouse = WarehouseClient::new(&config.warehouse)?;
    let schema_document = load_schema_document(&config.dashboard.schema_document)?;

    info!("Generating description for table '{}'", table);
    let describer = SchemaDescriber::new(embedder, &config.cortex);
    let description = describer.describe_table(&warehouse, table, &schema_document)?;

    match output {
        Some(path) => {
            fs::write(path, &description)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ Description saved to '{}'", path.display());
        }
        None => println!("{}", description),
    }

    Ok(())
}

/// Run an ad-hoc SQL statement and print the result table
#[inline]
pub fn query(sql: &str) -> Result<()> {
    let config = Config::load_default()?;
    let warehouse = WarehouseClient::new(&config.warehouse)?;

    let result = warehouse.execute(sql)?;
    print_table(&result);
    Ok(())
}

fn print_table(result: &ResultTable) {
    if result.is_empty() {
        println!("(no rows)");
        return;
    }

    if !result.columns.is_empty() {
        println!("{}", result.columns.join(" | "));
        println!("{}", "-".repeat(result.columns.join(" | ").len()));
    }

    for row in &result.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|value| match value {
                serde_json::Value::Null => "NULL".to_string(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        println!("{}", cells.join(" | "));
    }

    println!("({} rows)", result.rows.len());
}
