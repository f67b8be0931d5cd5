use thiserror::Error;

pub type Result<T> = std::result::Result<T, DqError>;

#[derive(Error, Debug)]
pub enum DqError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Warehouse error: {0}")]
    Warehouse(String),

    #[error("Model access denied: {0}")]
    Permission(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Schema document error: {0}")]
    SchemaDocument(String),

    #[error("DMF error: {0}")]
    Dmf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod describer;
pub mod dmf;
pub mod embeddings;
pub mod retriever;
pub mod sql;
pub mod warehouse;
pub mod web;
