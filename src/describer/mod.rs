//! AI-generated column descriptions.
//!
//! Filters the schema document down to the block matching the requested
//! table, wraps it in a fixed prompt, and asks the warehouse's completion
//! endpoint to describe the columns.


use std::fs;
use std::path::Path;
use tracing::debug;

use crate::config::CortexConfig;
use crate::embeddings::Embedder;
use crate::retriever::SchemaRetriever;
use crate::warehouse::WarehouseClient;
use crate::Result;

const DESCRIPTION_PROMPT_TEMPLATE: &str = r#"
#####
For the given table, provide a clear and concise description of each column, explaining:

The purpose of the column
The type of data it holds
Its role in the table (e.g., identifier, foreign key, status flag, timestamp, etc.)

If applicable, also mention:
Any relationships with other tables (e.g., foreign key references)
Whether the column is part of a primary key or unique constraint

{filtered_schema}
#####
"#;

pub struct SchemaDescriber<E> {
    retriever: SchemaRetriever<E>,
    model: String,
    max_tokens: u32,
}

/// Fill the prompt template with the retrieved schema block.
#[inline]
pub fn build_prompt(filtered_schema: &str) -> String {
    DESCRIPTION_PROMPT_TEMPLATE.replace("{filtered_schema}", filtered_schema)
}

/// Read the schema document from disk, rejecting files that contain no
/// retrievable content.
#[inline]
pub fn load_schema_document(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| {
        crate::DqError::SchemaDocument(format!("Failed to read {}: {}", path.display(), e))
    })?;

    if text.trim().is_empty() {
        return Err(crate::DqError::SchemaDocument(format!(
            "{} is empty",
            path.display()
        )));
    }

    Ok(text)
}

impl<E: Embedder> SchemaDescriber<E> {
    #[inline]
    pub fn new(embedder: E, cortex: &CortexConfig) -> Self {
        Self {
            retriever: SchemaRetriever::new(embedder),
            model: cortex.model.clone(),
            max_tokens: cortex.max_tokens,
        }
    }

    /// Generate a natural-language description of `table`'s columns from
    /// the schema document.
    #[inline]
    pub fn describe_table(
        &self,
        warehouse: &WarehouseClient,
        table: &str,
        schema_document: &str,
    ) -> Result<String> {
        let filtered_schema = self.retriever.select_best_schema(table, schema_document)?;

        debug!(
            "Requesting column description for '{}' with model '{}'",
            table, self.model
        );
        let prompt = build_prompt(&filtered_schema);
        warehouse.complete(&self.model, &prompt, self.max_tokens)
    }
}
