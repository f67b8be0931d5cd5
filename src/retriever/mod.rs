//! Two-stage schema-block retrieval.
//!
//! Stage 1 narrows the document to the blocks most semantically similar to
//! the query keywords (embedding + cosine similarity). Stage 2 re-orders
//! those candidates by exact keyword coverage, with the semantic order as
//! the tie-break. Both stages are pure functions composed by
//! [`SchemaRetriever`].


use tracing::{debug, info};

use crate::embeddings::Embedder;
use crate::{DqError, Result};

/// Number of semantic candidates carried into the keyword re-rank.
pub const SEMANTIC_TOP_K: usize = 5;

pub struct SchemaRetriever<E> {
    embedder: E,
    top_k: usize,
}

/// Split a schema document into trimmed, non-empty blocks on blank-line
/// boundaries. Lines containing only whitespace count as blank.
#[inline]
pub fn split_blocks(document: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in document.lines() {
        if line.trim().is_empty() {
            if !current.trim().is_empty() {
                blocks.push(current.trim().to_string());
            }
            current.clear();
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    if !current.trim().is_empty() {
        blocks.push(current.trim().to_string());
    }

    blocks
}

/// Cosine similarity of two vectors. Zero-magnitude vectors or mismatched
/// dimensions score 0.0 rather than NaN.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Stage 1: indices of the top-k blocks by descending similarity to the
/// query embedding. The sort is stable, so similarity ties keep original
/// document order.
#[inline]
pub fn top_k_by_similarity(
    query_embedding: &[f32],
    block_embeddings: &[Vec<f32>],
    k: usize,
) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..block_embeddings.len()).collect();
    let similarities: Vec<f32> = block_embeddings
        .iter()
        .map(|e| cosine_similarity(query_embedding, e))
        .collect();

    indices.sort_by(|&a, &b| {
        similarities[b]
            .partial_cmp(&similarities[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices.truncate(k);
    indices
}

/// Keyword-coverage score: +1 for each keyword appearing case-insensitively
/// anywhere in the block text.
#[inline]
pub fn keyword_score(block: &str, keywords: &[String]) -> usize {
    let haystack = block.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
        .count()
}

/// Stage 2: re-order candidates by descending keyword coverage. The sort is
/// stable, so the incoming (semantic) order breaks score ties.
#[inline]
pub fn rerank_by_keywords(mut candidates: Vec<String>, keywords: &[String]) -> Vec<String> {
    candidates.sort_by_key(|block| std::cmp::Reverse(keyword_score(block, keywords)));
    candidates
}

impl<E: Embedder> SchemaRetriever<E> {
    #[inline]
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            top_k: SEMANTIC_TOP_K,
        }
    }

    #[inline]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Select the schema block most relevant to `table_name`.
    ///
    /// Deterministic for a fixed embedding model, document, and table name;
    /// the returned block is one of the document's blocks verbatim.
    #[inline]
    pub fn select_best_schema(&self, table_name: &str, schema_document: &str) -> Result<String> {
        let keywords = vec![table_name.to_string()];
        self.select_with_keywords(&keywords, schema_document)
    }

    /// Keyword-list variant of [`select_best_schema`](Self::select_best_schema).
    /// The query string is the keywords joined with spaces.
    #[inline]
    pub fn select_with_keywords(
        &self,
        keywords: &[String],
        schema_document: &str,
    ) -> Result<String> {
        debug!("Searching for schema matching {:?}", keywords);

        let blocks = split_blocks(schema_document);
        if blocks.is_empty() {
            return Err(DqError::SchemaDocument(
                "schema document is empty or contains no blank-line separated blocks".to_string(),
            ));
        }

        let block_embeddings = self
            .embedder
            .embed_batch(&blocks)
            .map_err(|e| DqError::Embedding(e.to_string()))?;
        let query = keywords.join(" ");
        let query_embedding = self
            .embedder
            .embed(&query)
            .map_err(|e| DqError::Embedding(e.to_string()))?;

        let k = self.top_k.min(blocks.len());
        let top_indices = top_k_by_similarity(&query_embedding, &block_embeddings, k);
        let candidates: Vec<String> = top_indices.into_iter().map(|i| blocks[i].clone()).collect();

        let ranked = rerank_by_keywords(candidates, keywords);
        let best = ranked
            .into_iter()
            .next()
            .ok_or_else(|| DqError::SchemaDocument("no candidate blocks after ranking".to_string()))?;

        info!("Most relevant schema block:\n{}", best);
        Ok(best)
    }
}
