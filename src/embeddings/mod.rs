pub mod client;

pub use client::EmbeddingClient;

use anyhow::Result;

/// Seam between the retriever and the embedding backend, so ranking logic
/// can be tested with a deterministic stub.
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
