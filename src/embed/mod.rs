//! Query embedding
//!
//! Thin abstraction over the embedding backend. The same model embeds
//! documents offline and questions at query time, so the configured
//! dimension must match every collection this vector is compared against.

mod http_backend;

pub use http_backend::*;

use crate::config::EmbeddingConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single query string
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create an embedder based on configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let embedder = HttpEmbedder::new(config)?;
    Ok(Arc::new(embedder))
}
