//! Completion model boundary
//!
//! Each call is stateless and self-contained; no conversation memory is
//! kept across calls. The temperature is fixed at construction time so
//! both answer paths stay deterministic under the default configuration.

mod http_backend;

pub use http_backend::*;

use crate::config::CompletionConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for completion providers
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one self-contained prompt and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create a completion client based on configuration
pub fn create_completion(config: &CompletionConfig) -> Result<Arc<dyn CompletionClient>> {
    let client = HttpCompletion::new(config)?;
    Ok(Arc::new(client))
}
