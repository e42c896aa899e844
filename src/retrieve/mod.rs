//! Vector retrieval against named Qdrant collections
//!
//! This module wraps the Qdrant client behind a narrow search trait and
//! provides the concurrent fan-out aggregator used by the semantic path.

mod fanout;

pub use fanout::*;

use crate::error::{Error, Result};
use crate::models::RetrievalHit;
use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::SearchPointsBuilder;
use qdrant_client::Qdrant;
use tracing::debug;

/// Trait for per-collection nearest-neighbor search
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Return the top hits from one collection, ranked by similarity
    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<RetrievalHit>>;
}

/// Qdrant-backed search handle, shared read-only across requests
pub struct QdrantSearch {
    client: Qdrant,
}

impl QdrantSearch {
    /// Connect to Qdrant
    pub fn connect(url: &str, api_key: Option<String>) -> Result<Self> {
        debug!("Connecting to Qdrant at {}", url);

        let mut builder = Qdrant::from_url(url).skip_compatibility_check();
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let client = builder.build().map_err(|e| Error::Qdrant(e.to_string()))?;

        Ok(Self { client })
    }

    /// Point count for one collection, None if it does not exist
    pub async fn collection_points(&self, collection: &str) -> Result<Option<u64>> {
        if !self.client.collection_exists(collection).await? {
            return Ok(None);
        }

        let info = self.client.collection_info(collection).await?;
        Ok(info.result.map(|r| r.points_count.unwrap_or(0)))
    }
}

#[async_trait]
impl VectorSearch for QdrantSearch {
    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<RetrievalHit>> {
        debug!("Searching collection {} with limit {}", collection, limit);

        let request =
            SearchPointsBuilder::new(collection, vector, limit as u64).with_payload(true);

        let response = self.client.search_points(request).await?;

        let hits = response
            .result
            .into_iter()
            .map(|point| {
                let text = point
                    .payload
                    .get("text")
                    .and_then(|v| match &v.kind {
                        Some(Kind::StringValue(s)) => Some(s.clone()),
                        _ => None,
                    })
                    .unwrap_or_default();

                RetrievalHit {
                    collection: collection.to_string(),
                    text,
                    score: point.score,
                }
            })
            .collect();

        Ok(hits)
    }
}
