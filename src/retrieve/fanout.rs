//! Concurrent fan-out search across all configured collections.
//!
//! One search per collection is dispatched concurrently, so overall
//! latency tracks the slowest collection rather than the sum. A failing
//! collection contributes zero hits and never aborts its siblings.

use super::VectorSearch;
use crate::models::{RankedContext, RetrievalHit};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct FanOutRetriever {
    search: Arc<dyn VectorSearch>,
    collections: Vec<String>,
    per_collection_limit: usize,
    context_budget: usize,
}

impl FanOutRetriever {
    pub fn new(
        search: Arc<dyn VectorSearch>,
        collections: Vec<String>,
        per_collection_limit: usize,
        context_budget: usize,
    ) -> Self {
        Self {
            search,
            collections,
            per_collection_limit,
            context_budget,
        }
    }

    /// Search every collection and merge the hits into one ranked context.
    ///
    /// The merge order is strictly by descending score regardless of which
    /// collection responded first. If every collection fails or returns
    /// nothing, the context is empty; callers handle that downstream.
    pub async fn retrieve(&self, query_vector: &[f32]) -> RankedContext {
        let searches = self.collections.iter().map(|collection| {
            let search = Arc::clone(&self.search);
            let vector = query_vector.to_vec();
            let limit = self.per_collection_limit;
            async move {
                match search.search(collection, vector, limit).await {
                    Ok(hits) => hits,
                    Err(e) => {
                        warn!("Error searching {}: {}", collection, e);
                        Vec::new()
                    }
                }
            }
        });

        let hits: Vec<RetrievalHit> = join_all(searches).await.into_iter().flatten().collect();

        debug!(
            "Fan-out collected {} hits across {} collections",
            hits.len(),
            self.collections.len()
        );

        RankedContext::from_hits(hits, self.context_budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Scripted search backend: per-collection hit lists, with an optional
    /// set of collections that fail outright.
    struct ScriptedSearch {
        hits: HashMap<String, Vec<(String, f32)>>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl VectorSearch for ScriptedSearch {
        async fn search(
            &self,
            collection: &str,
            _vector: Vec<f32>,
            limit: usize,
        ) -> Result<Vec<RetrievalHit>> {
            if self.failing.iter().any(|c| c == collection) {
                return Err(Error::Qdrant(format!("collection '{}' unreachable", collection)));
            }

            let hits = self
                .hits
                .get(collection)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .take(limit)
                .map(|(text, score)| RetrievalHit {
                    collection: collection.to_string(),
                    text,
                    score,
                })
                .collect();
            Ok(hits)
        }
    }

    fn retriever(search: ScriptedSearch, collections: &[&str], budget: usize) -> FanOutRetriever {
        FanOutRetriever::new(
            Arc::new(search),
            collections.iter().map(|s| s.to_string()).collect(),
            10,
            budget,
        )
    }

    #[tokio::test]
    async fn test_merge_sorts_across_collections() {
        let mut hits = HashMap::new();
        hits.insert(
            "skills".to_string(),
            vec![("jane sql".to_string(), 0.91), ("bob excel".to_string(), 0.2)],
        );
        hits.insert(
            "teammembers".to_string(),
            vec![("jane manager alex".to_string(), 0.4)],
        );

        let retriever = retriever(
            ScriptedSearch {
                hits,
                failing: vec![],
            },
            &["skills", "teammembers"],
            20,
        );

        let context = retriever.retrieve(&[0.1, 0.2]).await;
        let texts: Vec<&str> = context.hits().iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["jane sql", "jane manager alex", "bob excel"]);
    }

    #[tokio::test]
    async fn test_failing_collection_does_not_abort_siblings() {
        let mut hits = HashMap::new();
        hits.insert("products".to_string(), vec![("product x".to_string(), 0.8)]);

        let retriever = retriever(
            ScriptedSearch {
                hits,
                failing: vec!["roles".to_string(), "assignments".to_string()],
            },
            &["products", "roles", "assignments"],
            20,
        );

        let context = retriever.retrieve(&[0.5]).await;
        assert_eq!(context.len(), 1);
        assert_eq!(context.hits()[0].text, "product x");
    }

    #[tokio::test]
    async fn test_all_collections_failing_yields_empty_context() {
        let retriever = retriever(
            ScriptedSearch {
                hits: HashMap::new(),
                failing: vec!["skills".to_string(), "roles".to_string()],
            },
            &["skills", "roles"],
            20,
        );

        let context = retriever.retrieve(&[0.5]).await;
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn test_budget_truncates_merged_hits() {
        let mut hits = HashMap::new();
        hits.insert(
            "assignments".to_string(),
            (0..8)
                .map(|i| (format!("a{}", i), 0.1 * i as f32))
                .collect(),
        );
        hits.insert(
            "skills_matrix".to_string(),
            (0..8)
                .map(|i| (format!("s{}", i), 0.05 + 0.1 * i as f32))
                .collect(),
        );

        let retriever = retriever(
            ScriptedSearch {
                hits,
                failing: vec![],
            },
            &["assignments", "skills_matrix"],
            5,
        );

        let context = retriever.retrieve(&[0.5]).await;
        assert_eq!(context.len(), 5);

        // Descending permutation of the highest-scored union members
        let scores: Vec<f32> = context.hits().iter().map(|h| h.score).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(scores, sorted);
        assert_eq!(context.hits()[0].text, "s7");
    }
}
