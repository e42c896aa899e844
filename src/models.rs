//! Core request/response types shared by both answer paths.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which answer path handles a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Generate and execute SQL against the relational schema
    Sql,
    /// Retrieve similar snippets from the vector collections
    Semantic,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Sql => write!(f, "sql"),
            Strategy::Semantic => write!(f, "semantic"),
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sql" => Ok(Strategy::Sql),
            "semantic" | "rag" => Ok(Strategy::Semantic),
            _ => Err(Error::Config(format!("Unknown strategy: {}", s))),
        }
    }
}

/// A user question plus an optional explicit strategy choice
#[derive(Debug, Clone)]
pub struct Question {
    pub text: String,
    pub strategy: Option<Strategy>,
}

impl Question {
    /// Create a question, rejecting empty input
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::Config("Question must not be empty".to_string()));
        }
        Ok(Self {
            text,
            strategy: None,
        })
    }

    pub fn with_strategy(mut self, strategy: Option<Strategy>) -> Self {
        self.strategy = strategy;
        self
    }
}

/// One vector search hit from a single collection
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalHit {
    pub collection: String,
    pub text: String,
    pub score: f32,
}

/// Context snippets merged across collections, sorted by descending score
/// and truncated to the configured budget.
///
/// All collections share one embedding model, so their scores are
/// comparable. Tie order is unspecified.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedContext {
    hits: Vec<RetrievalHit>,
}

impl RankedContext {
    /// Merge raw hits into a ranked, budget-limited context set
    pub fn from_hits(mut hits: Vec<RetrievalHit>, budget: usize) -> Self {
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(budget);
        Self { hits }
    }

    pub fn hits(&self) -> &[RetrievalHit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Final answer returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Natural-language answer text
    pub text: String,
    /// Which path produced the answer
    pub strategy: Strategy,
    /// Generated SQL, carried for transparency on the SQL path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(collection: &str, score: f32) -> RetrievalHit {
        RetrievalHit {
            collection: collection.to_string(),
            text: format!("{} snippet", collection),
            score,
        }
    }

    #[test]
    fn test_question_rejects_empty() {
        assert!(Question::new("   ").is_err());
        assert!(Question::new("Which team members know SQL?").is_ok());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(Strategy::from_str("sql").unwrap(), Strategy::Sql);
        assert_eq!(Strategy::from_str("RAG").unwrap(), Strategy::Semantic);
        assert!(Strategy::from_str("guess").is_err());
    }

    #[test]
    fn test_ranked_context_sorts_descending() {
        let context = RankedContext::from_hits(
            vec![hit("roles", 0.4), hit("skills", 0.91), hit("products", 0.7)],
            10,
        );

        let scores: Vec<f32> = context.hits().iter().map(|h| h.score).collect();
        assert_eq!(scores, vec![0.91, 0.7, 0.4]);
    }

    #[test]
    fn test_ranked_context_respects_budget() {
        let hits = (0..30)
            .map(|i| hit("assignments", i as f32 / 30.0))
            .collect();
        let context = RankedContext::from_hits(hits, 20);

        assert_eq!(context.len(), 20);
        // Highest scores survive truncation
        assert!(context.hits().iter().all(|h| h.score >= 10.0 / 30.0));
    }
}
