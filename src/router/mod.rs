//! Strategy routing between the SQL and semantic answer paths.
//!
//! An explicit caller choice always wins. Otherwise a keyword heuristic
//! classifies aggregate-style questions to the SQL path and everything
//! else to semantic search; the rule is pure, so identical questions
//! always route identically. Whether a failed SQL path falls back to
//! semantic search is a configurable policy.

use crate::error::{Error, Result};
use crate::models::{Answer, Question, Strategy};
use crate::rag::RagPipeline;
use crate::sqlgen::SqlPipeline;
use tracing::{info, warn};

/// Cues that the question wants an exact relational computation
const SQL_CUES: &[&str] = &[
    "how many",
    "count",
    "total",
    "sum of",
    "average",
    "percentage",
    "per product",
    "per team member",
    "list all",
];

/// Deterministic classification of a question with no explicit strategy
pub fn classify(question: &str) -> Strategy {
    let lowered = question.to_lowercase();
    if SQL_CUES.iter().any(|cue| lowered.contains(cue)) {
        Strategy::Sql
    } else {
        Strategy::Semantic
    }
}

pub struct Router {
    sql: SqlPipeline,
    rag: RagPipeline,
    fallback_enabled: bool,
    default_strategy: Option<Strategy>,
}

impl Router {
    pub fn new(
        sql: SqlPipeline,
        rag: RagPipeline,
        fallback_enabled: bool,
        default_strategy: Option<Strategy>,
    ) -> Self {
        Self {
            sql,
            rag,
            fallback_enabled,
            default_strategy,
        }
    }

    /// Route one question to an answer path. Stateless across calls.
    pub async fn route(&self, question: &Question) -> Result<Answer> {
        let strategy = question
            .strategy
            .or(self.default_strategy)
            .unwrap_or_else(|| classify(&question.text));

        info!("Routing question via {} path", strategy);

        match strategy {
            Strategy::Semantic => self.rag.answer(&question.text).await.map_err(degraded),
            Strategy::Sql => match self.sql.answer(&question.text).await {
                Ok(answer) => Ok(answer),
                Err(e) if self.fallback_enabled => {
                    warn!("SQL path failed ({}); falling back to semantic search", e);
                    self.rag.answer(&question.text).await.map_err(degraded)
                }
                Err(e) => {
                    warn!("SQL path failed with fallback disabled: {}", e);
                    Err(Error::Unanswerable)
                }
            },
        }
    }
}

/// Both-path exhaustion: log the cause, hand the user a rephrase hint
/// rather than a raw backend error.
fn degraded(err: Error) -> Error {
    warn!("Semantic path failed: {}", err);
    Error::Unanswerable
}
