//! Text-to-SQL answer path
//!
//! Two completion calls bracket one read-only execution: schema + question
//! produce a single SQL statement, the statement runs against Postgres,
//! and a second call explains the resulting rows in plain English. Any
//! failure in the sequence surfaces as one path failure, leaving the
//! router free to fall back to semantic search.

mod executor;

pub use executor::*;

use crate::error::{Error, Result};
use crate::llm::CompletionClient;
use crate::models::{Answer, Strategy};
use crate::prompt;
use crate::schema::SchemaDescriptor;
use std::sync::Arc;
use tracing::{debug, info};

pub struct SqlPipeline {
    llm: Arc<dyn CompletionClient>,
    executor: Arc<dyn SqlExecutor>,
    schema: SchemaDescriptor,
    dialect: String,
}

impl SqlPipeline {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        executor: Arc<dyn SqlExecutor>,
        schema: SchemaDescriptor,
        dialect: String,
    ) -> Self {
        Self {
            llm,
            executor,
            schema,
            dialect,
        }
    }

    /// Answer a question by generating, executing, and explaining SQL.
    ///
    /// The statement is generated fresh for every question; nothing is
    /// cached across calls.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let schema_json = self.schema.to_prompt_json()?;

        let generation = prompt::sql_generation_prompt(&schema_json, &self.dialect, question);
        let raw = self
            .llm
            .complete(&generation)
            .await
            .map_err(|e| Error::SqlPath(format!("generation failed: {}", e)))?;

        let sql = prompt::strip_code_fences(&raw);
        if sql.is_empty() {
            return Err(Error::SqlPath(
                "model returned an empty statement".to_string(),
            ));
        }
        debug!("Generated SQL: {}", sql);

        let rows = self
            .executor
            .run(&sql)
            .await
            .map_err(|e| Error::SqlPath(format!("execution failed: {}", e)))?;
        info!("Generated SQL returned {} rows", rows.len());

        // Rows arrive with dates and numerics already stringified, so this
        // serialization is lossless.
        let rows_json = serde_json::to_string_pretty(&rows)?;

        let explanation = prompt::sql_explanation_prompt(question, &sql, &rows_json);
        let text = self
            .llm
            .complete(&explanation)
            .await
            .map_err(|e| Error::SqlPath(format!("explanation failed: {}", e)))?;

        let text = if text.trim().is_empty() {
            prompt::insufficient_information_answer()
        } else {
            text.trim().to_string()
        };

        Ok(Answer {
            text,
            strategy: Strategy::Sql,
            sql: Some(sql),
        })
    }
}
