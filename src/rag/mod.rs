//! Semantic retrieval answer path
//!
//! Embed the question, fan out across the vector collections, and ask
//! the completion model to synthesize the top-ranked snippets into one
//! answer. An empty context short-circuits to a degraded answer instead
//! of sending the model an empty prompt section.

use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::llm::CompletionClient;
use crate::models::{Answer, Strategy};
use crate::prompt;
use crate::retrieve::FanOutRetriever;
use std::sync::Arc;
use tracing::info;

pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    retriever: FanOutRetriever,
    llm: Arc<dyn CompletionClient>,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        retriever: FanOutRetriever,
        llm: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            embedder,
            retriever,
            llm,
        }
    }

    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let vector = self
            .embedder
            .embed(question)
            .await
            .map_err(|e| Error::SemanticPath(format!("embedding failed: {}", e)))?;

        let context = self.retriever.retrieve(&vector).await;

        if context.is_empty() {
            info!("No retrieval hits; returning degraded answer");
            return Ok(Answer {
                text: prompt::insufficient_information_answer(),
                strategy: Strategy::Semantic,
                sql: None,
            });
        }

        info!("Synthesizing answer from {} context snippets", context.len());

        let synthesis = prompt::synthesis_prompt(question, &context);
        let text = self
            .llm
            .complete(&synthesis)
            .await
            .map_err(|e| Error::SemanticPath(format!("synthesis failed: {}", e)))?;

        Ok(Answer {
            text: text.trim().to_string(),
            strategy: Strategy::Semantic,
            sql: None,
        })
    }
}
