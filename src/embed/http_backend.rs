use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize)]
struct EmbedTextRequest {
    model: String,
    inputs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EmbeddingResponse {
    Embeddings { embeddings: Vec<Vec<f32>> },
    Vectors { vectors: Vec<Vec<f32>> },
    Data { data: Vec<EmbeddingData> },
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    fn into_embeddings(self) -> Vec<Vec<f32>> {
        match self {
            EmbeddingResponse::Embeddings { embeddings } => embeddings,
            EmbeddingResponse::Vectors { vectors } => vectors,
            EmbeddingResponse::Data { data } => data.into_iter().map(|d| d.embedding).collect(),
        }
    }
}

/// HTTP embedding backend with bounded retry
pub struct HttpEmbedder {
    client: Client,
    base_url: Url,
    model: String,
    dimension: usize,
    retries: usize,
}

impl HttpEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)?;
        let timeout = Duration::from_secs(30);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
            dimension: config.dimension,
            retries: 2,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid embedding backend URL: {}", e)))
    }

    async fn send_with_retry<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let mut last_err: Option<Error> = None;
        for attempt in 0..=self.retries {
            let req = request
                .try_clone()
                .ok_or_else(|| Error::Embedding("Failed to clone backend request".to_string()))?;
            match req.send().await {
                Ok(response) => match response.error_for_status() {
                    Ok(ok) => return Ok(ok.json::<T>().await?),
                    Err(e) => last_err = Some(Error::Embedding(e.to_string())),
                },
                Err(e) => last_err = Some(Error::Embedding(e.to_string())),
            }

            if attempt < self.retries {
                tokio::time::sleep(Duration::from_millis(200 * (attempt + 1) as u64)).await;
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Embedding("Embedding backend request failed".to_string())))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.endpoint("/v1/embed/text")?;
        let request = EmbedTextRequest {
            model: self.model.clone(),
            inputs: vec![text.to_string()],
        };
        let parsed: EmbeddingResponse = self
            .send_with_retry(self.client.post(url).json(&request))
            .await?;

        let vector = parsed
            .into_embeddings()
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embedding returned".to_string()))?;

        if vector.len() != self.dimension {
            return Err(Error::Embedding(format!(
                "Embedding dimension mismatch for model '{}': expected {}, got {}",
                self.model,
                self.dimension,
                vector.len()
            )));
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str, dimension: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            url: url.to_string(),
            model: "test-embed".to_string(),
            dimension,
        }
    }

    #[tokio::test]
    async fn test_embed_parses_embeddings_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embed/text"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[0.1, 0.2, 0.3]]})),
            )
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new(&config(&server.uri(), 3)).unwrap();
        let vector = embedder.embed("Which team members know SQL?").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_rejects_dimension_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embed/text"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vectors": [[0.1, 0.2]]})))
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new(&config(&server.uri(), 3)).unwrap();
        let err = embedder.embed("question").await.unwrap_err();
        match err {
            Error::Embedding(message) => assert!(message.contains("dimension mismatch")),
            other => panic!("expected embedding error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embed_retries_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embed/text"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/embed/text"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"embedding": [1.0]}]})),
            )
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new(&config(&server.uri(), 1)).unwrap();
        let vector = embedder.embed("question").await.unwrap();
        assert_eq!(vector, vec![1.0]);
    }
}
