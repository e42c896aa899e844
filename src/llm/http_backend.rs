use super::CompletionClient;
use crate::config::CompletionConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Text { text: String },
    Response { response: String },
    Choices { choices: Vec<GenerateChoice> },
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateChoice {
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        match self {
            GenerateResponse::Text { text } => Some(text),
            GenerateResponse::Response { response } => Some(response),
            GenerateResponse::Choices { choices } => choices.into_iter().next().map(|c| c.text),
        }
    }
}

/// HTTP completion backend with bounded retry
pub struct HttpCompletion {
    client: Client,
    base_url: Url,
    model: String,
    temperature: f32,
    retries: usize,
}

impl HttpCompletion {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)?;
        let timeout = Duration::from_secs(60);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            retries: 2,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid completion backend URL: {}", e)))
    }

    async fn send_with_retry(&self, request: reqwest::RequestBuilder) -> Result<GenerateResponse> {
        let mut last_err: Option<Error> = None;
        for attempt in 0..=self.retries {
            let req = request
                .try_clone()
                .ok_or_else(|| Error::Completion("Failed to clone backend request".to_string()))?;
            match req.send().await {
                Ok(response) => match response.error_for_status() {
                    Ok(ok) => return Ok(ok.json::<GenerateResponse>().await?),
                    Err(e) => last_err = Some(Error::Completion(e.to_string())),
                },
                Err(e) => last_err = Some(Error::Completion(e.to_string())),
            }

            if attempt < self.retries {
                tokio::time::sleep(Duration::from_millis(200 * (attempt + 1) as u64)).await;
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Completion("Completion backend request failed".to_string())))
    }
}

#[async_trait]
impl CompletionClient for HttpCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint("/v1/generate")?;
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            temperature: self.temperature,
        };

        let parsed = self
            .send_with_retry(self.client.post(url).json(&request))
            .await?;

        let text = parsed
            .into_text()
            .ok_or_else(|| Error::Completion("No completion returned".to_string()))?;

        Ok(text.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str) -> CompletionConfig {
        CompletionConfig {
            url: url.to_string(),
            model: "test-gen".to_string(),
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn test_complete_sends_temperature_and_trims() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .and(body_partial_json(json!({"model": "test-gen", "temperature": 0.0})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"text": "  SELECT 1;\n"})),
            )
            .mount(&server)
            .await;

        let llm = HttpCompletion::new(&config(&server.uri())).unwrap();
        let text = llm.complete("generate sql").await.unwrap();
        assert_eq!(text, "SELECT 1;");
    }

    #[tokio::test]
    async fn test_complete_parses_choices_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"text": "three products"}]})),
            )
            .mount(&server)
            .await;

        let llm = HttpCompletion::new(&config(&server.uri())).unwrap();
        assert_eq!(llm.complete("explain").await.unwrap(), "three products");
    }

    #[tokio::test]
    async fn test_complete_surfaces_backend_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let llm = HttpCompletion::new(&config(&server.uri())).unwrap();
        let err = llm.complete("prompt").await.unwrap_err();
        assert!(matches!(err, Error::Completion(_)));
    }
}
