// OpenAI embedding adapter
// API Reference: https://platform.openai.com/docs/api-reference/embeddings

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::types::{AppError, AppResult};
use crate::utils::with_retry;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const MAX_ATTEMPTS: u32 = 3;

pub struct OpenAIEmbedder {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct OpenAIEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OpenAIEmbedResponse {
    data: Vec<OpenAIEmbedding>,
}

#[derive(Deserialize)]
struct OpenAIEmbedding {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAIEmbedder {
    pub fn new(api_key: &str, model: &str, dimension: usize) -> Self {
        Self::with_base_url(api_key, model, dimension, OPENAI_API_BASE)
    }

    pub fn with_base_url(api_key: &str, model: &str, dimension: usize, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            dimension,
        }
    }

    async fn request_embeddings(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);
        let payload = OpenAIEmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response = with_retry(
            || async {
                self.client
                    .post(&url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .json(&payload)
                    .send()
                    .await
            },
            MAX_ATTEMPTS,
        )
        .await
        .map_err(|e| AppError::EmbeddingUnavailable(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmbeddingUnavailable(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let parsed: OpenAIEmbedResponse = response.json().await.map_err(|e| {
            AppError::EmbeddingUnavailable(format!("Invalid OpenAI response: {}", e))
        })?;

        if parsed.data.len() != texts.len() {
            return Err(AppError::EmbeddingUnavailable(format!(
                "OpenAI returned {} embeddings for {} texts",
                parsed.data.len(),
                texts.len()
            )));
        }

        // Output order follows data[].index, not response position.
        let mut data = parsed.data;
        data.sort_by_key(|entry| entry.index);
        Ok(data.into_iter().map(|entry| entry.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let texts = [text.to_string()];
        let mut embeddings = self.request_embeddings(&texts).await?;
        embeddings
            .pop()
            .ok_or_else(|| AppError::EmbeddingUnavailable("OpenAI returned no embedding".into()))
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.request_embeddings(texts).await
    }
}
