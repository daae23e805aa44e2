// Nomic Atlas embedding adapter
// API Reference: https://docs.nomic.ai/reference/endpoints/nomic-embed-text

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::types::{AppError, AppResult};
use crate::utils::with_retry;

const NOMIC_API_BASE: &str = "https://api-atlas.nomic.ai/v1";
const MAX_ATTEMPTS: u32 = 3;

// Nomic embeds asymmetrically: documents and queries carry different task
// hints and are not interchangeable.
const TASK_SEARCH_DOCUMENT: &str = "search_document";
const TASK_SEARCH_QUERY: &str = "search_query";

pub struct NomicEmbedder {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct NomicEmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
    task_type: &'a str,
}

#[derive(Deserialize)]
struct NomicEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl NomicEmbedder {
    pub fn new(api_key: &str, model: &str, dimension: usize) -> Self {
        Self::with_base_url(api_key, model, dimension, NOMIC_API_BASE)
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

    async fn embed_with_task(&self, texts: &[String], task_type: &str) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embedding/text", self.base_url);
        let payload = NomicEmbedRequest {
            model: &self.model,
            texts,
            task_type,
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
        .map_err(|e| AppError::EmbeddingUnavailable(format!("Nomic request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmbeddingUnavailable(format!(
                "Nomic API error {}: {}",
                status, body
            )));
        }

        let parsed: NomicEmbedResponse = response.json().await.map_err(|e| {
            AppError::EmbeddingUnavailable(format!("Invalid Nomic response: {}", e))
        })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(AppError::EmbeddingUnavailable(format!(
                "Nomic returned {} embeddings for {} texts",
                parsed.embeddings.len(),
                texts.len()
            )));
        }

        Ok(parsed.embeddings)
    }
}

#[async_trait]
impl Embedder for NomicEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let texts = [text.to_string()];
        let mut embeddings = self.embed_with_task(&texts, TASK_SEARCH_QUERY).await?;
        embeddings
            .pop()
            .ok_or_else(|| AppError::EmbeddingUnavailable("Nomic returned no embedding".into()))
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.embed_with_task(texts, TASK_SEARCH_DOCUMENT).await
    }
}
