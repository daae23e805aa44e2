// Cohere rerank adapter
// API Reference: https://docs.cohere.com/reference/rerank

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::reranker::Reranker;
use crate::retrieval::RetrievedChunk;
use crate::types::{AppError, AppResult};

const COHERE_API_BASE: &str = "https://api.cohere.com";

pub struct CohereReranker {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct CohereRerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: Vec<&'a str>,
    top_n: usize,
}

#[derive(Deserialize)]
struct CohereRerankResponse {
    results: Vec<CohereRerankResult>,
}

#[derive(Deserialize)]
struct CohereRerankResult {
    index: usize,
    relevance_score: f32,
}

impl CohereReranker {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::with_base_url(api_key, model, COHERE_API_BASE)
    }

    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Reranker for CohereReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: &[RetrievedChunk],
        top_k: usize,
    ) -> AppResult<Vec<RetrievedChunk>> {
        if candidates.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/v2/rerank", self.base_url);
        let payload = CohereRerankRequest {
            model: &self.model,
            query,
            documents: candidates.iter().map(|c| c.text.as_str()).collect(),
            top_n: top_k.min(candidates.len()),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Cohere request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Cohere API error {}: {}",
                status, body
            )));
        }

        let parsed: CohereRerankResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Invalid Cohere response: {}", e)))?;

        let mut reranked = Vec::with_capacity(parsed.results.len());
        for result in parsed.results {
            let Some(candidate) = candidates.get(result.index) else {
                warn!(index = result.index, "Cohere returned out-of-range document index");
                continue;
            };
            reranked.push(RetrievedChunk {
                score: result.relevance_score,
                ..candidate.clone()
            });
        }
        Ok(reranked)
    }
}
