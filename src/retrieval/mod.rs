// Retrieval orchestrator: the query-time pipeline from text to ranked,
// contextualized results, and the single writer for the coupled
// index + chunk-store pair.
//
// Appends are serialized by the write half of one RwLock covering both
// stores, so ordinals derived from "current count" stay consistent between
// them. Embedding always happens before the lock is taken; collaborator
// latency never extends the critical section.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::chunk_store::ChunkStore;
use crate::config::Config;
use crate::consistency::backup_index_file;
use crate::embeddings::Embedder;
use crate::reranker::Reranker;
use crate::types::{AppError, AppResult};
use crate::vector_index::{IndexError, SimilarityMetric, VectorIndex};

/// Cap on how many candidates are handed to the reranker, whatever top_k
/// the caller asked for.
const RERANK_CANDIDATE_CAP: usize = 30;

const NO_CONTEXT_SENTINEL: &str = "No relevant context found.";

#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    pub ordinal: i64,
    pub text: String,
    pub score: f32,
    pub metadata: Value,
}

#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub total_vectors: usize,
    pub chunks_count: usize,
    pub is_synced: bool,
    pub index_path: String,
    pub index_exists: bool,
}

/// Outcome of the reranking step. Degradation is a value, not a control-flow
/// accident, so the orchestrator can log exactly why order fell back to
/// vector similarity.
pub enum RerankOutcome {
    Reranked(Vec<RetrievedChunk>),
    Degraded {
        results: Vec<RetrievedChunk>,
        reason: String,
    },
}

pub(crate) struct RetrievalSettings {
    pub index_path: PathBuf,
    pub store_dir: PathBuf,
    pub dimension: usize,
    pub metric: SimilarityMetric,
    pub recover_empty: bool,
}

pub(crate) struct RetrievalInner {
    pub index: VectorIndex,
    pub chunks: ChunkStore,
}

impl RetrievalInner {
    /// Search the index and join hits against the chunk mirror, dropping
    /// ordinals the store cannot resolve and anything under the threshold.
    fn search_chunks(
        &self,
        query_vector: &[f32],
        k: usize,
        threshold: f32,
    ) -> AppResult<Vec<RetrievedChunk>> {
        if self.index.is_empty() {
            debug!("Vector store is empty");
            return Ok(Vec::new());
        }

        let hits = self.index.search(query_vector, k)?;
        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            let Some(record) = self.chunks.get(hit.ordinal as i64) else {
                warn!(
                    ordinal = hit.ordinal,
                    "Vector hit has no chunk record; index and store have diverged"
                );
                continue;
            };
            if hit.score >= threshold {
                results.push(RetrievedChunk {
                    ordinal: record.ordinal,
                    text: record.text.clone(),
                    score: hit.score,
                    metadata: record.metadata.clone(),
                });
            }
        }
        Ok(results)
    }
}

pub struct RetrievalService {
    pub(crate) inner: RwLock<RetrievalInner>,
    pub(crate) settings: RetrievalSettings,
    embedder: Arc<dyn Embedder>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RetrievalService {
    /// Build the service: load or bootstrap the vector index, rebuild the
    /// chunk mirror, and check the sync invariant once at startup.
    ///
    /// A missing index file is a legitimate first run and starts empty. A
    /// file that exists but cannot be loaded fails startup unless the
    /// operator has opted into `VECTOR_INDEX_RECOVER_EMPTY`, which backs the
    /// bad file up and starts empty. The two cases are never conflated.
    pub async fn init(
        config: &Config,
        pool: SqlitePool,
        embedder: Arc<dyn Embedder>,
        reranker: Option<Arc<dyn Reranker>>,
    ) -> AppResult<Self> {
        let settings = RetrievalSettings {
            index_path: config.vector_store.index_path(),
            store_dir: PathBuf::from(&config.vector_store.dir),
            dimension: config.embedding.dimension,
            metric: config.vector_store.metric,
            recover_empty: config.vector_store.recover_empty,
        };

        let index = match VectorIndex::load(&settings.index_path, settings.dimension) {
            Ok(index) => {
                if index.metric() != settings.metric {
                    warn!(
                        persisted = %index.metric(),
                        configured = %settings.metric,
                        "Persisted index metric differs from configuration; keeping the persisted metric. Use /api/migrate-index to switch."
                    );
                }
                info!(
                    vectors = index.len(),
                    path = %settings.index_path.display(),
                    "Loaded vector index"
                );
                index
            }
            Err(IndexError::Missing(path)) => {
                info!(
                    path = %path.display(),
                    "No vector index file found; starting with an empty index"
                );
                VectorIndex::new(settings.dimension, settings.metric)
            }
            Err(e) if settings.recover_empty => {
                let backup = backup_index_file(&settings)?;
                std::fs::remove_file(&settings.index_path).map_err(IndexError::from)?;
                warn!(
                    error = %e,
                    backup = ?backup,
                    "Vector index failed to load; backed it up and starting empty (VECTOR_INDEX_RECOVER_EMPTY)"
                );
                VectorIndex::new(settings.dimension, settings.metric)
            }
            Err(e) => return Err(e.into()),
        };

        let chunks = ChunkStore::open(pool).await?;
        if index.len() != chunks.count() {
            warn!(
                vectors = index.len(),
                records = chunks.count(),
                "Vector index and chunk store disagree at startup; run check-sync and repair"
            );
        }

        Ok(Self {
            inner: RwLock::new(RetrievalInner { index, chunks }),
            settings,
            embedder,
            reranker,
        })
    }

    /// Embed a batch of chunks and append them to both stores under one
    /// write guard. Either the whole batch lands in both stores or neither
    /// is touched.
    pub async fn add_documents(
        &self,
        texts: Vec<String>,
        metadata: Option<Vec<Value>>,
    ) -> AppResult<usize> {
        if texts.is_empty() {
            return Err(AppError::InvalidRequest("No chunks provided".to_string()));
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(AppError::InvalidRequest(
                "Chunk text must be non-empty".to_string(),
            ));
        }

        let mut metadata = metadata.unwrap_or_default();
        if metadata.len() != texts.len() {
            if !metadata.is_empty() {
                warn!(
                    metadata_count = metadata.len(),
                    chunk_count = texts.len(),
                    "Metadata count doesn't match chunk count; aligning with empty metadata"
                );
            }
            metadata.resize(texts.len(), Value::Object(Default::default()));
        }

        // Embed before taking the lock; a failed batch leaves both stores
        // untouched.
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(AppError::EmbeddingUnavailable(format!(
                "Embedding count ({}) doesn't match chunk count ({})",
                embeddings.len(),
                texts.len()
            )));
        }
        for embedding in &embeddings {
            if embedding.len() != self.settings.dimension {
                return Err(AppError::DimensionMismatch {
                    expected: self.settings.dimension,
                    actual: embedding.len(),
                });
            }
        }

        let mut inner = self.inner.write().await;

        let vectors = inner.index.len();
        let records = inner.chunks.count();
        if vectors != records {
            // Ordinal assignment derives from "current count"; appending onto
            // a desynced pair would manufacture new mismatched entries.
            return Err(AppError::DesyncDetected { vectors, records });
        }

        let first_ordinal = vectors;
        let rows: Vec<(String, Value)> = texts.into_iter().zip(metadata).collect();
        let added = rows.len();

        inner.chunks.append(first_ordinal as i64, rows).await?;
        let assigned = inner.index.append(&embeddings)?;
        debug_assert_eq!(assigned, first_ordinal);
        inner.index.save(&self.settings.index_path)?;

        info!(
            added,
            first_ordinal,
            total_vectors = inner.index.len(),
            "Added chunks to vector store"
        );
        Ok(added)
    }

    /// Similarity search without reranking.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        threshold: f32,
    ) -> AppResult<Vec<RetrievedChunk>> {
        let query_vector = self.embedder.embed(query).await?;
        let inner = self.inner.read().await;
        let results = inner.search_chunks(&query_vector, top_k, threshold)?;
        info!(count = results.len(), %threshold, "Search returned results");
        Ok(results)
    }

    /// Full retrieval pipeline: search with candidate widening, then rerank
    /// when a reranker is configured. Reranking failures degrade to the
    /// vector-similarity order; they never fail the query.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        threshold: f32,
    ) -> AppResult<Vec<RetrievedChunk>> {
        let candidate_k = if self.reranker.is_some() {
            (top_k * 2).min(RERANK_CANDIDATE_CAP)
        } else {
            top_k
        };

        let query_vector = self.embedder.embed(query).await?;
        let candidates = {
            let inner = self.inner.read().await;
            inner.search_chunks(&query_vector, candidate_k, threshold)?
        };
        debug!(count = candidates.len(), "Retrieved candidate chunks");

        if candidates.is_empty() {
            return Ok(candidates);
        }

        let mut results = match &self.reranker {
            Some(reranker) => {
                match apply_rerank(reranker.as_ref(), query, candidates, top_k).await {
                    RerankOutcome::Reranked(results) => {
                        debug!(count = results.len(), "Reranked candidates");
                        results
                    }
                    RerankOutcome::Degraded { results, reason } => {
                        warn!(reason = %reason, "Reranker degraded; using vector-similarity order");
                        results
                    }
                }
            }
            None => candidates,
        };
        results.truncate(top_k);
        Ok(results)
    }

    /// Format retrieved chunks into a context string for answer synthesis.
    pub fn format_context(results: &[RetrievedChunk]) -> String {
        if results.is_empty() {
            return NO_CONTEXT_SENTINEL.to_string();
        }

        let mut blocks = Vec::with_capacity(results.len());
        for (i, chunk) in results.iter().enumerate() {
            if chunk.text.trim().is_empty() {
                warn!(ordinal = chunk.ordinal, "Skipping empty chunk in context");
                continue;
            }
            let citation = page_number(&chunk.metadata)
                .map(|page| format!(" - Page {}", page))
                .unwrap_or_default();
            blocks.push(format!(
                "[Context {}{} (relevance: {:.3})]\n{}\n",
                i + 1,
                citation,
                chunk.score,
                chunk.text
            ));
        }

        if blocks.is_empty() {
            return NO_CONTEXT_SENTINEL.to_string();
        }
        blocks.join("\n")
    }

    pub async fn get_stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        let total_vectors = inner.index.len();
        let chunks_count = inner.chunks.count();
        StoreStats {
            total_vectors,
            chunks_count,
            is_synced: total_vectors == chunks_count,
            index_path: self.settings.index_path.display().to_string(),
            index_exists: self.settings.index_path.exists(),
        }
    }

    /// Destructive clear of both stores and the persisted index file.
    /// Ordinal numbering restarts from zero.
    pub async fn reset(&self) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let cleared = inner.chunks.clear().await?;
        if self.settings.index_path.exists() {
            std::fs::remove_file(&self.settings.index_path).map_err(IndexError::from)?;
        }
        let metric = inner.index.metric();
        inner.index = VectorIndex::new(self.settings.dimension, metric);
        info!(cleared_records = cleared, "Store reset");
        Ok(())
    }
}

async fn apply_rerank(
    reranker: &dyn Reranker,
    query: &str,
    candidates: Vec<RetrievedChunk>,
    top_k: usize,
) -> RerankOutcome {
    match reranker.rerank(query, &candidates, top_k).await {
        Ok(reranked) if !reranked.is_empty() => RerankOutcome::Reranked(reranked),
        Ok(_) => RerankOutcome::Degraded {
            results: candidates,
            reason: "reranker returned no results".to_string(),
        },
        Err(e) => RerankOutcome::Degraded {
            results: candidates,
            reason: e.to_string(),
        },
    }
}

/// Page citation from chunk metadata: first non-null of `page`,
/// `page_number`, `pageNumber`, integer-coerced. Zero and uncoercible
/// values produce no citation.
fn page_number(metadata: &Value) -> Option<i64> {
    let value = ["page", "page_number", "pageNumber"]
        .iter()
        .find_map(|key| metadata.get(*key).filter(|v| !v.is_null()))?;
    let page = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (page != 0).then_some(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        service_with, test_config, test_pool, FailingEmbedder, FailingReranker, StubEmbedder,
        StubReranker,
    };
    use serde_json::json;

    fn chunk(ordinal: i64, text: &str, score: f32, metadata: Value) -> RetrievedChunk {
        RetrievedChunk {
            ordinal,
            text: text.to_string(),
            score,
            metadata,
        }
    }

    #[tokio::test]
    async fn test_append_keeps_stores_in_sync() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), None).await;

        service
            .add_documents(vec!["apple".into(), "banana".into()], None)
            .await
            .unwrap();
        service.add_documents(vec!["cherry".into()], None).await.unwrap();

        let stats = service.get_stats().await;
        assert_eq!(stats.total_vectors, 3);
        assert_eq!(stats.chunks_count, 3);
        assert!(stats.is_synced);
    }

    #[tokio::test]
    async fn test_ordinals_are_dense_across_batches() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), None).await;

        service
            .add_documents(vec!["apple".into(), "banana".into(), "cherry".into()], None)
            .await
            .unwrap();
        service
            .add_documents(vec!["date".into(), "elderberry".into()], None)
            .await
            .unwrap();

        let inner = service.inner.read().await;
        for (ordinal, text) in [(0, "apple"), (2, "cherry"), (3, "date"), (4, "elderberry")] {
            assert_eq!(inner.chunks.get(ordinal).unwrap().text, text);
        }
    }

    #[tokio::test]
    async fn test_search_exact_match_scores_one() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), None).await;

        service
            .add_documents(vec!["apple".into(), "banana".into()], None)
            .await
            .unwrap();

        let results = service.search("apple", 2, 0.0).await.unwrap();
        assert_eq!(results[0].text, "apple");
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_search_filters_by_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), None).await;

        service
            .add_documents(vec!["apple".into(), "banana".into()], None)
            .await
            .unwrap();

        // "apple" and "banana" stub vectors are orthogonal.
        let results = service.search("apple", 5, 0.9).await.unwrap();
        assert_eq!(results.len(), 1);
        for result in &results {
            assert!(result.score >= 0.9);
        }
    }

    #[tokio::test]
    async fn test_search_empty_store_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), None).await;
        let results = service.search("apple", 5, 0.0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_exhaustion_then_widen_retry() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), None).await;

        service
            .add_documents(vec!["banana".into(), "cherry".into()], None)
            .await
            .unwrap();

        // Nothing matches "apple" at 0.9; the documented second attempt at
        // threshold 0.0 with doubled top_k accepts weaker matches.
        let strict = service.retrieve("apple", 5, 0.9).await.unwrap();
        assert!(strict.is_empty());

        let widened = service.retrieve("apple", 10, 0.0).await.unwrap();
        assert!(!widened.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_stores_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, FailingEmbedder, None).await;

        let result = service.add_documents(vec!["apple".into()], None).await;
        assert!(matches!(result, Err(AppError::EmbeddingUnavailable(_))));

        let stats = service.get_stats().await;
        assert_eq!(stats.total_vectors, 0);
        assert_eq!(stats.chunks_count, 0);
        assert!(!stats.index_exists);
    }

    #[tokio::test]
    async fn test_append_refused_on_desynced_stores() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), None).await;
        service.add_documents(vec!["apple".into()], None).await.unwrap();

        // Push a vector past the chunk store to force a desync.
        {
            let mut inner = service.inner.write().await;
            inner.index.append(&[vec![0.5, 0.5, 0.0]]).unwrap();
        }

        let result = service.add_documents(vec!["banana".into()], None).await;
        assert!(matches!(
            result,
            Err(AppError::DesyncDetected {
                vectors: 2,
                records: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_unresolvable_ordinals_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), None).await;
        service.add_documents(vec!["apple".into()], None).await.unwrap();

        {
            let mut inner = service.inner.write().await;
            inner.index.append(&[vec![0.0, 1.0, 0.0]]).unwrap();
        }

        // The orphaned vector scores but has no record; the query survives
        // with the resolvable result only.
        let results = service.search("banana", 5, -1.0).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "apple");
    }

    #[tokio::test]
    async fn test_invalid_batches_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), None).await;

        assert!(matches!(
            service.add_documents(vec![], None).await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.add_documents(vec!["ok".into(), "   ".into()], None).await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_short_metadata_is_padded() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), None).await;

        service
            .add_documents(
                vec!["apple".into(), "banana".into()],
                Some(vec![json!({"page": 1})]),
            )
            .await
            .unwrap();

        let inner = service.inner.read().await;
        assert_eq!(inner.chunks.get(0).unwrap().metadata["page"], 1);
        assert!(inner.chunks.get(1).unwrap().metadata.as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reranker_reorders_results() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, StubEmbedder::default(), Some(Arc::new(StubReranker))).await;

        service
            .add_documents(vec!["apple".into(), "apricot".into()], None)
            .await
            .unwrap();

        // The stub reranker reverses candidate order.
        let plain = service.search("apple", 2, 0.0).await.unwrap();
        let reranked = service.retrieve("apple", 2, 0.0).await.unwrap();
        assert_eq!(plain.first().unwrap().ordinal, reranked.last().unwrap().ordinal);
    }

    #[tokio::test]
    async fn test_reranker_failure_degrades_to_vector_order() {
        let dir = tempfile::tempdir().unwrap();
        let service =
            service_with(&dir, StubEmbedder::default(), Some(Arc::new(FailingReranker))).await;

        service
            .add_documents(vec!["apple".into(), "apricot".into()], None)
            .await
            .unwrap();

        let results = service.retrieve("apple", 2, 0.0).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "apple");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_persistence_round_trip_through_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let pool = test_pool().await;

        {
            let service = RetrievalService::init(
                &config,
                pool.clone(),
                Arc::new(StubEmbedder::default()),
                None,
            )
            .await
            .unwrap();
            service
                .add_documents(vec!["apple".into(), "banana".into()], None)
                .await
                .unwrap();
        }

        let service =
            RetrievalService::init(&config, pool, Arc::new(StubEmbedder::default()), None)
                .await
                .unwrap();
        let stats = service.get_stats().await;
        assert_eq!(stats.total_vectors, 2);
        assert!(stats.is_synced);

        let results = service.search("apple", 2, 0.0).await.unwrap();
        assert_eq!(results[0].text, "apple");
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_init_fails_loudly_on_corrupt_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        std::fs::create_dir_all(&config.vector_store.dir).unwrap();
        std::fs::write(config.vector_store.index_path(), b"garbage").unwrap();

        let result = RetrievalService::init(
            &config,
            test_pool().await,
            Arc::new(StubEmbedder::default()),
            None,
        )
        .await;
        assert!(matches!(
            result,
            Err(AppError::Index(IndexError::Corrupt { .. }))
        ));
    }

    #[tokio::test]
    async fn test_init_recovers_from_corrupt_index_when_opted_in() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        config.vector_store.recover_empty = true;
        std::fs::create_dir_all(&config.vector_store.dir).unwrap();
        std::fs::write(config.vector_store.index_path(), b"garbage").unwrap();

        let service = RetrievalService::init(
            &config,
            test_pool().await,
            Arc::new(StubEmbedder::default()),
            None,
        )
        .await
        .unwrap();

        let stats = service.get_stats().await;
        assert_eq!(stats.total_vectors, 0);
        // The bad file must be preserved, not destroyed.
        let backup_dir = std::path::Path::new(&config.vector_store.dir).join("backup");
        assert_eq!(std::fs::read_dir(backup_dir).unwrap().count(), 1);
    }

    #[test]
    fn test_format_context_empty_returns_sentinel() {
        assert_eq!(
            RetrievalService::format_context(&[]),
            "No relevant context found."
        );
    }

    #[test]
    fn test_format_context_skips_blank_entries() {
        let results = vec![
            chunk(0, "   ", 0.9, json!({})),
            chunk(1, "Revenue grew 12%", 0.8, json!({})),
        ];
        let context = RetrievalService::format_context(&results);
        assert!(context.contains("Revenue grew 12%"));
        assert!(context.contains("(relevance: 0.800)"));
        assert!(!context.contains("Context 1 "));
    }

    #[test]
    fn test_format_context_all_blank_returns_sentinel() {
        let results = vec![chunk(0, " ", 0.9, json!({})), chunk(1, "\n", 0.8, json!({}))];
        assert_eq!(
            RetrievalService::format_context(&results),
            "No relevant context found."
        );
    }

    #[test]
    fn test_format_context_page_citations() {
        let results = vec![
            chunk(0, "first", 0.91, json!({"page": 4})),
            chunk(1, "second", 0.82, json!({"pageNumber": "7"})),
            chunk(2, "third", 0.73, json!({"page": "n/a"})),
        ];
        let context = RetrievalService::format_context(&results);
        assert!(context.contains("[Context 1 - Page 4 (relevance: 0.910)]"));
        assert!(context.contains("[Context 2 - Page 7 (relevance: 0.820)]"));
        assert!(context.contains("[Context 3 (relevance: 0.730)]"));
    }

    #[test]
    fn test_page_number_coercion() {
        assert_eq!(page_number(&json!({"page": 3})), Some(3));
        assert_eq!(page_number(&json!({"page_number": 2.0})), Some(2));
        assert_eq!(page_number(&json!({"pageNumber": " 9 "})), Some(9));
        assert_eq!(page_number(&json!({"page": 0})), None);
        assert_eq!(page_number(&json!({"page": null, "page_number": 5})), Some(5));
        assert_eq!(page_number(&json!({"page": [1]})), None);
        assert_eq!(page_number(&json!({})), None);
    }
}
