// Consistency checking and destructive repair for the index/store pair.
//
// Entries cannot be reconciled one-by-one: the index holds vectors without
// text, so once the ordinal mapping is in doubt the only safe repair is to
// back up the index artifact, clear both stores and re-ingest. Partial
// reconciliation could attach the wrong text to the wrong vector and
// corrupt every future query silently.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::retrieval::{RetrievalService, RetrievalSettings};
use crate::types::AppResult;
use crate::vector_index::{IndexError, SimilarityMetric, VectorIndex};

/// How many leading ordinals the sample check audits.
const SAMPLE_LIMIT: usize = 100;

#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub total_vectors: usize,
    pub total_records: i64,
    pub is_synced: bool,
    pub sample_checked: usize,
    pub sample_found: usize,
    pub sample_missing: usize,
    pub match_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct RepairReport {
    pub backup_location: String,
    pub backed_up_index: Option<String>,
    pub cleared_vectors: usize,
    pub cleared_records: u64,
}

#[derive(Debug, Serialize)]
pub struct MigrationReport {
    pub old_metric: SimilarityMetric,
    pub new_metric: SimilarityMetric,
    pub migrated: bool,
    pub backup_location: Option<String>,
}

impl RetrievalService {
    /// Compare the index against the durable chunk table and sample-check
    /// the first `SAMPLE_LIMIT` ordinals. Reads the database directly so a
    /// stale in-memory mirror cannot mask a divergence.
    pub async fn check_sync(&self) -> AppResult<SyncReport> {
        let inner = self.inner.read().await;

        let total_vectors = inner.index.len();
        let total_records = inner.chunks.durable_count().await?;

        let sample_checked = total_vectors.min(SAMPLE_LIMIT);
        let mut sample_found = 0usize;
        let mut sample_missing = 0usize;
        for ordinal in 0..sample_checked {
            if inner.chunks.lookup_durable(ordinal as i64).await?.is_some() {
                sample_found += 1;
            } else {
                sample_missing += 1;
            }
        }

        let is_synced = total_vectors as i64 == total_records;
        if !is_synced {
            warn!(
                total_vectors,
                total_records, "Vector index and chunk store are out of sync"
            );
        }

        Ok(SyncReport {
            total_vectors,
            total_records,
            is_synced,
            sample_checked,
            sample_found,
            sample_missing,
            match_rate: if sample_checked > 0 {
                sample_found as f64 / sample_checked as f64
            } else {
                0.0
            },
        })
    }

    /// Destructive repair: back up the index artifact, clear the chunk
    /// store, delete the index file and recreate an empty index. Documents
    /// must be re-ingested afterwards.
    pub async fn repair(&self) -> AppResult<RepairReport> {
        let mut inner = self.inner.write().await;

        let backed_up = backup_index_file(&self.settings)?;
        let cleared_records = inner.chunks.clear().await?;
        let cleared_vectors = inner.index.len();

        if self.settings.index_path.exists() {
            std::fs::remove_file(&self.settings.index_path).map_err(IndexError::from)?;
        }
        let metric = inner.index.metric();
        inner.index = VectorIndex::new(self.settings.dimension, metric);

        info!(
            cleared_vectors,
            cleared_records,
            backup = ?backed_up,
            "Repaired store; re-ingest source documents to rebuild"
        );

        Ok(RepairReport {
            backup_location: self.settings.store_dir.join("backup").display().to_string(),
            backed_up_index: backed_up.map(|p| p.display().to_string()),
            cleared_vectors,
            cleared_records,
        })
    }

    /// Switch the similarity metric. Stored vectors are tied to the metric
    /// their index was written with, so a switch is the same destructive
    /// repair, after which the empty index carries the new metric.
    pub async fn migrate_similarity_metric(
        &self,
        new_metric: SimilarityMetric,
    ) -> AppResult<MigrationReport> {
        let mut inner = self.inner.write().await;

        let old_metric = inner.index.metric();
        if old_metric == new_metric {
            return Ok(MigrationReport {
                old_metric,
                new_metric,
                migrated: false,
                backup_location: None,
            });
        }

        let backed_up = backup_index_file(&self.settings)?;
        inner.chunks.clear().await?;
        if self.settings.index_path.exists() {
            std::fs::remove_file(&self.settings.index_path).map_err(IndexError::from)?;
        }
        inner.index = VectorIndex::new(self.settings.dimension, new_metric);
        // Persist the empty index so the new metric survives a restart.
        inner.index.save(&self.settings.index_path)?;

        info!(
            %old_metric,
            %new_metric,
            "Migrated similarity metric; re-ingest source documents to rebuild"
        );

        Ok(MigrationReport {
            old_metric,
            new_metric,
            migrated: true,
            backup_location: backed_up.map(|p| p.display().to_string()),
        })
    }
}

/// Copy the current index file into `<store_dir>/backup/` with a timestamped
/// name. Returns the backup path, or `None` when no index file exists yet.
pub(crate) fn backup_index_file(settings: &RetrievalSettings) -> AppResult<Option<PathBuf>> {
    if !settings.index_path.exists() {
        return Ok(None);
    }

    let backup_dir = settings.store_dir.join("backup");
    std::fs::create_dir_all(&backup_dir).map_err(IndexError::from)?;

    let file_name = settings
        .index_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("index");
    let timestamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
    let backup_path = backup_dir.join(format!("{}.{}.bak", file_name, timestamp));

    std::fs::copy(&settings.index_path, &backup_path).map_err(IndexError::from)?;
    info!(backup = %backup_path.display(), "Backed up vector index");
    Ok(Some(backup_path))
}
