// Durable ordinal-keyed chunk records with an in-memory mirror.
//
// The `chunks` table is the single source of truth; the cache is rebuilt
// from it once at startup and extended on each successful append. Ordinals
// are dense in a healthy store, but lookups go through a binary search so a
// store with gaps (a detectable desync) can still be opened and inspected.

use serde_json::Value;
use sqlx::SqlitePool;
use tracing::warn;

use crate::types::{AppError, AppResult};

#[derive(Debug, Clone, serde::Serialize)]
pub struct ChunkRecord {
    pub ordinal: i64,
    pub text: String,
    pub metadata: Value,
}

// Raw row shape; FromRow is needed for runtime query_as (no DATABASE_URL at
// compile time).
#[derive(sqlx::FromRow)]
struct ChunkRow {
    ordinal: i64,
    chunk_text: String,
    metadata: String,
}

impl ChunkRow {
    fn into_record(self) -> ChunkRecord {
        let metadata = serde_json::from_str(&self.metadata).unwrap_or_else(|e| {
            warn!(ordinal = self.ordinal, error = %e, "Unparseable chunk metadata, substituting empty object");
            Value::Object(Default::default())
        });
        ChunkRecord {
            ordinal: self.ordinal,
            text: self.chunk_text,
            metadata,
        }
    }
}

pub struct ChunkStore {
    pool: SqlitePool,
    cache: Vec<ChunkRecord>,
}

impl ChunkStore {
    /// Open the store, rebuilding the in-memory mirror from the database in
    /// ascending ordinal order.
    pub async fn open(pool: SqlitePool) -> AppResult<Self> {
        let rows: Vec<ChunkRow> = sqlx::query_as(
            "SELECT ordinal, chunk_text, metadata FROM chunks ORDER BY ordinal ASC",
        )
        .fetch_all(&pool)
        .await?;

        let cache: Vec<ChunkRecord> = rows.into_iter().map(ChunkRow::into_record).collect();
        for (position, record) in cache.iter().enumerate() {
            if record.ordinal != position as i64 {
                warn!(
                    ordinal = record.ordinal,
                    position,
                    "Chunk ordinals are not dense; store needs repair"
                );
                break;
            }
        }

        Ok(Self { pool, cache })
    }

    /// Insert a batch of records with ordinals `first_ordinal..`, all in one
    /// transaction. The UNIQUE constraint on `ordinal` turns a concurrency
    /// bug into a `DuplicateOrdinal` error instead of silent corruption.
    pub async fn append(
        &mut self,
        first_ordinal: i64,
        records: Vec<(String, Value)>,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let mut staged = Vec::with_capacity(records.len());

        for (offset, (text, metadata)) in records.into_iter().enumerate() {
            let ordinal = first_ordinal + offset as i64;
            let metadata_json = serde_json::to_string(&metadata)
                .map_err(|e| AppError::Internal(format!("Failed to encode metadata: {}", e)))?;

            sqlx::query("INSERT INTO chunks (ordinal, chunk_text, metadata) VALUES (?1, ?2, ?3)")
                .bind(ordinal)
                .bind(&text)
                .bind(&metadata_json)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_insert_error(e, ordinal))?;

            staged.push(ChunkRecord {
                ordinal,
                text,
                metadata,
            });
        }

        tx.commit().await?;
        self.cache.extend(staged);
        Ok(())
    }

    pub fn get(&self, ordinal: i64) -> Option<&ChunkRecord> {
        self.cache
            .binary_search_by_key(&ordinal, |record| record.ordinal)
            .ok()
            .map(|position| &self.cache[position])
    }

    pub fn count(&self) -> usize {
        self.cache.len()
    }

    /// Row count straight from the database, bypassing the mirror. The
    /// consistency checker audits this, not the cache.
    pub async fn durable_count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Durable lookup by ordinal, bypassing the mirror.
    pub async fn lookup_durable(&self, ordinal: i64) -> AppResult<Option<ChunkRecord>> {
        let row: Option<ChunkRow> =
            sqlx::query_as("SELECT ordinal, chunk_text, metadata FROM chunks WHERE ordinal = ?1")
                .bind(ordinal)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(ChunkRow::into_record))
    }

    /// Remove every record. Only the destructive reset/repair paths call
    /// this; ordinal numbering restarts from zero afterwards.
    pub async fn clear(&mut self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM chunks").execute(&self.pool).await?;
        self.cache.clear();
        Ok(result.rows_affected())
    }
}

fn map_insert_error(e: sqlx::Error, ordinal: i64) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateOrdinal(ordinal),
        _ => AppError::Database(e),
    }
}
