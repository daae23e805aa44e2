//! Flat vector index over unit vectors, persisted as a single binary file.
//!
//! File format (little-endian):
//!   Magic: "DQVI" (4 bytes)
//!   Version: u16
//!   Metric: u8 (0=inner product, 1=squared L2)
//!   Dimension: u32
//!   Count: u64
//!   Vectors: Count x Dimension f32, contiguous

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const INDEX_MAGIC: [u8; 4] = *b"DQVI";
pub const INDEX_VERSION: u16 = 1;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index file not found: {0}")]
    Missing(PathBuf),

    #[error("index file corrupt: {path}: {detail}")]
    Corrupt { path: PathBuf, detail: String },

    #[error("index dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("empty vector batch")]
    EmptyBatch,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Similarity metric the index was built for. Both metrics score unit
/// vectors identically; the tag exists so a persisted index is never
/// searched under a different metric than it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    InnerProduct,
    SquaredL2,
}

impl SimilarityMetric {
    fn to_u8(self) -> u8 {
        match self {
            SimilarityMetric::InnerProduct => 0,
            SimilarityMetric::SquaredL2 => 1,
        }
    }

    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SimilarityMetric::InnerProduct),
            1 => Some(SimilarityMetric::SquaredL2),
            _ => None,
        }
    }
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMetric::InnerProduct => write!(f, "inner_product"),
            SimilarityMetric::SquaredL2 => write!(f, "squared_l2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub ordinal: usize,
    pub score: f32,
}

pub struct VectorIndex {
    dimension: usize,
    metric: SimilarityMetric,
    // Row-major, len == count * dimension
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn new(dimension: usize, metric: SimilarityMetric) -> Self {
        Self {
            dimension,
            metric,
            data: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            return 0;
        }
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Append a batch of vectors, normalizing each to unit L2 norm.
    /// Validation runs over the whole batch before anything is inserted, so
    /// either every vector is added or none is. Returns the ordinal assigned
    /// to the first vector of the batch.
    pub fn append(&mut self, vectors: &[Vec<f32>]) -> Result<usize, IndexError> {
        if vectors.is_empty() {
            return Err(IndexError::EmptyBatch);
        }
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }

        let first_ordinal = self.len();
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            let norm = l2_norm(vector);
            if norm > 0.0 {
                self.data.extend(vector.iter().map(|x| x / norm));
            } else {
                self.data.extend_from_slice(vector);
            }
        }
        Ok(first_ordinal)
    }

    /// Exact nearest-neighbor search. The query is normalized, every stored
    /// vector is scored, and hits come back as similarities in `[-1, 1]`
    /// sorted by descending score with ties broken by ascending ordinal.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let norm = l2_norm(query);
        let unit_query: Vec<f32> = if norm > 0.0 {
            query.iter().map(|x| x / norm).collect()
        } else {
            query.to_vec()
        };

        let mut hits: Vec<SearchHit> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(ordinal, row)| {
                let score = match self.metric {
                    SimilarityMetric::InnerProduct => dot(&unit_query, row),
                    // For unit vectors d^2 = 2 - 2*cos, so this recovers
                    // the same similarity the inner-product path reports.
                    SimilarityMetric::SquaredL2 => 1.0 - squared_l2(&unit_query, row) / 2.0,
                };
                SearchHit {
                    ordinal,
                    score: score.clamp(-1.0, 1.0),
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.ordinal.cmp(&b.ordinal))
        });
        hits.truncate(k.min(self.len()));
        Ok(hits)
    }

    /// Serialize the full vector set to `path`, writing a sibling temp file
    /// first and renaming it into place.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            writer.write_all(&INDEX_MAGIC)?;
            writer.write_all(&INDEX_VERSION.to_le_bytes())?;
            writer.write_all(&[self.metric.to_u8()])?;
            writer.write_all(&(self.dimension as u32).to_le_bytes())?;
            writer.write_all(&(self.len() as u64).to_le_bytes())?;
            for value in &self.data {
                writer.write_all(&value.to_le_bytes())?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Deserialize an index from `path`. A missing file, a corrupt file and
    /// a dimension mismatch each surface as their own error variant; the
    /// caller decides whether any of them is recoverable.
    pub fn load(path: &Path, expected_dimension: usize) -> Result<Self, IndexError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(IndexError::Missing(path.to_path_buf()));
            }
            Err(e) => return Err(IndexError::Io(e)),
        };
        let mut reader = BufReader::new(file);

        let corrupt = |detail: &str| IndexError::Corrupt {
            path: path.to_path_buf(),
            detail: detail.to_string(),
        };

        let mut magic = [0u8; 4];
        read_exact_or(&mut reader, &mut magic, || corrupt("truncated header"))?;
        if magic != INDEX_MAGIC {
            return Err(corrupt("bad magic"));
        }

        let mut buf2 = [0u8; 2];
        read_exact_or(&mut reader, &mut buf2, || corrupt("truncated header"))?;
        let version = u16::from_le_bytes(buf2);
        if version != INDEX_VERSION {
            return Err(corrupt(&format!("unsupported version {}", version)));
        }

        let mut buf1 = [0u8; 1];
        read_exact_or(&mut reader, &mut buf1, || corrupt("truncated header"))?;
        let metric = SimilarityMetric::from_u8(buf1[0])
            .ok_or_else(|| corrupt(&format!("unknown metric tag {}", buf1[0])))?;

        let mut buf4 = [0u8; 4];
        read_exact_or(&mut reader, &mut buf4, || corrupt("truncated header"))?;
        let dimension = u32::from_le_bytes(buf4) as usize;
        if dimension != expected_dimension {
            return Err(IndexError::DimensionMismatch {
                expected: expected_dimension,
                actual: dimension,
            });
        }

        let mut buf8 = [0u8; 8];
        read_exact_or(&mut reader, &mut buf8, || corrupt("truncated header"))?;
        let count = u64::from_le_bytes(buf8) as usize;

        let expected_values = count
            .checked_mul(dimension)
            .ok_or_else(|| corrupt("vector count overflows"))?;
        let mut data = Vec::with_capacity(expected_values);
        let mut value_buf = [0u8; 4];
        for _ in 0..expected_values {
            read_exact_or(&mut reader, &mut value_buf, || corrupt("truncated vector data"))?;
            data.push(f32::from_le_bytes(value_buf));
        }
        // Anything past the declared count means the header lies about it.
        let mut trailing = [0u8; 1];
        match reader.read(&mut trailing)? {
            0 => {}
            _ => return Err(corrupt("trailing bytes after vector data")),
        }

        Ok(Self {
            dimension,
            metric,
            data,
        })
    }
}

fn read_exact_or<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    on_eof: impl Fn() -> IndexError,
) -> Result<(), IndexError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            on_eof()
        } else {
            IndexError::Io(e)
        }
    })
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
