// Vector index module
// Exact L2 nearest-neighbour search over chunk embeddings


pub mod storage;

use tracing::debug;

use crate::embeddings::Embedding;
use crate::{DocQaError, Result};

/// One search result: a stored position and its squared L2 distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub distance: f32,
}

/// Flat index of equally sized vectors, searched by brute force
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    /// Row-major storage, `len * dimension` values
    data: Vec<f32>,
}

impl VectorIndex {
    /// Build an index over `vectors`, which must all share one non-zero dimension
    /// and hold only finite values
    #[inline]
    pub fn build(vectors: &[Embedding]) -> Result<Self> {
        let first = vectors.first().ok_or_else(|| {
            DocQaError::EmptyCorpus("cannot build an index over zero vectors".to_string())
        })?;

        let dimension = first.len();
        if dimension == 0 {
            return Err(DocQaError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }

        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(DocQaError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            if !vector.iter().all(|v| v.is_finite()) {
                return Err(DocQaError::Embedding(format!(
                    "vector {} contains a non-finite value",
                    position
                )));
            }
            data.extend_from_slice(vector);
        }

        debug!(
            "Built vector index with {} vectors of dimension {}",
            vectors.len(),
            dimension
        );

        Ok(Self { dimension, data })
    }

    /// Reassemble an index from its raw row-major buffer
    pub(crate) fn from_raw(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 || data.is_empty() || data.len() % dimension != 0 {
            return Err(DocQaError::CorruptIndex(format!(
                "{} values cannot form vectors of dimension {}",
                data.len(),
                dimension
            )));
        }
        if !data.iter().all(|v| v.is_finite()) {
            return Err(DocQaError::CorruptIndex(
                "stored vectors contain a non-finite value".to_string(),
            ));
        }
        Ok(Self { dimension, data })
    }

    pub(crate) fn raw_values(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The stored vector at `position`
    #[inline]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// Return up to `k` stored vectors closest to `query`, nearest first.
    ///
    /// Every stored vector is compared. Equal distances keep insertion order.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(DocQaError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if !query.iter().all(|v| v.is_finite()) {
            return Err(DocQaError::Embedding(
                "query vector contains a non-finite value".to_string(),
            ));
        }

        let mut hits: Vec<SearchHit> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| SearchHit {
                position,
                distance: l2_squared(query, vector),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.position.cmp(&b.position))
        });
        hits.truncate(k);

        debug!(
            "Searched {} vectors, returning {} hits",
            self.len(),
            hits.len()
        );
        Ok(hits)
    }
}

/// Squared Euclidean distance between two equally sized vectors
#[inline]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// A vector index paired with the chunk text behind each stored vector
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    index: VectorIndex,
    chunks: Vec<String>,
}

impl Corpus {
    /// Pair `index` with `chunks`; position `i` of one belongs to position `i` of the other
    #[inline]
    pub fn new(index: VectorIndex, chunks: Vec<String>) -> Result<Self> {
        if index.len() != chunks.len() {
            return Err(DocQaError::CorruptIndex(format!(
                "index holds {} vectors but there are {} chunk texts",
                index.len(),
                chunks.len()
            )));
        }
        Ok(Self { index, chunks })
    }

    #[inline]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[inline]
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[inline]
    pub fn into_parts(self) -> (VectorIndex, Vec<String>) {
        (self.index, self.chunks)
    }
}
