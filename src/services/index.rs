//! In-memory similarity index with linear-scan cosine retrieval.

use std::collections::HashSet;
use uuid::Uuid;

use crate::error::IndexError;
use crate::models::{Chunk, EmbeddingRecord, Scored};

/// Insertion-ordered collection of `(chunk, vector)` records.
///
/// Mutated only while a corpus is being processed (`add`/`clear`); queries
/// run a full linear scan, O(n * D). All vectors share one dimensionality,
/// fixed by the first record and enforced on every `add`.
#[derive(Debug, Default)]
pub struct SimilarityIndex {
    records: Vec<EmbeddingRecord>,
    ids: HashSet<Uuid>,
    dimension: Option<usize>,
}

impl SimilarityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. O(1); rejects duplicate chunk ids and vectors whose
    /// dimensionality disagrees with the records already stored.
    pub fn add(&mut self, chunk: Chunk, vector: Vec<f32>) -> Result<(), IndexError> {
        let expected = *self.dimension.get_or_insert(vector.len());
        if vector.len() != expected {
            return Err(IndexError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        if !self.ids.insert(chunk.id) {
            return Err(IndexError::DuplicateChunk(chunk.id));
        }
        self.records.push(EmbeddingRecord { chunk, vector });
        Ok(())
    }

    /// Empty the index. Must precede building a new corpus so knowledge
    /// bases never mix.
    pub fn clear(&mut self) {
        self.records.clear();
        self.ids.clear();
        self.dimension = None;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Dimensionality of the stored vectors, once the first record exists.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// The `k` most similar chunks to `query`, sorted non-increasing by
    /// cosine score. Ties keep insertion order (stable sort). An empty index
    /// or `k == 0` returns an empty result; fewer than `k` records return
    /// them all.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<Scored<'_>> {
        if k == 0 || self.records.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<Scored<'_>> = self
            .records
            .iter()
            .map(|record| Scored {
                chunk: &record.chunk,
                score: cosine_similarity(query, &record.vector),
            })
            .collect();

        // Stable: equal scores retain insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// A zero-norm operand yields 0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
