//! Retrieval unit models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded span of source text, the atomic retrieval unit.
///
/// Immutable once created; owned by the similarity index for the life of a
/// knowledge session and destroyed on `clear()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique id within one index build.
    pub id: Uuid,

    /// Whitespace-trimmed chunk text.
    pub text: String,

    /// Byte offset of the chunk's first character in the source text.
    pub source_offset: usize,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source_offset: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            source_offset,
        }
    }
}

/// A chunk paired with its embedding vector. Never mutated after creation.
///
/// All records in one index share the same vector dimensionality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A retrieved chunk with its similarity score against the query.
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}
