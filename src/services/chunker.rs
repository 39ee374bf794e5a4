//! Sentence-respecting text chunking.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Chunk, ChunkingConfig};

static RE_SENTENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]+").unwrap());

/// Splits raw text into bounded, sentence-respecting chunks.
///
/// Sentences end at terminal punctuation (`.`, `!`, `?`). Consecutive
/// sentences are packed greedily while the running length stays within
/// `max_chunk_size` characters; the in-progress chunk is sealed (trimmed)
/// when the next sentence would overflow, and always sealed at the end.
/// A single sentence longer than the limit is emitted as its own oversized
/// chunk rather than split mid-sentence.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    max_chunk_size: usize,
}

impl SentenceChunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            max_chunk_size: config.max_chunk_size,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&ChunkingConfig::default())
    }

    /// Chunk `text`, preserving sentence order. Empty or whitespace-only
    /// input yields no chunks; no sentence is ever dropped.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_offset = 0;

        for (sentence, offset) in split_sentences(text) {
            let sentence_len = sentence.chars().count();
            if current.is_empty() {
                current_offset = offset;
            } else if current.chars().count() + sentence_len > self.max_chunk_size {
                seal(&mut chunks, &mut current, current_offset);
                current_offset = offset;
            }
            current.push_str(sentence.trim_start());
            current.push(' ');
        }

        seal(&mut chunks, &mut current, current_offset);
        chunks
    }
}

/// Seal the in-progress chunk, skipping whitespace-only remainders.
fn seal(chunks: &mut Vec<Chunk>, current: &mut String, offset: usize) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(Chunk::new(trimmed, offset));
    }
    current.clear();
}

/// Split `text` into sentence units with the byte offset of each unit's
/// first non-whitespace character.
///
/// Text without any terminal punctuation is one sentence, and so is a
/// trailing fragment after the last terminator: reconstruction of the
/// sentence stream from chunk order must be lossless up to whitespace.
fn split_sentences(text: &str) -> Vec<(&str, usize)> {
    let mut sentences = Vec::new();
    let mut tail_start = 0;

    for m in RE_SENTENCE.find_iter(text) {
        sentences.push((m.as_str(), trimmed_offset(text, m.start())));
        tail_start = m.end();
    }

    let tail = &text[tail_start..];
    if !tail.trim().is_empty() {
        sentences.push((tail, trimmed_offset(text, tail_start)));
    }

    sentences
}

/// Byte offset of the first non-whitespace character at or after `start`.
fn trimmed_offset(text: &str, start: usize) -> usize {
    let slice = &text[start..];
    start + (slice.len() - slice.trim_start().len())
}
