mod chunk;
mod config;
mod generation;

pub use chunk::{Chunk, EmbeddingRecord, Scored};
pub use config::{
    ChunkingConfig, Config, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MAX_TOKENS, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TOP_K, GenerationConfig, RetrievalConfig,
};
pub use generation::{FinishReason, GenerationOutcome, GenerationStats, SessionState};
