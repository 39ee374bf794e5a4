//! Trait seams for the external capabilities the engine consumes.
//!
//! Tokenizer internals, the model forward pass, embedding inference, and PDF
//! text extraction all live behind these traits. Every method is async so the
//! cooperative control path suspends at each tokenizer and per-step model call.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CapabilityError;

/// Deterministic text/token-id conversion.
#[async_trait]
pub trait Tokenizer: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<u32>, CapabilityError>;

    /// Decode token ids back to text. `skip_special` drops special tokens
    /// (end-of-turn markers and the like) from the rendered output.
    async fn decode(&self, tokens: &[u32], skip_special: bool) -> Result<String, CapabilityError>;
}

/// Text to fixed-length vector. Dimensionality is fixed per loaded model.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError>;
}

/// Result of a single model step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The model produced the next token id.
    Token(u32),
    /// The model hit a natural stop (end-of-sequence).
    Stop,
}

/// Incremental next-token computation over an opaque cache feed.
///
/// The cache feed is exclusively owned by the active generation session:
/// it must be reset before a new session starts and is never shared.
#[async_trait]
pub trait ModelSession: Send + Sync {
    /// Discard all cached state from prior sessions.
    fn reset_cache(&mut self);

    /// Feed a token sequence (the full prompt on the first call, the single
    /// previous token afterwards) and compute the next token.
    async fn step(&mut self, tokens: &[u32]) -> Result<StepOutcome, CapabilityError>;
}

/// PDF file to plain text.
#[async_trait]
pub trait PdfExtractor: Send + Sync {
    async fn extract(&self, data: &[u8]) -> Result<String, CapabilityError>;
}

/// A tokenizer/model pair ready for generation.
pub struct GenerationBackend {
    pub tokenizer: Arc<dyn Tokenizer>,
    pub model: Box<dyn ModelSession>,
}

/// Loads independent tokenizer/model instances.
///
/// The extraction worker uses this to build its own capabilities inside its
/// isolated task, so a long-running job never contends with the interactive
/// session for the cache feed.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<GenerationBackend, CapabilityError>;
}
