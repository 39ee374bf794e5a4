//! Retrieval-augmented chat engine.
//!
//! Turns text/PDF-derived corpora into a searchable in-memory embedding
//! index, retrieves relevant chunks for a query, and drives a streaming
//! token-generation session against a locally-hosted language model with
//! cancellation and continuation semantics. Tokenizer, embedder, model,
//! and PDF extraction are consumed through the [`capabilities`] traits.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use ragchat::{Config, RagEngine};
//! # async fn example(
//! #     embedder: Arc<dyn ragchat::capabilities::Embedder>,
//! #     tokenizer: Arc<dyn ragchat::capabilities::Tokenizer>,
//! #     model: Box<dyn ragchat::capabilities::ModelSession>,
//! # ) -> Result<(), ragchat::EngineError> {
//! let mut engine = RagEngine::new(Config::default(), embedder, tokenizer, model);
//! engine.process_text("The sky is blue. Grass is green.").await?;
//! engine
//!     .query("what color is the sky?", false, |text| print!("\r{text}"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod capabilities;
pub mod error;
pub mod models;
pub mod services;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use error::EngineError;
pub use models::{Config, FinishReason, GenerationOutcome, GenerationStats, SessionState};
pub use services::{AbortHandle, GenerationEvent, RagEngine, SentenceChunker, SimilarityIndex};
pub use worker::{WorkerHandle, spawn as spawn_extraction_worker};
pub use worker::protocol::{JobState, WorkerEvent, WorkerRequest};
