mod chunker;
pub(crate) mod context;
mod engine;
pub(crate) mod generation;
mod index;

pub use chunker::SentenceChunker;
pub use context::{assemble_context, render_chat_prompt, render_continuation_prompt};
pub use engine::RagEngine;
pub use generation::{AbortHandle, GenerationController, GenerationEvent};
pub use index::{SimilarityIndex, cosine_similarity};
