//! The engine facade owning the retrieval and generation state.

use std::sync::Arc;
use tracing::{debug, info};

use crate::capabilities::{Embedder, ModelSession, PdfExtractor, Tokenizer};
use crate::error::{CapabilityError, EngineError, InputError};
use crate::models::{Chunk, Config, GenerationOutcome};
use crate::services::chunker::SentenceChunker;
use crate::services::context::{assemble_context, render_chat_prompt, render_continuation_prompt};
use crate::services::generation::{AbortHandle, GenerationController, GenerationEvent};
use crate::services::index::SimilarityIndex;

/// Explicit context object for one knowledge session: owns the similarity
/// index, the embedder handle, the generation controller, and the prior
/// rendered output used for continuations.
///
/// Corpus processing (`process_text`/`process_pdf`/`clear`) and query
/// serving are not interleaved; `&mut` access serializes them.
pub struct RagEngine {
    config: Config,
    chunker: SentenceChunker,
    embedder: Arc<dyn Embedder>,
    pdf_extractor: Option<Arc<dyn PdfExtractor>>,
    index: SimilarityIndex,
    controller: GenerationController,
    last_rendered: Option<String>,
}

impl RagEngine {
    pub fn new(
        config: Config,
        embedder: Arc<dyn Embedder>,
        tokenizer: Arc<dyn Tokenizer>,
        model: Box<dyn ModelSession>,
    ) -> Self {
        let chunker = SentenceChunker::new(&config.chunking);
        let controller = GenerationController::new(tokenizer, model, config.generation.clone());
        Self {
            config,
            chunker,
            embedder,
            pdf_extractor: None,
            index: SimilarityIndex::new(),
            controller,
            last_rendered: None,
        }
    }

    pub fn with_pdf_extractor(mut self, extractor: Arc<dyn PdfExtractor>) -> Self {
        self.pdf_extractor = Some(extractor);
        self
    }

    /// Number of chunks currently indexed.
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    /// Cloneable handle that cancels the active generation session at the
    /// next token boundary.
    pub fn abort_handle(&self) -> AbortHandle {
        self.controller.abort_handle()
    }

    /// Chunk `text`, embed every chunk, and add the records to the index.
    /// Returns the number of chunks added.
    ///
    /// Embeddings are staged before any record is committed, so a failing
    /// embedder call leaves the index exactly as it was.
    pub async fn process_text(&mut self, text: &str) -> Result<usize, EngineError> {
        if text.trim().is_empty() {
            return Err(InputError::EmptyDocument.into());
        }

        let chunks = self.chunker.chunk(text);

        let mut staged: Vec<(Chunk, Vec<f32>)> = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = self.embedder.embed(&chunk.text).await?;
            staged.push((chunk, vector));
        }

        let added = staged.len();
        for (chunk, vector) in staged {
            self.index.add(chunk, vector)?;
        }

        info!(chunks = added, total = self.index.len(), "corpus processed");
        Ok(added)
    }

    /// Extract plain text from a PDF and index it.
    pub async fn process_pdf(&mut self, data: &[u8]) -> Result<usize, EngineError> {
        let extractor = self.pdf_extractor.clone().ok_or_else(|| {
            CapabilityError::PdfExtract("no PDF extractor configured".to_string())
        })?;
        let text = extractor.extract(data).await?;
        self.process_text(&text).await
    }

    /// Drop every indexed record and the continuation context. Must be
    /// called before building a new knowledge base.
    pub fn clear(&mut self) {
        self.index.clear();
        self.last_rendered = None;
        info!("knowledge base cleared");
    }

    /// Run one streaming query.
    ///
    /// Fresh queries are wrapped in the chat template, with top-k retrieval
    /// context inserted into the system segment when the index is non-empty.
    /// With `continuation`, the immediately-prior rendered output is
    /// prefixed exactly once and no template is applied. `on_token` receives
    /// the rendered output so far on every emission.
    pub async fn query(
        &mut self,
        text: &str,
        continuation: bool,
        mut on_token: impl FnMut(&str),
    ) -> Result<GenerationOutcome, EngineError> {
        let input = text.trim();
        if input.is_empty() {
            return Err(InputError::EmptyQuery.into());
        }

        let prompt = match (&self.last_rendered, continuation) {
            (Some(prior), true) => render_continuation_prompt(prior, input),
            _ => {
                let context = self.retrieve_context(input).await?;
                render_chat_prompt(
                    &self.config.generation.system_prompt,
                    context.as_deref(),
                    input,
                )
            }
        };

        let outcome = self
            .controller
            .generate(&prompt, |event| {
                if let GenerationEvent::Delta(text) = event {
                    on_token(&text);
                }
            })
            .await?;

        // The rendered output becomes the continuation context, replacing
        // (never stacking onto) the previous one.
        self.last_rendered = Some(outcome.text.clone());
        Ok(outcome)
    }

    /// Embed the query and assemble the top-k retrieval context. `None`
    /// when the index is empty.
    async fn retrieve_context(&self, query: &str) -> Result<Option<String>, EngineError> {
        if self.index.is_empty() {
            return Ok(None);
        }

        let query_vector = self.embedder.embed(query).await?;
        let retrieved = self.index.top_k(&query_vector, self.config.retrieval.top_k);
        debug!(
            retrieved = retrieved.len(),
            best_score = retrieved.first().map(|s| s.score),
            "retrieval complete"
        );
        Ok(Some(assemble_context(&retrieved)))
    }
}
