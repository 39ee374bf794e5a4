//! Streaming token generation with cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::debug;

use crate::capabilities::{ModelSession, StepOutcome, Tokenizer};
use crate::error::EngineError;
use crate::models::{
    FinishReason, GenerationConfig, GenerationOutcome, GenerationStats, SessionState,
};

/// Incremental updates delivered to the single session subscriber.
///
/// A session emits `Started`, zero or more `Delta`s, then exactly one
/// `Finished` terminal event. A failed session is the one exception: its
/// terminal signal is the `Err` returned from
/// [`GenerationController::generate`], and no `Finished` is emitted. Each
/// `Delta` carries the full rendered output so far (the decoded suffix past
/// the input boundary), never an increment.
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    Started { prompt_tokens: usize },
    Delta(String),
    Finished(FinishReason),
}

/// Cloneable cancellation handle for the active generation session.
///
/// Aborting takes effect at the next token boundary only; the text already
/// delivered stands as final. The handle is re-armed when a new session
/// starts, so an abort signalled between sessions is dropped.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn rearm(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Drives one streaming generation session at a time.
///
/// State machine: `Idle -> Prompting -> Streaming -> terminal`; a new
/// session may be submitted from any terminal state.
/// The controller exclusively owns the model's cache feed; the feed is reset
/// when a session starts and again on every exit path, so no session ever
/// observes another session's state.
pub struct GenerationController {
    tokenizer: Arc<dyn Tokenizer>,
    model: Box<dyn ModelSession>,
    options: GenerationConfig,
    state: SessionState,
    abort: AbortHandle,
}

impl GenerationController {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        model: Box<dyn ModelSession>,
        options: GenerationConfig,
    ) -> Self {
        Self {
            tokenizer,
            model,
            options,
            state: SessionState::Idle,
            abort: AbortHandle::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Run one full session over an already-rendered prompt, delivering
    /// events to `subscriber` until the terminal event.
    ///
    /// Tokenizer or model failures end the session as Failed and surface as
    /// an error; cancellation is a successful outcome with
    /// [`FinishReason::Cancelled`].
    pub async fn generate(
        &mut self,
        prompt: &str,
        mut subscriber: impl FnMut(GenerationEvent),
    ) -> Result<GenerationOutcome, EngineError> {
        if matches!(self.state, SessionState::Prompting | SessionState::Streaming) {
            return Err(EngineError::SessionBusy);
        }

        // Terminal -> Idle -> Prompting; the abort flag is re-armed so a
        // stale signal from between sessions cannot cancel this one.
        self.state = SessionState::Prompting;
        self.abort.rearm();

        let result = self.run_session(prompt, &mut subscriber).await;

        // The cache feed must end fully reset on every path, success or not.
        self.model.reset_cache();

        match result {
            Ok(outcome) => {
                self.state = match outcome.finish {
                    FinishReason::Cancelled => SessionState::Cancelled,
                    _ => SessionState::Completed,
                };
                subscriber(GenerationEvent::Finished(outcome.finish));
                debug!(
                    finish = ?outcome.finish,
                    generated = outcome.stats.generated_tokens,
                    tokens_per_sec = outcome.stats.tokens_per_sec,
                    "generation session finished"
                );
                Ok(outcome)
            }
            Err(err) => {
                self.state = SessionState::Failed;
                debug!(error = %err, "generation session failed");
                Err(err)
            }
        }
    }

    async fn run_session(
        &mut self,
        prompt: &str,
        subscriber: &mut impl FnMut(GenerationEvent),
    ) -> Result<GenerationOutcome, EngineError> {
        let start = Instant::now();

        let prompt_tokens = self.tokenizer.encode(prompt).await?;
        let input_boundary = prompt_tokens.len();

        // Discard any prior session's cache state before the first step.
        self.model.reset_cache();
        self.state = SessionState::Streaming;
        subscriber(GenerationEvent::Started {
            prompt_tokens: input_boundary,
        });

        // Append-only output buffer: prompt tokens, then generated tokens.
        let mut output = prompt_tokens;
        let mut time_to_first_token = None;
        let mut rendered = String::new();
        let mut finish = FinishReason::Stop;

        if self.abort.is_aborted() {
            finish = FinishReason::Cancelled;
        } else {
            let mut next = self.model.step(&output).await?;

            loop {
                let token = match next {
                    StepOutcome::Stop => break,
                    StepOutcome::Token(token) => token,
                };

                output.push(token);
                if time_to_first_token.is_none() {
                    time_to_first_token = Some(start.elapsed());
                }

                rendered = self.decode_suffix(&output, input_boundary).await?;
                subscriber(GenerationEvent::Delta(rendered.clone()));

                // Token boundary: the only place cancellation takes effect.
                if self.abort.is_aborted() {
                    finish = FinishReason::Cancelled;
                    break;
                }
                if output.len() - input_boundary >= self.options.max_tokens {
                    finish = FinishReason::MaxTokens;
                    break;
                }

                next = self.model.step(&[token]).await?;
            }
        }

        if finish != FinishReason::Cancelled {
            // One final decode over the complete buffer, so the subscriber
            // never ends on a stale incremental render.
            rendered = self.decode_suffix(&output, input_boundary).await?;
            subscriber(GenerationEvent::Delta(rendered.clone()));
        }

        let duration = start.elapsed();
        let generated_tokens = output.len() - input_boundary;
        let tokens_per_sec = if duration.as_secs_f64() > 0.0 {
            generated_tokens as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Ok(GenerationOutcome {
            text: rendered,
            finish,
            stats: GenerationStats {
                prompt_tokens: input_boundary,
                generated_tokens,
                time_to_first_token,
                duration,
                tokens_per_sec,
            },
        })
    }

    async fn decode_suffix(&self, output: &[u32], boundary: usize) -> Result<String, EngineError> {
        let text = self
            .tokenizer
            .decode(&output[boundary..], self.options.skip_special)
            .await?;
        Ok(text)
    }
}
