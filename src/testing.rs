//! Deterministic capability fakes for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::capabilities::{
    Embedder, GenerationBackend, ModelLoader, ModelSession, PdfExtractor, StepOutcome, Tokenizer,
};
use crate::error::CapabilityError;

/// Tokenizer where every token id is a byte value. Ids at or above 256 are
/// treated as special tokens.
pub struct ByteTokenizer;

#[async_trait]
impl Tokenizer for ByteTokenizer {
    async fn encode(&self, text: &str) -> Result<Vec<u32>, CapabilityError> {
        Ok(text.bytes().map(u32::from).collect())
    }

    async fn decode(&self, tokens: &[u32], skip_special: bool) -> Result<String, CapabilityError> {
        let bytes: Vec<u8> = tokens
            .iter()
            .filter_map(|&t| {
                if t < 256 {
                    Some(t as u8)
                } else if skip_special {
                    None
                } else {
                    Some(b'?')
                }
            })
            .collect();
        String::from_utf8(bytes).map_err(|e| CapabilityError::Tokenizer(e.to_string()))
    }
}

/// Tokenizer that always fails, for exercising the Failed path.
pub struct FailingTokenizer;

#[async_trait]
impl Tokenizer for FailingTokenizer {
    async fn encode(&self, _text: &str) -> Result<Vec<u32>, CapabilityError> {
        Err(CapabilityError::Tokenizer("scripted encode failure".into()))
    }

    async fn decode(&self, _tokens: &[u32], _skip_special: bool) -> Result<String, CapabilityError> {
        Err(CapabilityError::Tokenizer("scripted decode failure".into()))
    }
}

/// Observable side of a [`ScriptedModel`] after it moves into a controller.
#[derive(Clone, Default)]
pub struct ScriptLog {
    prompts: Arc<Mutex<Vec<Vec<u32>>>>,
    resets: Arc<AtomicUsize>,
}

impl ScriptLog {
    /// Prompt token sequences fed as prefill, decoded as bytes.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|tokens| {
                String::from_utf8(tokens.iter().map(|&t| t as u8).collect()).unwrap_or_default()
            })
            .collect()
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

/// Model that replays fixed byte scripts, one token per step, one script per
/// session, then stops.
pub struct ScriptedModel {
    sessions: VecDeque<Vec<StepOutcome>>,
    current: VecDeque<StepOutcome>,
    log: ScriptLog,
    primed: bool,
}

impl ScriptedModel {
    /// Emit each byte of `output` as one token, then a natural stop.
    pub fn new(output: &str) -> (Self, ScriptLog) {
        Self::with_outputs(&[output])
    }

    /// One scripted output per session; sessions beyond the script stop
    /// immediately.
    pub fn with_outputs(outputs: &[&str]) -> (Self, ScriptLog) {
        let sessions = outputs
            .iter()
            .map(|output| {
                output
                    .bytes()
                    .map(|b| StepOutcome::Token(u32::from(b)))
                    .collect()
            })
            .collect();
        let log = ScriptLog::default();
        (
            Self {
                sessions,
                current: VecDeque::new(),
                log: log.clone(),
                primed: false,
            },
            log,
        )
    }
}

#[async_trait]
impl ModelSession for ScriptedModel {
    fn reset_cache(&mut self) {
        self.log.resets.fetch_add(1, Ordering::SeqCst);
        self.primed = false;
    }

    async fn step(&mut self, tokens: &[u32]) -> Result<StepOutcome, CapabilityError> {
        if !self.primed {
            self.log.prompts.lock().unwrap().push(tokens.to_vec());
            self.current = self.sessions.pop_front().unwrap_or_default().into();
            self.primed = true;
        }
        Ok(self.current.pop_front().unwrap_or(StepOutcome::Stop))
    }
}

/// Model whose steps always fail.
pub struct FailingModel;

#[async_trait]
impl ModelSession for FailingModel {
    fn reset_cache(&mut self) {}

    async fn step(&mut self, _tokens: &[u32]) -> Result<StepOutcome, CapabilityError> {
        Err(CapabilityError::Model("scripted step failure".into()))
    }
}

/// Embedder that counts keyword occurrences, one dimension per keyword.
pub struct KeywordEmbedder {
    keywords: Vec<String>,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn dimension(&self) -> usize {
        self.keywords.len()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        let lowered = text.to_lowercase();
        Ok(self
            .keywords
            .iter()
            .map(|k| lowered.matches(k.as_str()).count() as f32)
            .collect())
    }
}

/// Embedder that fails when the text contains a marker substring.
pub struct FailingEmbedder {
    inner: KeywordEmbedder,
    marker: String,
}

impl FailingEmbedder {
    pub fn new(keywords: &[&str], marker: &str) -> Self {
        Self {
            inner: KeywordEmbedder::new(keywords),
            marker: marker.to_string(),
        }
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        if text.contains(&self.marker) {
            return Err(CapabilityError::Embedder("scripted embed failure".into()));
        }
        self.inner.embed(text).await
    }
}

/// PDF extractor that returns a fixed text.
pub struct StaticPdfExtractor {
    pub text: String,
}

#[async_trait]
impl PdfExtractor for StaticPdfExtractor {
    async fn extract(&self, _data: &[u8]) -> Result<String, CapabilityError> {
        Ok(self.text.clone())
    }
}

/// Loader producing a byte tokenizer plus a scripted model, for worker tests.
pub struct ScriptedLoader {
    outputs: Vec<String>,
}

impl ScriptedLoader {
    /// One scripted model output per extraction job.
    pub fn with_outputs(outputs: &[&str]) -> Self {
        Self {
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ModelLoader for ScriptedLoader {
    async fn load(&self) -> Result<GenerationBackend, CapabilityError> {
        let refs: Vec<&str> = self.outputs.iter().map(String::as_str).collect();
        let (model, _log) = ScriptedModel::with_outputs(&refs);
        Ok(GenerationBackend {
            tokenizer: Arc::new(ByteTokenizer),
            model: Box::new(model),
        })
    }
}

/// Loader that always fails, for init-failure tests.
pub struct FailingLoader;

#[async_trait]
impl ModelLoader for FailingLoader {
    async fn load(&self) -> Result<GenerationBackend, CapabilityError> {
        Err(CapabilityError::ModelLoad("scripted load failure".into()))
    }
}
