//! Error types for the retrieval-augmented chat engine.

use thiserror::Error;

/// Errors caused by invalid caller input. Surfaced immediately,
/// before any external capability is touched.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("empty query")]
    EmptyQuery,

    #[error("empty document")]
    EmptyDocument,

    #[error("invalid input: {0}")]
    Invalid(String),
}

/// Failures of an external capability (tokenizer, embedder, model
/// session, PDF extractor). Never retried automatically.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("embedder error: {0}")]
    Embedder(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("pdf extraction error: {0}")]
    PdfExtract(String),

    #[error("model load error: {0}")]
    ModelLoad(String),
}

/// Errors related to the similarity index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("duplicate chunk id: {0}")]
    DuplicateChunk(uuid::Uuid),

    #[error("dimension mismatch: index holds {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors from decoding structured model output in the extraction worker.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("model output contains no JSON array")]
    MissingArray,

    #[error("unterminated JSON array in model output")]
    UnterminatedArray,

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("extraction produced no sections")]
    Empty,
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Engine-level errors that wrap domain errors.
///
/// Cancellation is deliberately absent: an aborted session is a successful
/// outcome with [`FinishReason::Cancelled`](crate::models::FinishReason).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("session busy: a generation session is already streaming")]
    SessionBusy,

    #[error("extraction job failed: {0}")]
    Extraction(String),

    #[error("extraction worker is gone")]
    WorkerUnavailable,
}
