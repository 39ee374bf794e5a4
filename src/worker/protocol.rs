//! Typed message protocol between the caller and the extraction worker.

use serde::{Deserialize, Serialize};

/// Requests accepted by the worker. One job at a time: a second `Process`
/// before the prior job's terminal event is a caller contract violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerRequest {
    /// Load the worker's own independent model and tokenizer instances.
    Init,
    /// Run one extraction job over the given document.
    Process { content: String },
}

/// Events emitted by the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerEvent {
    /// Capabilities loaded; the worker accepts `Process` requests.
    Initialized,
    /// One extracted record accounted for; `percent` is emitted/total * 100.
    Progress { percent: f32 },
    /// Terminal success: ordered `"<heading>-<content>"` strings.
    Complete { sections: Vec<String> },
    /// Terminal failure for the current request. The worker stays alive.
    Error { message: String },
}

impl WorkerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        WorkerEvent::Error {
            message: message.into(),
        }
    }

    /// Whether this event ends a job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerEvent::Complete { .. } | WorkerEvent::Error { .. })
    }
}

/// Lifecycle of a single extraction job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Pending,
    Running,
    Complete,
    Failed,
}

/// One extraction job, tracked inside the worker.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub source_text: String,
    /// 0..=100, advanced as records are accounted for.
    pub progress: f32,
    /// Ordered labeled strings, filled on success.
    pub result_chunks: Vec<String>,
    pub state: JobState,
}

impl ExtractionJob {
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            progress: 0.0,
            result_chunks: Vec::new(),
            state: JobState::Pending,
        }
    }
}
