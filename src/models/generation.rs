//! Generation session models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle of a generation session.
///
/// `Idle -> Prompting -> Streaming -> {Completed | Cancelled | Failed}`; a
/// new session restarts the cycle from any terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Prompting,
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    /// Whether the session has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Failed
        )
    }
}

/// Why a session stopped emitting tokens.
///
/// Cancellation is a deliberate terminal transition, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model hit a natural stop.
    Stop,
    /// The caller aborted at a token boundary.
    Cancelled,
    /// The configured token budget ran out.
    MaxTokens,
}

/// Timing and throughput derived from output buffer growth.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Tokens in the rendered prompt (everything before the input boundary).
    pub prompt_tokens: usize,

    /// Tokens emitted past the input boundary.
    pub generated_tokens: usize,

    /// Time from session start to the first emission past the input boundary.
    pub time_to_first_token: Option<Duration>,

    /// Total session duration.
    pub duration: Duration,

    /// Generated tokens divided by session duration.
    pub tokens_per_sec: f64,
}

/// Final result of a generation session.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// The complete rendered output (suffix past the input boundary).
    pub text: String,

    pub finish: FinishReason,

    pub stats: GenerationStats,
}
