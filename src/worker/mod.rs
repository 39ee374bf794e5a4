//! Background extraction worker.
//!
//! A dedicated task that owns its own model and tokenizer instances, so a
//! long-running LLM-guided extraction never blocks the interactive session
//! or touches its cache feed. The only interaction is asynchronous message
//! passing; a dispatched job runs to completion, error, or channel teardown.

pub mod extraction;
pub mod protocol;

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::capabilities::ModelLoader;
use crate::error::EngineError;
use crate::models::GenerationConfig;
use crate::services::generation::GenerationController;
use crate::worker::extraction::{parse_extraction, render_extraction_prompt};
use crate::worker::protocol::{ExtractionJob, JobState, WorkerEvent, WorkerRequest};

const REQUEST_BUFFER: usize = 8;
const EVENT_BUFFER: usize = 32;

/// Caller-side handle to a spawned extraction worker.
///
/// One job at a time: the caller must not send a second `Process` before
/// the prior job's terminal event. There is no internal queueing and no
/// cross-task cancellation; retries are the caller's responsibility.
pub struct WorkerHandle {
    requests: mpsc::Sender<WorkerRequest>,
    events: mpsc::Receiver<WorkerEvent>,
}

impl WorkerHandle {
    pub async fn send(&self, request: WorkerRequest) -> Result<(), EngineError> {
        self.requests
            .send(request)
            .await
            .map_err(|_| EngineError::WorkerUnavailable)
    }

    /// Next event from the worker; `None` once the worker task is gone.
    pub async fn recv(&mut self) -> Option<WorkerEvent> {
        self.events.recv().await
    }

    /// Send `Init` and wait for the worker to load its capabilities.
    pub async fn init(&mut self) -> Result<(), EngineError> {
        self.send(WorkerRequest::Init).await?;
        match self.recv().await {
            Some(WorkerEvent::Initialized) => Ok(()),
            Some(WorkerEvent::Error { message }) => Err(EngineError::Extraction(message)),
            Some(other) => Err(EngineError::Extraction(format!(
                "unexpected event during init: {other:?}"
            ))),
            None => Err(EngineError::WorkerUnavailable),
        }
    }

    /// Run one extraction job to its terminal event, forwarding progress
    /// percentages to `on_progress`.
    pub async fn process(
        &mut self,
        content: &str,
        mut on_progress: impl FnMut(f32),
    ) -> Result<Vec<String>, EngineError> {
        self.send(WorkerRequest::Process {
            content: content.to_string(),
        })
        .await?;

        loop {
            match self.recv().await {
                Some(WorkerEvent::Progress { percent }) => on_progress(percent),
                Some(WorkerEvent::Complete { sections }) => return Ok(sections),
                Some(WorkerEvent::Error { message }) => {
                    return Err(EngineError::Extraction(message));
                }
                Some(WorkerEvent::Initialized) => {
                    return Err(EngineError::Extraction(
                        "unexpected init event during job".to_string(),
                    ));
                }
                None => return Err(EngineError::WorkerUnavailable),
            }
        }
    }
}

/// Spawn the worker task. Capabilities are not loaded until the caller
/// sends `Init`.
pub fn spawn(loader: Arc<dyn ModelLoader>, options: GenerationConfig) -> WorkerHandle {
    let (request_tx, request_rx) = mpsc::channel(REQUEST_BUFFER);
    let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

    tokio::spawn(run(loader, options, request_rx, event_tx));

    WorkerHandle {
        requests: request_tx,
        events: event_rx,
    }
}

async fn run(
    loader: Arc<dyn ModelLoader>,
    options: GenerationConfig,
    mut requests: mpsc::Receiver<WorkerRequest>,
    events: mpsc::Sender<WorkerEvent>,
) {
    let mut controller: Option<GenerationController> = None;

    while let Some(request) = requests.recv().await {
        match request {
            WorkerRequest::Init => match loader.load().await {
                Ok(backend) => {
                    controller = Some(GenerationController::new(
                        backend.tokenizer,
                        backend.model,
                        options.clone(),
                    ));
                    info!("extraction worker initialized");
                    if events.send(WorkerEvent::Initialized).await.is_err() {
                        return;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "extraction worker failed to initialize");
                    if events.send(WorkerEvent::error(err.to_string())).await.is_err() {
                        return;
                    }
                }
            },
            WorkerRequest::Process { content } => {
                let Some(controller) = controller.as_mut() else {
                    if events
                        .send(WorkerEvent::error("worker not initialized"))
                        .await
                        .is_err()
                    {
                        return;
                    }
                    continue;
                };

                let mut job = ExtractionJob::new(content);
                if run_job(controller, &mut job, &events).await.is_err() {
                    // Event channel closed; the caller is gone.
                    return;
                }
                debug!(state = ?job.state, chunks = job.result_chunks.len(), "extraction job done");
            }
        }
    }
}

/// Drive one job from Pending to a terminal state, emitting protocol
/// events. `Err` only when the event channel is closed.
async fn run_job(
    controller: &mut GenerationController,
    job: &mut ExtractionJob,
    events: &mpsc::Sender<WorkerEvent>,
) -> Result<(), ()> {
    job.state = JobState::Running;

    // One full generation pass; incremental output stays inside the worker.
    let prompt = render_extraction_prompt(&job.source_text);
    let outcome = match controller.generate(&prompt, |_| {}).await {
        Ok(outcome) => outcome,
        Err(err) => {
            job.state = JobState::Failed;
            return send(events, WorkerEvent::error(err.to_string())).await;
        }
    };

    let sections = match parse_extraction(&outcome.text) {
        Ok(sections) => sections,
        Err(err) => {
            job.state = JobState::Failed;
            return send(events, WorkerEvent::error(err.to_string())).await;
        }
    };

    let total = sections.len();
    for (emitted, section) in sections.iter().enumerate() {
        job.result_chunks.push(section.labeled());
        job.progress = (emitted + 1) as f32 / total as f32 * 100.0;
        send(
            events,
            WorkerEvent::Progress {
                percent: job.progress,
            },
        )
        .await?;
    }

    job.state = JobState::Complete;
    send(
        events,
        WorkerEvent::Complete {
            sections: job.result_chunks.clone(),
        },
    )
    .await
}

async fn send(events: &mpsc::Sender<WorkerEvent>, event: WorkerEvent) -> Result<(), ()> {
    events.send(event).await.map_err(|_| ())
}
