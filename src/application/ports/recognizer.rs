//! Recognition engine port interface

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::session::{SessionError, SessionEvent};
use crate::domain::transcript::Segment;

/// Recognition engine errors
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Failed to start recognition: {0}")]
    StartFailed(String),

    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),

    #[error("Recognizer command not found: {0}")]
    CommandNotFound(String),

    #[error("No audio input available")]
    NoAudio,
}

/// Sink a recognition engine uses to push results and termination back into
/// the session. Events are delivered in the order they are sent; sends after
/// the session has finished are silently dropped.
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EngineEventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Deliver one batch of recognition results
    pub fn results(&self, segments: Vec<Segment>) {
        let _ = self.tx.send(SessionEvent::Results(segments));
    }

    /// Report that the engine stopped delivering results
    pub fn ended(&self) {
        let _ = self.tx.send(SessionEvent::EngineEnded);
    }

    /// Report a fatal engine fault
    pub fn faulted(&self, error: EngineError) {
        let _ = self
            .tx
            .send(SessionEvent::EngineFaulted(SessionError::Engine(
                error.to_string(),
            )));
    }
}

/// Port for a speech recognition engine.
///
/// The engine is expected to terminate on its own after a silence window
/// even when asked to listen continuously; the session treats that `ended()`
/// as a restart trigger unless a stop was requested.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Begin one listening pass, delivering events through `sink` until the
    /// engine ends or faults.
    async fn start(&self, sink: EngineEventSink) -> Result<(), EngineError>;

    /// Request a graceful stop. The engine finishes delivering in-flight
    /// results, then calls `ended()` on the sink it was started with.
    async fn stop(&self) -> Result<(), EngineError>;
}
