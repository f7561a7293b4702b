//! Interactive stdin recognizer adapter

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::application::ports::{EngineError, EngineEventSink, SpeechRecognizer};
use crate::domain::transcript::Segment;

/// Reads typed lines as finalized speech segments.
///
/// Stands in for a microphone engine in environments without one: every
/// non-empty line is a final segment, and a blank line plays the role of the
/// engine's silence timeout (the session restarts the pass transparently).
/// A closed stdin is a fault, since no further input can ever arrive.
pub struct StdinRecognizer {
    task: StdMutex<Option<JoinHandle<()>>>,
    sink: StdMutex<Option<EngineEventSink>>,
    next_sequence: Arc<AtomicU64>,
}

impl StdinRecognizer {
    /// Create a stdin recognizer
    pub fn new() -> Self {
        Self {
            task: StdMutex::new(None),
            sink: StdMutex::new(None),
            next_sequence: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Default for StdinRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechRecognizer for StdinRecognizer {
    async fn start(&self, sink: EngineEventSink) -> Result<(), EngineError> {
        {
            let task = self.task.lock().unwrap_or_else(|e| e.into_inner());
            if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
                return Err(EngineError::StartFailed(
                    "Recognition already in progress".to_string(),
                ));
            }
        }

        *self.sink.lock().unwrap_or_else(|e| e.into_inner()) = Some(sink.clone());

        let next_sequence = Arc::clone(&self.next_sequence);
        let handle = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            // Blank line: simulated silence timeout.
                            sink.ended();
                            break;
                        }
                        let sequence = next_sequence.fetch_add(1, Ordering::SeqCst);
                        sink.results(vec![Segment::finalized(sequence, line)]);
                    }
                    Ok(None) => {
                        sink.faulted(EngineError::NoAudio);
                        break;
                    }
                    Err(e) => {
                        sink.faulted(EngineError::RecognitionFailed(e.to_string()));
                        break;
                    }
                }
            }
        });

        *self.task.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        if let Some(handle) = self
            .task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
        // The aborted reader cannot confirm the stop itself.
        let sink = self.sink.lock().unwrap_or_else(|e| e.into_inner()).clone();
        if let Some(sink) = sink {
            sink.ended();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionEvent;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn stop_before_start_is_a_noop() {
        let recognizer = StdinRecognizer::new();
        assert!(recognizer.stop().await.is_ok());
    }

    #[tokio::test]
    async fn stop_confirms_with_ended() {
        let recognizer = StdinRecognizer::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        recognizer.start(EngineEventSink::new(tx)).await.unwrap();
        recognizer.stop().await.unwrap();

        assert!(matches!(rx.recv().await, Some(SessionEvent::EngineEnded)));
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let recognizer = StdinRecognizer::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        recognizer.start(EngineEventSink::new(tx.clone())).await.unwrap();

        let result = recognizer.start(EngineEventSink::new(tx)).await;
        assert!(matches!(result, Err(EngineError::StartFailed(_))));

        recognizer.stop().await.unwrap();
    }
}
