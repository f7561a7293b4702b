//! Capture session state machine

use std::fmt;
use thiserror::Error;

use crate::domain::transcript::{Segment, TranscriptAggregator};

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Listening,
    Restarting,
    Stopping,
    AwaitingAnswer,
    Completed,
    Failed,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Restarting => "restarting",
            Self::Stopping => "stopping",
            Self::AwaitingAnswer => "awaiting-answer",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether the session has finished (successfully or not)
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classified failure kinds carried by a failed session
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Speech recognition is not available on this system")]
    CapabilityMissing,

    #[error("Recognition engine failed: {0}")]
    Engine(String),

    #[error("Failed to get answer: {0}")]
    Dispatch(String),
}

/// Error when an intent is not valid in the current state
#[derive(Debug, Clone, Error)]
pub enum IntentError {
    #[error("Invalid intent: cannot {intent} while in {current_state} state")]
    Busy {
        current_state: SessionState,
        intent: &'static str,
    },

    #[error("Transcript is empty")]
    EmptyTranscript,
}

/// Inputs to the state machine.
///
/// Every external stimulus (engine callback, user intent, dispatch outcome)
/// is dispatched into the session as one of these, so transitions are total
/// functions of (state, event).
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The engine confirmed it is listening (initial start or restart)
    EngineStarted,
    /// One batch of recognition results, in arrival order
    Results(Vec<Segment>),
    /// The engine stopped on its own (silence timeout) or after a stop request
    EngineEnded,
    /// The engine hit a fatal fault
    EngineFaulted(SessionError),
    /// The user asked to finish the session
    StopRequested,
    /// The answer call resolved
    AnswerArrived(String),
    /// The answer call failed
    AnswerFailed(SessionError),
}

/// Work the orchestrator must carry out after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start the engine again for a transparent restart
    RestartEngine,
    /// Ask the engine to stop delivering results
    StopEngine,
    /// Hand the finalized utterance to the answer dispatcher
    Dispatch(String),
}

/// Capture session entity.
/// Owns one listening episode from start intent to terminal state.
///
/// State machine:
///   IDLE -> LISTENING (engine started)
///   LISTENING -> RESTARTING (engine ended, stop not requested)
///   LISTENING -> STOPPING (stop requested)
///   RESTARTING -> LISTENING (engine restarted)
///   STOPPING -> AWAITING_ANSWER (engine confirmed stopped, finalized text present)
///   STOPPING -> COMPLETED (engine confirmed stopped, nothing captured)
///   AWAITING_ANSWER -> COMPLETED / FAILED (dispatch resolved / failed)
///
/// The stop-requested flag is scoped to this session record: it is set only
/// by the stop intent and checked on each termination event, so an
/// engine-initiated end restarts transparently while a user-initiated end
/// proceeds to a real shutdown.
#[derive(Debug, Default)]
pub struct CaptureSession {
    state: SessionState,
    stop_requested: bool,
    transcript: TranscriptAggregator,
    answer: Option<String>,
    error: Option<SessionError>,
}

impl CaptureSession {
    /// Create a new session in idle state with a fresh transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session already awaiting an answer for manually entered text.
    /// Used by the manual-submission path, which bypasses capture entirely.
    pub fn for_manual(text: &str) -> Self {
        let mut session = Self::new();
        session.transcript.ingest(&Segment::finalized(0, text));
        session.state = SessionState::AwaitingAnswer;
        session
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a capture or dispatch is still in flight
    pub fn is_active(&self) -> bool {
        !matches!(self.state, SessionState::Idle) && !self.state.is_terminal()
    }

    /// Whether the user has requested a stop
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// The live transcript view
    pub fn snapshot(&self) -> String {
        self.transcript.snapshot()
    }

    /// The finalized utterance, trimmed
    pub fn final_text(&self) -> String {
        self.transcript.final_text()
    }

    /// The answer, once the session completed with one
    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// The failure, once the session failed
    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Replace the provisional transcript tail (manual editing)
    pub fn override_provisional(&mut self, text: &str) {
        self.transcript.set_provisional(text);
    }

    /// Apply one event and return the effects the caller must execute.
    ///
    /// Transitions are exhaustive over (state, event); anything not listed
    /// below is deliberately ignored so late engine callbacks cannot disturb
    /// a session that has already moved on.
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        use SessionEvent::*;
        use SessionState::*;

        match (self.state, event) {
            // Engine came up: initial start or completed restart.
            (Idle | Restarting, EngineStarted) => {
                self.state = Listening;
                vec![]
            }
            // A restart that lost the race against stop: shut it back down.
            (Stopping | AwaitingAnswer | Completed | Failed, EngineStarted) => {
                vec![Effect::StopEngine]
            }
            (Listening, EngineStarted) => vec![],

            // Results are accepted until capture is over. The aggregator's
            // sequence guard drops redeliveries after a restart.
            (Listening | Restarting | Stopping, Results(segments)) => {
                for segment in &segments {
                    self.transcript.ingest(segment);
                }
                vec![]
            }
            (_, Results(_)) => vec![],

            // Termination: the stop flag decides restart vs. real shutdown.
            (Listening | Restarting, EngineEnded) => {
                if self.stop_requested {
                    self.finish()
                } else {
                    self.state = Restarting;
                    vec![Effect::RestartEngine]
                }
            }
            (Stopping, EngineEnded) => self.finish(),
            (_, EngineEnded) => vec![],

            (Listening, StopRequested) => {
                self.stop_requested = true;
                self.state = Stopping;
                vec![Effect::StopEngine]
            }
            // Between restarts the engine is down, so there is nothing to
            // stop and no termination event to wait for: finish directly.
            (Restarting, StopRequested) => {
                self.stop_requested = true;
                self.finish()
            }
            (_, StopRequested) => vec![],

            (Idle | Listening | Restarting | Stopping, EngineFaulted(error)) => {
                self.fail(error);
                vec![]
            }
            (_, EngineFaulted(_)) => vec![],

            (AwaitingAnswer, AnswerArrived(text)) => {
                self.answer = Some(text);
                self.state = Completed;
                vec![]
            }
            (AwaitingAnswer, AnswerFailed(error)) => {
                self.fail(error);
                vec![]
            }
            (_, AnswerArrived(_)) | (_, AnswerFailed(_)) => vec![],
        }
    }

    /// The engine is down for good: dispatch if anything was captured.
    fn finish(&mut self) -> Vec<Effect> {
        if self.transcript.has_final_text() {
            self.state = SessionState::AwaitingAnswer;
            vec![Effect::Dispatch(self.transcript.final_text())]
        } else {
            self.state = SessionState::Completed;
            vec![]
        }
    }

    fn fail(&mut self, error: SessionError) {
        self.error = Some(error);
        self.state = SessionState::Failed;
    }
}
