//! Session orchestration use case

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::domain::session::{
    CaptureSession, Effect, IntentError, SessionError, SessionEvent, SessionState,
};

use super::ports::{
    AnswerDispatcher, CredentialSource, DispatchError, EngineEventSink, SpeechRecognizer,
};

/// Events surfaced to the UI layer.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// The session moved to a new state
    StateChanged(SessionState),
    /// The live transcript view changed
    TranscriptChanged(String),
    /// The session completed with an answer
    AnswerReady(String),
    /// The session failed with a classified error
    SessionFailed(SessionError),
}

/// Orchestrates capture sessions: intents in, events out.
///
/// The recognition capability is injected at construction time; passing
/// `None` makes every start intent fail with a capability-missing error,
/// mirroring a platform without speech recognition.
///
/// All transitions run while holding the single session lock, so engine
/// callbacks and user intents are serialized: whichever acquires the lock
/// first decides a race deterministically. Must be created inside a tokio
/// runtime (it spawns the event pump).
pub struct SessionController<R, D, C>
where
    R: SpeechRecognizer + 'static,
    D: AnswerDispatcher + 'static,
    C: CredentialSource + 'static,
{
    inner: Arc<ControllerInner<R, D, C>>,
}

impl<R, D, C> Clone for SessionController<R, D, C>
where
    R: SpeechRecognizer + 'static,
    D: AnswerDispatcher + 'static,
    C: CredentialSource + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<R, D, C> {
    engine: Option<Arc<R>>,
    dispatcher: Arc<D>,
    credentials: Arc<C>,
    session: Mutex<CaptureSession>,
    bus_tx: mpsc::UnboundedSender<SessionEvent>,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl<R, D, C> SessionController<R, D, C>
where
    R: SpeechRecognizer + 'static,
    D: AnswerDispatcher + 'static,
    C: CredentialSource + 'static,
{
    /// Create a controller and the event stream the UI consumes.
    pub fn new(
        engine: Option<Arc<R>>,
        dispatcher: Arc<D>,
        credentials: Arc<C>,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (bus_tx, mut bus_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(ControllerInner {
            engine,
            dispatcher,
            credentials,
            session: Mutex::new(CaptureSession::new()),
            bus_tx,
            events_tx,
        });

        // Event pump: the single consumer of engine and dispatch events.
        let pump = Arc::clone(&inner);
        tokio::spawn(async move {
            while let Some(event) = bus_rx.recv().await {
                pump.process(event).await;
            }
        });

        (Self { inner }, events_rx)
    }

    /// Start a fresh capture session.
    ///
    /// A no-op while a session is listening, restarting, stopping, or
    /// awaiting its answer, so tapping start twice never creates a second
    /// engine instance.
    pub async fn start(&self) {
        let inner = &self.inner;
        let mut session = inner.session.lock().await;
        if session.is_active() {
            return;
        }

        // A new session always begins with a fresh utterance.
        *session = CaptureSession::new();
        inner.emit(ControllerEvent::TranscriptChanged(String::new()));

        match &inner.engine {
            None => {
                inner.apply_locked(
                    &mut session,
                    SessionEvent::EngineFaulted(SessionError::CapabilityMissing),
                );
            }
            Some(engine) => {
                let started = engine.start(inner.sink()).await;
                let event = match started {
                    Ok(()) => SessionEvent::EngineStarted,
                    Err(e) => SessionEvent::EngineFaulted(SessionError::Engine(e.to_string())),
                };
                inner.apply_locked(&mut session, event);
            }
        }
    }

    /// Request the current session to finish and dispatch what it captured.
    ///
    /// Idempotent; a no-op when no capture is running. The flag is set under
    /// the session lock, so the very next termination event observes it.
    pub async fn stop(&self) {
        let effects = {
            let mut session = self.inner.session.lock().await;
            self.inner
                .apply_locked(&mut session, SessionEvent::StopRequested)
        };
        self.inner.run_effects(effects).await;
    }

    /// Replace the provisional transcript text while no capture is running.
    pub async fn edit_transcript(&self, text: &str) -> Result<(), IntentError> {
        let mut session = self.inner.session.lock().await;
        if session.is_active() {
            return Err(IntentError::Busy {
                current_state: session.state(),
                intent: "edit the transcript",
            });
        }
        session.override_provisional(text);
        self.inner
            .emit(ControllerEvent::TranscriptChanged(session.snapshot()));
        Ok(())
    }

    /// Submit typed text straight to the answer dispatcher, bypassing capture.
    ///
    /// Only accepted while no session is mid-capture, preventing a race
    /// between manual submission and live capture dispatch.
    pub async fn submit_manual(&self, text: &str) -> Result<(), IntentError> {
        let trimmed = text.trim();
        let effects = {
            let mut session = self.inner.session.lock().await;
            if session.is_active() {
                return Err(IntentError::Busy {
                    current_state: session.state(),
                    intent: "submit a typed question",
                });
            }
            if trimmed.is_empty() {
                return Err(IntentError::EmptyTranscript);
            }

            *session = CaptureSession::for_manual(trimmed);
            self.inner
                .emit(ControllerEvent::TranscriptChanged(session.snapshot()));
            self.inner
                .emit(ControllerEvent::StateChanged(SessionState::AwaitingAnswer));
            vec![Effect::Dispatch(trimmed.to_string())]
        };
        self.inner.run_effects(effects).await;
        Ok(())
    }

    /// Get the current session state
    pub async fn state(&self) -> SessionState {
        self.inner.session.lock().await.state()
    }

    /// Get the live transcript view
    pub async fn snapshot(&self) -> String {
        self.inner.session.lock().await.snapshot()
    }

    /// Get the answer, once the session completed with one
    pub async fn answer(&self) -> Option<String> {
        self.inner
            .session
            .lock()
            .await
            .answer()
            .map(|s| s.to_string())
    }

    /// Get the failure, once the session failed
    pub async fn error(&self) -> Option<SessionError> {
        self.inner.session.lock().await.error().cloned()
    }
}

impl<R, D, C> ControllerInner<R, D, C>
where
    R: SpeechRecognizer + 'static,
    D: AnswerDispatcher + 'static,
    C: CredentialSource + 'static,
{
    fn sink(&self) -> EngineEventSink {
        EngineEventSink::new(self.bus_tx.clone())
    }

    fn emit(&self, event: ControllerEvent) {
        // The UI may have gone away; that is not the session's problem.
        let _ = self.events_tx.send(event);
    }

    /// Apply one event under the caller's lock and emit the resulting
    /// controller events.
    fn apply_locked(&self, session: &mut CaptureSession, event: SessionEvent) -> Vec<Effect> {
        let state_before = session.state();
        let snapshot_before = session.snapshot();

        let effects = session.apply(event);

        let snapshot = session.snapshot();
        if snapshot != snapshot_before {
            self.emit(ControllerEvent::TranscriptChanged(snapshot));
        }

        let state = session.state();
        if state != state_before {
            self.emit(ControllerEvent::StateChanged(state));
            match state {
                SessionState::Completed => {
                    if let Some(answer) = session.answer() {
                        self.emit(ControllerEvent::AnswerReady(answer.to_string()));
                    }
                }
                SessionState::Failed => {
                    if let Some(error) = session.error() {
                        self.emit(ControllerEvent::SessionFailed(error.clone()));
                    }
                }
                _ => {}
            }
        }

        effects
    }

    async fn process(&self, event: SessionEvent) {
        let effects = {
            let mut session = self.session.lock().await;
            self.apply_locked(&mut session, event)
        };
        self.run_effects(effects).await;
    }

    /// Execute effects, feeding any follow-up events back through the
    /// session until the queue drains.
    async fn run_effects(&self, effects: Vec<Effect>) {
        let mut queue: VecDeque<SessionEvent> = VecDeque::new();
        self.execute(effects, &mut queue).await;

        while let Some(event) = queue.pop_front() {
            let effects = {
                let mut session = self.session.lock().await;
                self.apply_locked(&mut session, event)
            };
            self.execute(effects, &mut queue).await;
        }
    }

    async fn execute(&self, effects: Vec<Effect>, queue: &mut VecDeque<SessionEvent>) {
        for effect in effects {
            match effect {
                Effect::RestartEngine => {
                    if let Some(engine) = &self.engine {
                        let event = match engine.start(self.sink()).await {
                            Ok(()) => SessionEvent::EngineStarted,
                            Err(e) => {
                                SessionEvent::EngineFaulted(SessionError::Engine(e.to_string()))
                            }
                        };
                        queue.push_back(event);
                    }
                }
                Effect::StopEngine => {
                    if let Some(engine) = &self.engine {
                        if let Err(e) = engine.stop().await {
                            queue.push_back(SessionEvent::EngineFaulted(SessionError::Engine(
                                e.to_string(),
                            )));
                        }
                    }
                }
                Effect::Dispatch(text) => self.spawn_dispatch(text),
            }
        }
    }

    /// Run the answer call on its own task so intents stay responsive while
    /// the session awaits the answer. The outcome re-enters through the bus.
    fn spawn_dispatch(&self, text: String) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let credentials = Arc::clone(&self.credentials);
        let bus = self.bus_tx.clone();

        tokio::spawn(async move {
            let result = match credentials.bearer_token() {
                Some(token) => dispatcher.dispatch(&text, &token).await,
                None => Err(DispatchError::MissingCredential),
            };
            let event = match result {
                Ok(answer) => SessionEvent::AnswerArrived(answer),
                Err(e) => SessionEvent::AnswerFailed(SessionError::Dispatch(e.to_string())),
            };
            let _ = bus.send(event);
        });
    }
}
