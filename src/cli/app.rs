//! Main app runners

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use crate::application::ports::{ConfigStore, SpeechRecognizer};
use crate::application::{ControllerEvent, SessionController};
use crate::domain::config::AppConfig;
use crate::domain::session::SessionState;
use crate::infrastructure::credentials::env::TOKEN_ENV_VAR;
use crate::infrastructure::{
    CommandRecognizer, EnvCredentialSource, HttpAnswerDispatcher, StdinRecognizer, XdgConfigStore,
};

use super::args::{EngineChoice, SessionOptions};
use super::presenter::Presenter;
use super::signals::StopSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Run a live capture session
pub async fn run_capture(options: SessionOptions) -> ExitCode {
    let presenter = Presenter::new();

    let (dispatcher, credentials) = match build_backend(&options) {
        Ok(parts) => parts,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match &options.engine {
        EngineChoice::Command(command) => {
            let engine = Arc::new(CommandRecognizer::new(command));
            run_session(Some(engine), dispatcher, credentials).await
        }
        EngineChoice::Stdin => {
            presenter.info("Type your question. Blank line pauses, Ctrl-C finishes.");
            let engine = Arc::new(StdinRecognizer::new());
            run_session(Some(engine), dispatcher, credentials).await
        }
        // No recognizer configured: the controller surfaces the
        // capability-missing failure through the normal event path.
        EngineChoice::None => run_session::<CommandRecognizer>(None, dispatcher, credentials).await,
    }
}

/// Submit a typed question without capturing speech
pub async fn run_ask(text: String, options: SessionOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let (dispatcher, credentials) = match build_backend(&options) {
        Ok(parts) => parts,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (controller, mut events) =
        SessionController::<CommandRecognizer, _, _>::new(None, dispatcher, credentials);

    presenter.start_spinner("Getting answer...");
    if let Err(e) = controller.submit_manual(&text).await {
        presenter.stop_spinner();
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    while let Some(event) = events.recv().await {
        match event {
            ControllerEvent::AnswerReady(answer) => {
                presenter.stop_spinner();
                presenter.output(&answer);
                return ExitCode::from(EXIT_SUCCESS);
            }
            ControllerEvent::SessionFailed(error) => {
                presenter.spinner_fail("Request failed");
                presenter.error(&error.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            _ => {}
        }
    }

    ExitCode::from(EXIT_ERROR)
}

/// Drive one capture session to its terminal state
async fn run_session<R>(
    engine: Option<Arc<R>>,
    dispatcher: Arc<HttpAnswerDispatcher>,
    credentials: Arc<EnvCredentialSource>,
) -> ExitCode
where
    R: SpeechRecognizer + 'static,
{
    let mut presenter = Presenter::new();

    let mut stop = match StopSignal::listen() {
        Ok(stop) => stop,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (controller, mut events) = SessionController::new(engine, dispatcher, credentials);
    controller.start().await;

    let mut stop_requested = false;
    loop {
        tokio::select! {
            signal = stop.recv() => {
                if signal.is_none() {
                    return ExitCode::from(EXIT_ERROR);
                }
                if stop_requested {
                    presenter.stop_spinner();
                    presenter.warn("Aborted");
                    return ExitCode::from(EXIT_ERROR);
                }
                stop_requested = true;
                controller.stop().await;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    return ExitCode::from(EXIT_ERROR);
                };
                match event {
                    ControllerEvent::StateChanged(SessionState::Listening) => {
                        // Transparent restarts re-enter Listening; keep the
                        // existing status line.
                        if !presenter.spinner_active() {
                            presenter.start_spinner("Listening... (Ctrl-C to finish)");
                        }
                    }
                    ControllerEvent::StateChanged(SessionState::Stopping) => {
                        presenter.update_spinner("Finishing...");
                    }
                    ControllerEvent::StateChanged(SessionState::AwaitingAnswer) => {
                        presenter.update_spinner("Getting answer...");
                    }
                    ControllerEvent::StateChanged(SessionState::Completed) => {
                        presenter.stop_spinner();
                        match controller.answer().await {
                            Some(answer) => presenter.output(&answer),
                            None => presenter.info("Nothing captured, nothing to ask."),
                        }
                        return ExitCode::from(EXIT_SUCCESS);
                    }
                    ControllerEvent::StateChanged(_) => {}
                    ControllerEvent::TranscriptChanged(snapshot) => {
                        if !snapshot.is_empty() {
                            presenter.update_transcript(&snapshot);
                        }
                    }
                    // The answer is printed when Completed arrives.
                    ControllerEvent::AnswerReady(_) => {}
                    ControllerEvent::SessionFailed(error) => {
                        presenter.spinner_fail("Session failed");
                        presenter.error(&error.to_string());
                        return ExitCode::from(EXIT_ERROR);
                    }
                }
            }
        }
    }
}

/// Build the dispatcher and credential source from resolved options
fn build_backend(
    options: &SessionOptions,
) -> Result<(Arc<HttpAnswerDispatcher>, Arc<EnvCredentialSource>), String> {
    let api_url = options.api_url.clone().ok_or_else(|| {
        "Missing API URL. Set LIVE_ASK_API_URL or configure via 'live-ask config set api_url <url>'"
            .to_string()
    })?;
    let api_key = options.api_key.clone().ok_or_else(|| {
        "Missing API key. Set LIVE_ASK_API_KEY or configure via 'live-ask config set api_key <key>'"
            .to_string()
    })?;

    let dispatcher = Arc::new(HttpAnswerDispatcher::with_timeout(
        api_url,
        api_key,
        options.dispatch_timeout,
    ));
    let credentials = Arc::new(EnvCredentialSource::with_fallback(options.token.clone()));
    Ok((dispatcher, credentials))
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    // Build env config
    let env_config = AppConfig {
        api_url: env::var("LIVE_ASK_API_URL").ok().filter(|s| !s.is_empty()),
        api_key: env::var("LIVE_ASK_API_KEY").ok().filter(|s| !s.is_empty()),
        token: env::var(TOKEN_ENV_VAR).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}
