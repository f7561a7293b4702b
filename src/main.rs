//! LiveAsk CLI entry point

use std::process::ExitCode;

use clap::Parser;

use live_ask::cli::{
    app::{load_merged_config, run_ask, run_capture, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands, EngineChoice, SessionOptions},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use live_ask::domain::config::{AppConfig, EngineConfig};
use live_ask::domain::duration::Duration;
use live_ask::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Build CLI config from args
    let cli_config = AppConfig {
        api_url: cli.api_url.clone(),
        api_key: None, // API key comes from env/file only
        token: None,   // Token comes from env/file only
        dispatch_timeout: cli.timeout.clone(),
        engine: cli.engine_cmd.clone().map(|command| EngineConfig {
            command: Some(command),
        }),
    };

    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Some(Commands::Ask { text }) => {
            let config = load_merged_config(cli_config).await;
            let options = match session_options(&config, EngineChoice::None, &presenter) {
                Ok(options) => options,
                Err(code) => return code,
            };
            run_ask(text.join(" "), options).await
        }
        None => {
            let config = load_merged_config(cli_config).await;

            // Pick the recognition capability
            let engine = if cli.stdin {
                EngineChoice::Stdin
            } else if let Some(command) = config.engine_command() {
                EngineChoice::Command(command.to_string())
            } else {
                EngineChoice::None
            };

            let options = match session_options(&config, engine, &presenter) {
                Ok(options) => options,
                Err(code) => return code,
            };
            run_capture(options).await
        }
    }
}

/// Resolve session options from merged config
fn session_options(
    config: &AppConfig,
    engine: EngineChoice,
    presenter: &Presenter,
) -> Result<SessionOptions, ExitCode> {
    let dispatch_timeout = match config.dispatch_timeout.as_ref() {
        Some(s) => match s.parse::<Duration>() {
            Ok(d) => d,
            Err(e) => {
                presenter.error(&format!("Invalid timeout: {}", e));
                return Err(ExitCode::from(EXIT_USAGE_ERROR));
            }
        },
        None => Duration::default_dispatch_timeout(),
    };

    Ok(SessionOptions {
        engine,
        api_url: config.api_url.clone(),
        api_key: config.api_key.clone(),
        token: config.token.clone(),
        dispatch_timeout,
    })
}
