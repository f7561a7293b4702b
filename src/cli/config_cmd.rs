//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::EngineConfig;
use crate::domain::duration::Duration;
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    // Validate key
    if !is_valid_config_key(key) {
        return Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        });
    }

    // Validate value based on key type
    validate_config_value(key, value)?;

    // Load existing config
    let mut config = store.load().await?;

    // Update the appropriate field
    match key {
        "api_url" => config.api_url = Some(value.to_string()),
        "api_key" => config.api_key = Some(value.to_string()),
        "token" => config.token = Some(value.to_string()),
        "dispatch_timeout" => config.dispatch_timeout = Some(value.to_string()),
        "engine.command" => {
            // Initialize engine config if None
            if config.engine.is_none() {
                config.engine = Some(EngineConfig::default());
            }
            if let Some(ref mut engine) = config.engine {
                engine.command = Some(value.to_string());
            }
        }
        _ => unreachable!(), // Already validated
    }

    // Save config
    store.save(&config).await?;
    match key {
        "api_key" | "token" => presenter.success(&format!("{} = {}", key, mask_secret(value))),
        _ => presenter.success(&format!("{} = {}", key, value)),
    }

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    // Validate key
    if !is_valid_config_key(key) {
        return Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        });
    }

    let config = store.load().await?;

    let value = match key {
        "api_url" => config.api_url,
        "api_key" => config.api_key.map(|s| mask_secret(&s)),
        "token" => config.token.map(|s| mask_secret(&s)),
        "dispatch_timeout" => config.dispatch_timeout,
        "engine.command" => config.engine.as_ref().and_then(|e| e.command.clone()),
        _ => unreachable!(),
    };

    match value {
        Some(v) => presenter.output(&v),
        None => presenter.output("(not set)"),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    presenter.key_value("api_url", config.api_url.as_deref().unwrap_or("(not set)"));
    presenter.key_value(
        "api_key",
        &config
            .api_key
            .map(|s| mask_secret(&s))
            .unwrap_or_else(|| "(not set)".to_string()),
    );
    presenter.key_value(
        "token",
        &config
            .token
            .map(|s| mask_secret(&s))
            .unwrap_or_else(|| "(not set)".to_string()),
    );
    presenter.key_value(
        "dispatch_timeout",
        config.dispatch_timeout.as_deref().unwrap_or("(not set)"),
    );
    presenter.key_value(
        "engine.command",
        config
            .engine
            .as_ref()
            .and_then(|e| e.command.as_deref())
            .unwrap_or("(not set)"),
    );

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "api_url" => {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ConfigError::ValidationError {
                    key: key.to_string(),
                    message: "Value must start with http:// or https://".to_string(),
                });
            }
        }
        "dispatch_timeout" => {
            value
                .parse::<Duration>()
                .map_err(|e| ConfigError::ValidationError {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
        }
        "engine.command" => {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    key: key.to_string(),
                    message: "Value must not be empty".to_string(),
                });
            }
        }
        _ => {} // api_key and token accept any string
    }
    Ok(())
}

/// Mask a secret for display (show first 4 and last 4 chars)
fn mask_secret(secret: &str) -> String {
    if secret.len() <= 8 {
        "*".repeat(secret.len())
    } else {
        format!("{}...{}", &secret[..4], &secret[secret.len() - 4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_secret_long() {
        let masked = mask_secret("abcdefghijklmnop");
        assert_eq!(masked, "abcd...mnop");
    }

    #[test]
    fn mask_secret_short() {
        let masked = mask_secret("short");
        assert_eq!(masked, "*****");
    }

    #[test]
    fn validate_api_url_valid() {
        assert!(validate_config_value("api_url", "https://api.example.com").is_ok());
        assert!(validate_config_value("api_url", "http://localhost:3000").is_ok());
    }

    #[test]
    fn validate_api_url_invalid() {
        assert!(validate_config_value("api_url", "api.example.com").is_err());
        assert!(validate_config_value("api_url", "ftp://files.example.com").is_err());
    }

    #[test]
    fn validate_dispatch_timeout_valid() {
        assert!(validate_config_value("dispatch_timeout", "30s").is_ok());
        assert!(validate_config_value("dispatch_timeout", "1m").is_ok());
        assert!(validate_config_value("dispatch_timeout", "2m30s").is_ok());
    }

    #[test]
    fn validate_dispatch_timeout_invalid() {
        assert!(validate_config_value("dispatch_timeout", "invalid").is_err());
    }

    #[test]
    fn validate_engine_command_rejects_empty() {
        assert!(validate_config_value("engine.command", "   ").is_err());
        assert!(validate_config_value("engine.command", "stt-stream").is_ok());
    }

    #[test]
    fn validate_secrets_accept_any_string() {
        assert!(validate_config_value("api_key", "anything").is_ok());
        assert!(validate_config_value("token", "anything").is_ok());
    }
}
