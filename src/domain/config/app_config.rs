//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::duration::Duration;

/// Recognition engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// External recognizer command; its stdout must emit JSON result lines.
    pub command: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub token: Option<String>,
    pub dispatch_timeout: Option<String>,
    pub engine: Option<EngineConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_url: None,
            api_key: None,
            token: None,
            dispatch_timeout: Some("30s".to_string()),
            engine: Some(EngineConfig { command: None }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_url: other.api_url.or(self.api_url),
            api_key: other.api_key.or(self.api_key),
            token: other.token.or(self.token),
            dispatch_timeout: other.dispatch_timeout.or(self.dispatch_timeout),
            engine: Self::merge_engine_config(self.engine, other.engine),
        }
    }

    /// Merge engine config sections
    fn merge_engine_config(
        base: Option<EngineConfig>,
        other: Option<EngineConfig>,
    ) -> Option<EngineConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(EngineConfig {
                command: o.command.or(b.command),
            }),
        }
    }

    /// Get dispatch_timeout as parsed Duration, or default if not set/invalid
    pub fn dispatch_timeout_or_default(&self) -> Duration {
        self.dispatch_timeout
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_dispatch_timeout)
    }

    /// Get the configured recognizer command, if any
    pub fn engine_command(&self) -> Option<&str> {
        self.engine.as_ref().and_then(|e| e.command.as_deref())
    }
}
