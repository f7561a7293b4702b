//! Environment credential source adapter

use std::env;

use crate::application::ports::CredentialSource;

/// Default environment variable holding the session token
pub const TOKEN_ENV_VAR: &str = "LIVE_ASK_TOKEN";

/// Bearer token source backed by the process environment, with an optional
/// configured fallback. The token is read at dispatch time, so a token that
/// appears after capture started is still honored.
pub struct EnvCredentialSource {
    var_name: String,
    fallback: Option<String>,
}

impl EnvCredentialSource {
    /// Create a source reading the default environment variable
    pub fn new() -> Self {
        Self {
            var_name: TOKEN_ENV_VAR.to_string(),
            fallback: None,
        }
    }

    /// Create a source with a configured fallback token
    pub fn with_fallback(fallback: Option<String>) -> Self {
        Self {
            var_name: TOKEN_ENV_VAR.to_string(),
            fallback,
        }
    }

    /// Create a source reading a custom environment variable
    pub fn with_var(var_name: impl Into<String>, fallback: Option<String>) -> Self {
        Self {
            var_name: var_name.into(),
            fallback,
        }
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for EnvCredentialSource {
    fn bearer_token(&self) -> Option<String> {
        env::var(&self.var_name)
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.fallback.clone())
    }
}
