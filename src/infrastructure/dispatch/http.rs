//! HTTP answer dispatcher adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{AnswerDispatcher, DispatchError};
use crate::domain::duration::Duration;

/// Answer endpoint path on the backend
const ANSWER_ENDPOINT: &str = "/api/speech/chatgpt";

// Request types for the answer API

#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    transcript: &'a str,
}

// Response types for the answer API

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    // Older backend versions capitalize the key.
    #[serde(default, alias = "Answer")]
    answer: Option<String>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Backend answer dispatcher
///
/// Performs the single-shot `POST /api/speech/chatgpt` call carrying the
/// finalized transcript, the API key header, and the bearer credential.
/// Every request has a bounded wait; a stalled backend maps to a request
/// failure instead of stranding the session.
pub struct HttpAnswerDispatcher {
    base_url: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpAnswerDispatcher {
    /// Create a dispatcher with the default request timeout
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_timeout(base_url, api_key, Duration::default_dispatch_timeout())
    }

    /// Create a dispatcher with a custom request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Build the endpoint URL
    fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url, ANSWER_ENDPOINT)
    }

    /// Extract a non-empty answer from the response body
    fn extract_answer(response: &AnswerResponse) -> Option<String> {
        let answer = response.answer.as_deref()?.trim();
        if answer.is_empty() {
            None
        } else {
            Some(answer.to_string())
        }
    }
}

#[async_trait]
impl AnswerDispatcher for HttpAnswerDispatcher {
    async fn dispatch(&self, transcript: &str, token: &str) -> Result<String, DispatchError> {
        let response = self
            .client
            .post(self.endpoint_url())
            .timeout(self.timeout.as_std())
            .header("x-api-key", &self.api_key)
            .bearer_auth(token)
            .json(&AnswerRequest { transcript })
            .send()
            .await
            .map_err(|e| DispatchError::RequestFailed(e.to_string()))?;

        let status = response.status();

        // Handle HTTP errors
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DispatchError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DispatchError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DispatchError::ApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        // Parse response
        let response: AnswerResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::ParseError(e.to_string()))?;

        // Check for API error in response body
        if let Some(error) = response.error {
            return Err(DispatchError::ApiError(error.message));
        }

        Self::extract_answer(&response).ok_or(DispatchError::EmptyAnswer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_appends_path() {
        let dispatcher = HttpAnswerDispatcher::new("https://api.example.com", "key");
        assert_eq!(
            dispatcher.endpoint_url(),
            "https://api.example.com/api/speech/chatgpt"
        );
    }

    #[test]
    fn endpoint_url_trims_trailing_slash() {
        let dispatcher = HttpAnswerDispatcher::new("https://api.example.com/", "key");
        assert_eq!(
            dispatcher.endpoint_url(),
            "https://api.example.com/api/speech/chatgpt"
        );
    }

    #[test]
    fn custom_timeout() {
        let dispatcher =
            HttpAnswerDispatcher::with_timeout("https://api.example.com", "key", Duration::from_secs(5));
        assert_eq!(dispatcher.timeout.as_secs(), 5);
    }

    #[test]
    fn parses_lowercase_answer_key() {
        let response: AnswerResponse = serde_json::from_str(r#"{"answer": "42"}"#).unwrap();
        assert_eq!(
            HttpAnswerDispatcher::extract_answer(&response),
            Some("42".to_string())
        );
    }

    #[test]
    fn parses_capitalized_answer_key() {
        let response: AnswerResponse = serde_json::from_str(r#"{"Answer": "42"}"#).unwrap();
        assert_eq!(
            HttpAnswerDispatcher::extract_answer(&response),
            Some("42".to_string())
        );
    }

    #[test]
    fn missing_answer_is_none() {
        let response: AnswerResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(HttpAnswerDispatcher::extract_answer(&response), None);
    }

    #[test]
    fn blank_answer_is_none() {
        let response: AnswerResponse = serde_json::from_str(r#"{"answer": "   "}"#).unwrap();
        assert_eq!(HttpAnswerDispatcher::extract_answer(&response), None);
    }

    #[test]
    fn answer_is_trimmed() {
        let response: AnswerResponse = serde_json::from_str(r#"{"answer": "  42  "}"#).unwrap();
        assert_eq!(
            HttpAnswerDispatcher::extract_answer(&response),
            Some("42".to_string())
        );
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_string(&AnswerRequest {
            transcript: "hello world",
        })
        .unwrap();
        assert_eq!(body, r#"{"transcript":"hello world"}"#);
    }
}
