//! Answer dispatcher integration tests
//!
//! Exercise the HTTP adapter against a mock backend: request shape,
//! answer-key spellings, and the failure taxonomy.

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use live_ask::application::ports::{AnswerDispatcher, DispatchError};
use live_ask::domain::duration::Duration;
use live_ask::infrastructure::HttpAnswerDispatcher;

use serde_json::json;

const ENDPOINT: &str = "/api/speech/chatgpt";

async fn server_returning(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn sends_transcript_with_api_key_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-api-key", "key-123"))
        .and(header("authorization", "Bearer token-456"))
        .and(body_json(json!({ "transcript": "what time is it" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "noon" })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key-123");
    let answer = dispatcher
        .dispatch("what time is it", "token-456")
        .await
        .unwrap();

    assert_eq!(answer, "noon");
}

#[tokio::test]
async fn accepts_capitalized_answer_key() {
    let server =
        server_returning(ResponseTemplate::new(200).set_body_json(json!({ "Answer": "noon" })))
            .await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key");
    let answer = dispatcher.dispatch("question", "token").await.unwrap();
    assert_eq!(answer, "noon");
}

#[tokio::test]
async fn trims_the_answer() {
    let server =
        server_returning(ResponseTemplate::new(200).set_body_json(json!({ "answer": "  noon \n" })))
            .await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key");
    let answer = dispatcher.dispatch("question", "token").await.unwrap();
    assert_eq!(answer, "noon");
}

#[tokio::test]
async fn unauthorized_is_classified() {
    let server = server_returning(ResponseTemplate::new(401)).await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key");
    let result = dispatcher.dispatch("question", "stale-token").await;
    assert!(matches!(result, Err(DispatchError::Unauthorized)));
}

#[tokio::test]
async fn forbidden_is_classified_as_unauthorized() {
    let server = server_returning(ResponseTemplate::new(403)).await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key");
    let result = dispatcher.dispatch("question", "token").await;
    assert!(matches!(result, Err(DispatchError::Unauthorized)));
}

#[tokio::test]
async fn rate_limit_is_classified() {
    let server = server_returning(ResponseTemplate::new(429)).await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key");
    let result = dispatcher.dispatch("question", "token").await;
    assert!(matches!(result, Err(DispatchError::RateLimited)));
}

#[tokio::test]
async fn server_error_carries_status() {
    let server = server_returning(ResponseTemplate::new(500).set_body_string("boom")).await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key");
    let result = dispatcher.dispatch("question", "token").await;
    match result {
        Err(DispatchError::ApiError(message)) => {
            assert!(message.contains("500"), "got: {}", message);
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn error_body_in_success_response_is_an_api_error() {
    let server = server_returning(
        ResponseTemplate::new(200)
            .set_body_json(json!({ "error": { "message": "quota exceeded" } })),
    )
    .await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key");
    let result = dispatcher.dispatch("question", "token").await;
    match result {
        Err(DispatchError::ApiError(message)) => assert_eq!(message, "quota exceeded"),
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_answer_key_is_empty_answer() {
    let server = server_returning(ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key");
    let result = dispatcher.dispatch("question", "token").await;
    assert!(matches!(result, Err(DispatchError::EmptyAnswer)));
}

#[tokio::test]
async fn blank_answer_is_empty_answer() {
    let server =
        server_returning(ResponseTemplate::new(200).set_body_json(json!({ "answer": "   " })))
            .await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key");
    let result = dispatcher.dispatch("question", "token").await;
    assert!(matches!(result, Err(DispatchError::EmptyAnswer)));
}

#[tokio::test]
async fn non_json_body_is_a_parse_error() {
    let server = server_returning(ResponseTemplate::new(200).set_body_string("<html></html>")).await;

    let dispatcher = HttpAnswerDispatcher::new(server.uri(), "key");
    let result = dispatcher.dispatch("question", "token").await;
    assert!(matches!(result, Err(DispatchError::ParseError(_))));
}

#[tokio::test]
async fn stalled_backend_hits_the_bounded_wait() {
    let server = server_returning(
        ResponseTemplate::new(200)
            .set_body_json(json!({ "answer": "too late" }))
            .set_delay(std::time::Duration::from_secs(5)),
    )
    .await;

    let dispatcher =
        HttpAnswerDispatcher::with_timeout(server.uri(), "key", Duration::from_millis(200));
    let result = dispatcher.dispatch("question", "token").await;
    assert!(matches!(result, Err(DispatchError::RequestFailed(_))));
}

#[tokio::test]
async fn unreachable_backend_is_a_request_failure() {
    // Nothing listens on this port.
    let dispatcher = HttpAnswerDispatcher::new("http://127.0.0.1:9", "key");
    let result = dispatcher.dispatch("question", "token").await;
    assert!(matches!(result, Err(DispatchError::RequestFailed(_))));
}
