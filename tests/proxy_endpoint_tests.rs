//! Drives the `/api/chat` router in-process with `tower::ServiceExt::oneshot`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use minichat::core::message::ChatMessage;
use minichat::inference::{
    CompletionOptions, CompletionProvider, CompletionRequest, OpenRouterProvider,
    ProviderConfig, ProviderError,
};
use minichat::server::{AppState, CHAT_ROUTE, router};
use serde_json::{Value, json};
use tower::ServiceExt;

// ============================================================================
// Helper Functions
// ============================================================================

/// Provider double that records calls and returns a canned outcome.
struct StubProvider {
    outcome: Result<String, ProviderError>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(Vec<ChatMessage>, CompletionOptions)>>,
}

impl StubProvider {
    fn new(outcome: Result<String, ProviderError>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((request.messages.to_vec(), request.options.clone()));
        self.outcome.clone()
    }
}

fn state_with(provider: Arc<dyn CompletionProvider>) -> AppState {
    AppState {
        provider,
        options: CompletionOptions::default(),
    }
}

fn post_json(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(CHAT_ROUTE)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(state: AppState, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let resp = router(state).oneshot(req).await.expect("request");
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&body).expect("parse JSON");
    (status, headers, json)
}

// ============================================================================
// Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_valid_request_returns_reply() {
    let stub = StubProvider::new(Ok("Hi there".to_string()));
    let body = json!({"messages": [
        {"role": "system", "content": "You are a helpful assistant."},
        {"role": "user", "content": "Hello"}
    ]});

    let (status, _, json) = send(state_with(stub.clone()), post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"reply": "Hi there"}));
    assert_eq!(stub.calls(), 1);

    let seen = stub.seen.lock().unwrap();
    let (messages, options) = &seen[0];
    assert_eq!(messages.last(), Some(&ChatMessage::user("Hello")));
    assert_eq!(options.max_tokens, 512);
    assert_eq!(options.timeout, std::time::Duration::from_secs(30));
}

#[tokio::test]
async fn test_non_post_is_405_with_allow_header() {
    let stub = StubProvider::new(Ok("unused".to_string()));
    let req = Request::builder()
        .method("GET")
        .uri(CHAT_ROUTE)
        .body(Body::empty())
        .unwrap();

    let (status, headers, json) = send(state_with(stub.clone()), req).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(headers.get(header::ALLOW).unwrap(), "POST");
    assert_eq!(json, json!({"error": "Method not allowed. Use POST."}));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_put_is_also_405() {
    let stub = StubProvider::new(Ok("unused".to_string()));
    let req = Request::builder()
        .method("PUT")
        .uri(CHAT_ROUTE)
        .body(Body::from(r#"{"messages":[]}"#))
        .unwrap();

    let (status, headers, _) = send(state_with(stub.clone()), req).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(headers.get(header::ALLOW).unwrap(), "POST");
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_missing_messages_is_400_without_provider_call() {
    let stub = StubProvider::new(Ok("unused".to_string()));

    let (status, _, json) = send(state_with(stub.clone()), post_json(r#"{"prompt":"hi"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({"error": "Invalid request: expected JSON body with `messages` array."})
    );
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let stub = StubProvider::new(Ok("unused".to_string()));

    let (status, _, json) = send(state_with(stub.clone()), post_json("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Invalid request: expected JSON body with `messages` array."
    );
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_top_level_array_is_400_without_provider_call() {
    let stub = StubProvider::new(Ok("unused".to_string()));
    let body = json!([[{"role": "user", "content": "x"}]]);

    let (status, _, json) = send(state_with(stub.clone()), post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Invalid request: expected JSON body with `messages` array."
    );
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_message_without_content_is_400() {
    let stub = StubProvider::new(Ok("unused".to_string()));
    let body = json!({"messages": [{"role": "user"}]});

    let (status, _, json) = send(state_with(stub.clone()), post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({"error": "Invalid request: each message must be { role: string, content: string }."})
    );
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_unknown_role_is_400() {
    let stub = StubProvider::new(Ok("unused".to_string()));
    let body = json!({"messages": [{"role": "tool", "content": "x"}]});

    let (status, _, _) = send(state_with(stub.clone()), post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_provider_failure_is_500_with_message() {
    let stub = StubProvider::new(Err(ProviderError::UnexpectedShape));
    let body = json!({"messages": [{"role": "user", "content": "Hello"}]});

    let (status, _, json) = send(state_with(stub.clone()), post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({"error": "Server error: OpenRouter returned an unexpected response shape"})
    );
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_missing_credential_is_500_before_any_network_io() {
    // Real adapter with no key; the base URL would refuse connections
    let provider = Arc::new(OpenRouterProvider::new(ProviderConfig {
        api_key: None,
        base_url: "http://127.0.0.1:9".to_string(),
        default_model: None,
    }));
    let body = json!({"messages": [{"role": "user", "content": "Hello"}]});

    let (status, _, json) = send(state_with(provider), post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({"error": "Server error: OPENROUTER_API_KEY is not configured on the server"})
    );
}

#[tokio::test]
async fn test_upstream_error_never_contains_credential() {
    let provider = Arc::new(OpenRouterProvider::new(ProviderConfig {
        api_key: Some("sk-or-secret-value".to_string()),
        base_url: "http://127.0.0.1:9".to_string(),
        default_model: None,
    }));
    let body = json!({"messages": [{"role": "user", "content": "Hello"}]});

    let (status, _, json) = send(state_with(provider), post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let msg = json["error"].as_str().unwrap();
    assert!(msg.starts_with("Server error: "), "{msg}");
    assert!(!msg.contains("sk-or-secret-value"));
}
