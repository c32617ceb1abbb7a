use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use super::{CHAT_ENDPOINT, enforce_rate_limit};
use crate::error::ApiError;
use crate::identity::ClientAddr;
use crate::metrics::REQUEST_TOTAL;
use crate::models::{ChatMessage, ChatRequest};
use crate::prompts::LABOUR_LAW_SYSTEM_PROMPT;
use crate::state::AppState;

pub async fn labour_law_chat_handler(
    State(state): State<Arc<AppState>>,
    addr: ClientAddr,
    Json(payload): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    REQUEST_TOTAL.inc();

    if payload.messages.is_empty() {
        return Err(ApiError::BadRequest("messages must not be empty".to_string()));
    }

    enforce_rate_limit(&state, &addr, CHAT_ENDPOINT).await?;

    let mut messages = Vec::with_capacity(payload.messages.len() + 1);
    messages.push(ChatMessage::system(LABOUR_LAW_SYSTEM_PROMPT));
    messages.extend(payload.messages);

    let upstream = state.gateway.stream_chat(&messages).await?;

    Ok((
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use tower::ServiceExt;

    use super::super::router;
    use super::super::test_support::{json_body, post_json, state, state_with, text_body};
    use crate::error::StoreError;
    use crate::models::RateLimitRecord;
    use crate::store::{RateLimitStore, Update};
    use crate::testing::{MOCK_STREAM, MockGateway};

    fn question() -> serde_json::Value {
        json!({ "messages": [{ "role": "user", "content": "How many vacation days do I get?" }] })
    }

    #[tokio::test]
    async fn allowed_request_streams_upstream_answer() {
        let mock = MockGateway::spawn(200).await;
        let app = router(state(&mock.url, 10));

        let response = app.oneshot(post_json("/api/labour-law-chat", "1.2.3.4", &question())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");
        assert_eq!(text_body(response).await, MOCK_STREAM);

        let sent = mock.last_body().unwrap();
        assert_eq!(sent["messages"][0]["role"], "system");
        assert_eq!(sent["messages"][1]["content"], "How many vacation days do I get?");
        assert_eq!(sent["stream"], true);
    }

    #[tokio::test]
    async fn denied_request_never_reaches_gateway() {
        let mock = MockGateway::spawn(200).await;
        let app = router(state(&mock.url, 2));

        for _ in 0..2 {
            let response =
                app.clone().oneshot(post_json("/api/labour-law-chat", "1.2.3.4", &question())).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.clone().oneshot(post_json("/api/labour-law-chat", "1.2.3.4", &question())).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["retry-after"], "72000");
        let body = json_body(response).await;
        assert_eq!(body["retry_after_hours"], 20);
        assert_eq!(mock.hits(), 2);

        // Another client is unaffected
        let response = app.oneshot(post_json("/api/labour-law-chat", "5.6.7.8", &question())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(mock.hits(), 3);
    }

    #[tokio::test]
    async fn rotating_forwarded_for_does_not_add_quota() {
        let mock = MockGateway::spawn(200).await;
        let app = router(state(&mock.url, 2));

        let mut allowed = 0;
        for i in 0..20 {
            let hops = format!("9.9.9.{i}, 10.0.0.1");
            let response = app.clone().oneshot(post_json("/api/labour-law-chat", &hops, &question())).await.unwrap();
            if response.status() == StatusCode::OK {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 2);
        assert_eq!(mock.hits(), 2);
    }

    #[tokio::test]
    async fn empty_conversation_is_rejected_without_using_quota() {
        let mock = MockGateway::spawn(200).await;
        let state = state(&mock.url, 10);
        let app = router(Arc::clone(&state));

        let response =
            app.oneshot(post_json("/api/labour-law-chat", "1.2.3.4", &json!({ "messages": [] }))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.limiter.store().get("1.2.3.4", "labour-law-chat").unwrap().is_none());
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn upstream_rate_limit_is_reported_as_429() {
        let mock = MockGateway::spawn(429).await;
        let app = router(state(&mock.url, 10));

        let response = app.oneshot(post_json("/api/labour-law-chat", "1.2.3.4", &question())).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Rate limit exceeded. Please try again later.");
    }

    struct BrokenStore;

    impl RateLimitStore for BrokenStore {
        fn purge_before(&self, _: DateTime<Utc>) -> Result<usize, StoreError> {
            Err(StoreError::Corrupt("unreachable".to_string()))
        }

        fn update(&self, _: &str, _: &str, _: Update<'_>) -> Result<(), StoreError> {
            Err(StoreError::Corrupt("unreachable".to_string()))
        }

        fn get(&self, _: &str, _: &str) -> Result<Option<RateLimitRecord>, StoreError> {
            Err(StoreError::Corrupt("unreachable".to_string()))
        }

        fn count(&self) -> Result<usize, StoreError> {
            Err(StoreError::Corrupt("unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn store_failure_fails_closed_with_503() {
        let mock = MockGateway::spawn(200).await;
        let app = router(state_with(Arc::new(BrokenStore), &mock.url, 10));

        let response = app.oneshot(post_json("/api/labour-law-chat", "1.2.3.4", &question())).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Rate limit check failed");
        assert_eq!(mock.hits(), 0);
    }
}
