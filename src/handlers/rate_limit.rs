use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use super::run_blocking;
use crate::error::{ApiError, RateLimitError};
use crate::identity::ClientAddr;
use crate::models::RateLimitRecord;
use crate::state::AppState;

// Caller's own rate limit record for an endpoint (diagnostics)
pub async fn rate_limit_status_handler(
    State(state): State<Arc<AppState>>,
    Path(endpoint): Path<String>,
    addr: ClientAddr,
) -> Result<Json<RateLimitRecord>, ApiError> {
    let identity = state.identity(&addr);
    let store = Arc::clone(state.limiter.store());

    let lookup_endpoint = endpoint.clone();
    let record = run_blocking(move || store.get(&identity, &lookup_endpoint))
        .await?
        .map_err(RateLimitError::from)?;

    record
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no rate limit record for {endpoint}")))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::handlers::router;
    use crate::handlers::test_support::{get, json_body, post_json, state};
    use crate::testing::MockGateway;

    #[tokio::test]
    async fn reports_callers_own_counter() {
        let mock = MockGateway::spawn(200).await;
        let app = router(state(&mock.url, 10));
        let chat = json!({ "messages": [{ "role": "user", "content": "salariu minim?" }] });

        for _ in 0..3 {
            app.clone().oneshot(post_json("/api/labour-law-chat", "1.2.3.4", &chat)).await.unwrap();
        }

        let response = app.clone().oneshot(get("/api/rate-limit/labour-law-chat", "1.2.3.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let record = json_body(response).await;
        assert_eq!(record["request_count"], 3);
        assert_eq!(record["identity"], "1.2.3.4");

        let response = app.oneshot(get("/api/rate-limit/labour-law-chat", "5.6.7.8")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
