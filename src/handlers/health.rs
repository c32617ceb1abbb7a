use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::warn;

use super::run_blocking;
use crate::state::AppState;

// health handler, also probes the rate limit store
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = Arc::clone(state.limiter.store());
    let timestamp = chrono::Utc::now().to_rfc3339();

    match run_blocking(move || store.count()).await {
        Ok(Ok(records)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "rate_limit_records": records,
                "timestamp": timestamp
            })),
        ),
        Ok(Err(err)) => {
            warn!(error = %err, "rate limit store unavailable");
            degraded(timestamp)
        }
        Err(err) => {
            warn!(error = %err, "health probe failed");
            degraded(timestamp)
        }
    }
}

fn degraded(timestamp: String) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "status": "degraded",
            "timestamp": timestamp
        })),
    )
}
