mod analysis;
mod benchmarks;
mod chat;
mod health;
mod inflation;
mod metrics;
mod rate_limit;

pub use analysis::market_analysis_handler;
pub use benchmarks::benchmarks_handler;
pub use chat::labour_law_chat_handler;
pub use health::health_handler;
pub use inflation::{inflation_handler, inflation_rates_handler};
pub use metrics::metrics_handler;
pub use rate_limit::rate_limit_status_handler;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::identity::ClientAddr;
use crate::state::AppState;

pub const CHAT_ENDPOINT: &str = "labour-law-chat";
pub const ANALYSIS_ENDPOINT: &str = "market-analysis";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/labour-law-chat", post(labour_law_chat_handler))
        .route("/api/market-analysis", post(market_analysis_handler))
        .route("/api/benchmarks", post(benchmarks_handler))
        .route("/api/inflation", get(inflation_rates_handler).post(inflation_handler))
        .route("/api/rate-limit/{endpoint}", get(rate_limit_status_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Store calls may block on SQLite locks, keep them off the async workers
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))
}

/// Runs the rate limit check for `endpoint`. Must pass before any upstream call.
async fn enforce_rate_limit(state: &AppState, addr: &ClientAddr, endpoint: &'static str) -> Result<(), ApiError> {
    let limiter = state.limiter.clone();
    let identity = state.identity(addr);

    let decision = run_blocking(move || limiter.check_and_record(&identity, endpoint, Utc::now())).await??;
    if decision.is_allowed() {
        return Ok(());
    }
    let retry_after_hours = decision.retry_after_hours().unwrap_or_default();
    Err(ApiError::TooManyRequests { retry_after_hours })
}
