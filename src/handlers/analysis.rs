use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use super::{ANALYSIS_ENDPOINT, enforce_rate_limit};
use crate::benchmarks::market_summary;
use crate::error::ApiError;
use crate::identity::ClientAddr;
use crate::metrics::REQUEST_TOTAL;
use crate::models::{AnalysisRequest, AnalysisResponse, ChatMessage};
use crate::prompts::{MARKET_ANALYSIS_SYSTEM_PROMPT, analysis_prompt};
use crate::state::AppState;

pub async fn market_analysis_handler(
    State(state): State<Arc<AppState>>,
    addr: ClientAddr,
    Json(payload): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    REQUEST_TOTAL.inc();

    enforce_rate_limit(&state, &addr, ANALYSIS_ENDPOINT).await?;

    let summary = market_summary(&payload.market);
    let messages = [
        ChatMessage::system(MARKET_ANALYSIS_SYSTEM_PROMPT),
        ChatMessage::user(analysis_prompt(payload.user.as_ref(), summary.as_ref())),
    ];

    let analysis = state.gateway.complete(&messages).await?;
    Ok(Json(AnalysisResponse { analysis }))
}
