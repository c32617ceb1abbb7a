use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::inflation::{Adjustment, Direction};
use crate::stats::round_one_decimal;
use crate::metrics::REQUEST_TOTAL;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InflationRequest {
    pub salary: f64,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct RatePeriod {
    pub year: String,
    pub rate: f64,
}

#[derive(Debug, Serialize)]
pub struct InflationRates {
    pub periods: Vec<RatePeriod>,
    pub cumulative_percent: f64,
}

pub async fn inflation_rates_handler(State(state): State<Arc<AppState>>) -> Json<InflationRates> {
    let periods = state
        .inflation
        .periods()
        .iter()
        .map(|(year, rate)| RatePeriod { year: year.clone(), rate: *rate })
        .collect();
    Json(InflationRates { periods, cumulative_percent: round_one_decimal(state.inflation.cumulative_percent()) })
}

pub async fn inflation_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InflationRequest>,
) -> Result<Json<Adjustment>, ApiError> {
    REQUEST_TOTAL.inc();
    let adjustment = state.inflation.adjust(payload.salary, payload.direction)?;
    Ok(Json(adjustment))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::handlers::router;
    use crate::handlers::test_support::{get, json_body, post_json, state};

    #[tokio::test]
    async fn forward_adjustment() {
        let app = router(state("http://127.0.0.1:9", 10));
        let response =
            app.oneshot(post_json("/api/inflation", "1.2.3.4", &json!({ "salary": 5000 }))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let out = json_body(response).await;
        assert_eq!(out["adjusted"], 7196);
        assert_eq!(out["percent_change"], 43.9);
        assert_eq!(out["breakdown"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn invalid_salary_is_bad_request() {
        let app = router(state("http://127.0.0.1:9", 10));
        let body = json!({ "salary": -1, "direction": "backward" });
        let response = app.oneshot(post_json("/api/inflation", "1.2.3.4", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rate_table_lists_periods_oldest_first() {
        let app = router(state("http://127.0.0.1:9", 10));
        let response = app.oneshot(get("/api/inflation", "1.2.3.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let out = json_body(response).await;
        assert_eq!(out["periods"][0]["year"], "2020-2021");
        assert_eq!(out["periods"][4]["rate"], 4.5);
        assert_eq!(out["cumulative_percent"], 43.9);
    }
}
