use axum::Json;
use serde::Serialize;

use crate::benchmarks::{
    BenefitCoverage, CityAverage, ExperienceBenchmark, SalaryPosition, benefit_coverage, city_averages,
    experience_benchmarks, salary_position,
};
use crate::metrics::REQUEST_TOTAL;
use crate::models::{BenchmarksRequest, CompensationRecord};

#[derive(Debug, Serialize)]
pub struct BenchmarksResponse {
    pub city: String,
    pub by_experience: Vec<ExperienceBenchmark>,
    pub by_city: Vec<CityAverage>,
    // Absent when the city has no submissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<SalaryPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<BenefitCoverage>,
}

pub async fn benchmarks_handler(Json(payload): Json<BenchmarksRequest>) -> Json<BenchmarksResponse> {
    REQUEST_TOTAL.inc();

    let in_city: Vec<CompensationRecord> =
        payload.records.iter().filter(|r| r.city == payload.city).cloned().collect();

    // Empty inputs mean "not enough data", so those sections are left out
    let position = payload.gross_salary.and_then(|gross| salary_position(&in_city, gross).ok());
    let coverage = benefit_coverage(&in_city).ok();

    Json(BenchmarksResponse {
        by_experience: experience_benchmarks(&payload.records, &payload.city),
        by_city: city_averages(&payload.records),
        position,
        coverage,
        city: payload.city,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::handlers::router;
    use crate::handlers::test_support::{json_body, post_json, state};

    #[tokio::test]
    async fn benchmarks_for_city_with_data() {
        let app = router(state("http://127.0.0.1:9", 10));
        let body = json!({
            "city": "Iași",
            "gross_salary": 8000,
            "records": [
                { "gross_salary": 5000, "net_salary": 2925, "city": "Iași", "experience_level": "junior", "company_size": "1-10" },
                { "gross_salary": 9000, "net_salary": 5265, "city": "Iași", "experience_level": "mid", "company_size": "50-200",
                  "has_meal_vouchers": true, "meal_vouchers_value": 40 },
                { "gross_salary": 15000, "net_salary": 8775, "city": "Cluj-Napoca", "experience_level": "senior", "company_size": "1000+" }
            ]
        });

        let response = app.oneshot(post_json("/api/benchmarks", "1.2.3.4", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let out = json_body(response).await;

        assert_eq!(out["city"], "Iași");
        assert_eq!(out["by_experience"].as_array().unwrap().len(), 2);
        assert_eq!(out["by_experience"][1]["avg_benefits"], 880);
        assert_eq!(out["by_city"].as_array().unwrap().len(), 2);
        assert_eq!(out["position"]["percentile"], 50);
        assert_eq!(out["position"]["sample_size"], 2);
        assert_eq!(out["coverage"]["meal_vouchers"], 50);
    }

    #[tokio::test]
    async fn empty_city_omits_derived_sections() {
        let app = router(state("http://127.0.0.1:9", 10));
        let body = json!({
            "city": "Brașov",
            "gross_salary": 8000,
            "records": [{ "gross_salary": 5000, "net_salary": 2925, "city": "Iași" }]
        });

        let response = app.oneshot(post_json("/api/benchmarks", "1.2.3.4", &body)).await.unwrap();
        let out = json_body(response).await;
        assert!(out["by_experience"].as_array().unwrap().is_empty());
        assert!(out.get("position").is_none());
        assert!(out.get("coverage").is_none());
    }
}
