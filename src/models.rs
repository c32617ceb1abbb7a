use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Working days used to turn a daily meal-voucher value into a monthly one.
pub const VOUCHER_WORKING_DAYS: f64 = 22.0;

// One anonymized compensation submission, as stored upstream
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CompensationRecord {
    pub gross_salary: f64,
    pub net_salary: f64,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub company_size: String,
    #[serde(default)]
    pub has_meal_vouchers: Option<bool>,
    #[serde(default)]
    pub meal_vouchers_value: Option<f64>,
    #[serde(default)]
    pub has_health_insurance: Option<bool>,
    #[serde(default)]
    pub has_life_insurance: Option<bool>,
    #[serde(default)]
    pub paid_leave_days: Option<u32>,
    #[serde(default)]
    pub tenure_years: Option<f64>,
    #[serde(default)]
    pub work_model: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
}

impl CompensationRecord {
    pub fn meal_vouchers(&self) -> bool {
        self.has_meal_vouchers.unwrap_or(false)
    }

    pub fn health_insurance(&self) -> bool {
        self.has_health_insurance.unwrap_or(false)
    }

    pub fn life_insurance(&self) -> bool {
        self.has_life_insurance.unwrap_or(false)
    }

    /// Monthly benefits value in RON. Only meal vouchers are counted.
    pub fn monthly_benefits(&self) -> f64 {
        if self.meal_vouchers() {
            self.meal_vouchers_value.unwrap_or(0.0) * VOUCHER_WORKING_DAYS
        } else {
            0.0
        }
    }
}

// Rate limit state for one (identity, endpoint) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitRecord {
    pub identity: String,
    pub endpoint: String,
    pub request_count: u32,
    pub window_start: DateTime<Utc>,
    pub last_request_at: DateTime<Utc>,
}

impl RateLimitRecord {
    pub fn fresh(identity: &str, endpoint: &str, now: DateTime<Utc>) -> Self {
        Self {
            identity: identity.to_string(),
            endpoint: endpoint.to_string(),
            request_count: 1,
            window_start: now,
            last_request_at: now,
        }
    }
}

// OpenAI-compatible chat message
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

// Labour-law chat request format
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

// Market analysis request format
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub user: Option<CompensationRecord>,
    #[serde(default)]
    pub market: Vec<CompensationRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

// Benchmarks request format
#[derive(Debug, Deserialize)]
pub struct BenchmarksRequest {
    pub city: String,
    pub records: Vec<CompensationRecord>,
    #[serde(default)]
    pub gross_salary: Option<f64>,
}
