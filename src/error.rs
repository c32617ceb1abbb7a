use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures of the backing rate limit store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("corrupt rate limit record: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// The limiter could not reach a decision. Callers treat this as a denial.
#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("rate limit check failed: {0}")]
    CheckFailed(#[from] StoreError),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsError {
    #[error("cannot aggregate an empty set of values")]
    EmptyInput,

    #[error("cannot compute a percentage of zero records")]
    DivisionByZero,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InflationError {
    #[error("salary must be a positive number, got {0}")]
    InvalidSalary(f64),
}

/// Errors talking to the AI gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("gateway API key not configured")]
    MissingApiKey,

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway rate limit exceeded")]
    RateLimited,

    #[error("gateway requires payment")]
    PaymentRequired,

    #[error("gateway returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("gateway response malformed: {0}")]
    Malformed(String),
}

/// HTTP-facing error. Renders as `{"error": "..."}` with a mapped status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Too many requests. Retry after {retry_after_hours} hours.")]
    TooManyRequests { retry_after_hours: u32 },

    #[error("Rate limit check failed")]
    RateLimitCheck(#[from] RateLimitError),

    #[error("Rate limit exceeded. Please try again later.")]
    UpstreamRateLimited,

    #[error("Payment required. Please add credits to your workspace.")]
    PaymentRequired,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("AI gateway error")]
    Gateway(GatewayError),

    #[error("{0}")]
    Internal(String),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::RateLimited => ApiError::UpstreamRateLimited,
            GatewayError::PaymentRequired => ApiError::PaymentRequired,
            GatewayError::MissingApiKey => ApiError::Internal(err.to_string()),
            other => ApiError::Gateway(other),
        }
    }
}

impl From<InflationError> for ApiError {
    fn from(err: InflationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::TooManyRequests { .. } | ApiError::UpstreamRateLimited => {
                StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::RateLimitCheck(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Gateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Gateway(inner) => tracing::error!(error = %inner, "AI gateway error"),
            ApiError::RateLimitCheck(inner) => tracing::error!(error = %inner, "rate limit check failed"),
            ApiError::Internal(msg) => tracing::error!(error = %msg, "internal error"),
            _ => {}
        }

        let body = match &self {
            ApiError::TooManyRequests { retry_after_hours } => serde_json::json!({
                "error": self.to_string(),
                "retry_after_hours": retry_after_hours,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::TooManyRequests { retry_after_hours } = self {
            let seconds = u64::from(retry_after_hours) * 3600;
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_failure_is_distinct_from_denial() {
        let failed = ApiError::RateLimitCheck(RateLimitError::CheckFailed(StoreError::Poisoned));
        let denied = ApiError::TooManyRequests { retry_after_hours: 3 };
        assert_eq!(failed.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn denial_sets_retry_after_seconds() {
        let response = ApiError::TooManyRequests { retry_after_hours: 2 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "7200");
    }

    #[test]
    fn gateway_statuses_pass_through() {
        assert_eq!(ApiError::from(GatewayError::RateLimited).status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::from(GatewayError::PaymentRequired).status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            ApiError::from(GatewayError::Upstream { status: 500, body: String::new() }).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(GatewayError::MissingApiKey).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
