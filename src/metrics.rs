use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Histogram, register_counter, register_counter_vec, register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("paybench_requests_total", "Total number of API requests").unwrap();
    pub static ref RATE_LIMIT_ALLOWED: CounterVec = register_counter_vec!(
        "paybench_rate_limit_allowed_total",
        "Requests admitted by the rate limiter",
        &["endpoint"]
    )
    .unwrap();
    pub static ref RATE_LIMIT_DENIED: CounterVec = register_counter_vec!(
        "paybench_rate_limit_denied_total",
        "Requests rejected by the rate limiter",
        &["endpoint"]
    )
    .unwrap();
    pub static ref RATE_LIMIT_FAILED: CounterVec = register_counter_vec!(
        "paybench_rate_limit_failed_total",
        "Rate limit checks that failed and were denied",
        &["endpoint"]
    )
    .unwrap();
    pub static ref RATE_LIMIT_PURGED: Counter = register_counter!(
        "paybench_rate_limit_purged_total",
        "Expired rate limit records deleted"
    )
    .unwrap();
    pub static ref GATEWAY_LATENCY: Histogram = register_histogram!(
        "paybench_gateway_latency_seconds",
        "AI gateway request latency in seconds"
    )
    .unwrap();
    pub static ref GATEWAY_ERRORS: Counter =
        register_counter!("paybench_gateway_errors_total", "Failed AI gateway requests").unwrap();
}
