// fixed-window rate limiting per (identity, endpoint)
// denials never touch the stored record

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::RateLimitError;
use crate::metrics::{RATE_LIMIT_ALLOWED, RATE_LIMIT_DENIED, RATE_LIMIT_FAILED, RATE_LIMIT_PURGED};
use crate::models::RateLimitRecord;
use crate::store::RateLimitStore;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: TimeDelta,
    // Sweep expired records before every check.
    pub purge_on_check: bool,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self { max_requests: 10, window: TimeDelta::hours(20), purge_on_check: true }
    }
}

impl RateLimitPolicy {
    pub fn window_hours(&self) -> f64 {
        self.window.num_milliseconds() as f64 / MILLIS_PER_HOUR
    }
}

// Outcome of [`RateLimiter::check_and_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RateLimitDecision {
    Allowed { request_count: u32 },
    Denied { retry_after_hours: u32 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }

    pub fn retry_after_hours(&self) -> Option<u32> {
        match self {
            RateLimitDecision::Denied { retry_after_hours } => Some(*retry_after_hours),
            RateLimitDecision::Allowed { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &Arc<dyn RateLimitStore> {
        &self.store
    }

    // Deletes records whose window started more than one window ago.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, RateLimitError> {
        let purged = self.store.purge_before(now - self.policy.window)?;
        if purged > 0 {
            RATE_LIMIT_PURGED.inc_by(purged as f64);
            debug!(purged, "purged expired rate limit records");
        }
        Ok(purged)
    }

    // Decides whether `identity` may call `endpoint` at `now` and records the
    // request when it may. Any store failure is an error, never an allow.
    pub fn check_and_record(
        &self,
        identity: &str,
        endpoint: &str,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision, RateLimitError> {
        let result = self.try_check(identity, endpoint, now);

        match &result {
            Ok(RateLimitDecision::Allowed { request_count }) => {
                RATE_LIMIT_ALLOWED.with_label_values(&[endpoint]).inc();
                debug!(endpoint, request_count, "rate limit check passed");
            }
            Ok(RateLimitDecision::Denied { retry_after_hours }) => {
                RATE_LIMIT_DENIED.with_label_values(&[endpoint]).inc();
                info!(endpoint, retry_after_hours, "rate limit exceeded");
            }
            Err(err) => {
                RATE_LIMIT_FAILED.with_label_values(&[endpoint]).inc();
                warn!(endpoint, error = %err, "rate limit check failed, denying");
            }
        }
        result
    }

    fn try_check(
        &self,
        identity: &str,
        endpoint: &str,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision, RateLimitError> {
        if self.policy.purge_on_check {
            self.purge_expired(now)?;
        }

        let policy = self.policy;
        let mut decision = RateLimitDecision::Denied { retry_after_hours: 0 };

        self.store.update(identity, endpoint, &mut |current| {
            let (next, outcome) = decide(&policy, identity, endpoint, current, now);
            decision = outcome;
            next
        })?;

        Ok(decision)
    }
}

// Background sweep of expired windows - runs every `every`
pub async fn sweeper(limiter: RateLimiter, every: std::time::Duration) {
    let mut interval = tokio::time::interval(every);

    info!(interval = ?every, "rate limit sweeper started");

    loop {
        interval.tick().await;

        let limiter = limiter.clone();
        match tokio::task::spawn_blocking(move || limiter.purge_expired(Utc::now())).await {
            Ok(Ok(purged)) => debug!(purged, "rate limit sweep finished"),
            Ok(Err(err)) => warn!(error = %err, "rate limit sweep failed"),
            Err(err) => warn!(error = %err, "rate limit sweep task panicked"),
        }
    }
}

// Pure window arithmetic. Returns the record to write (if any) and the decision.
fn decide(
    policy: &RateLimitPolicy,
    identity: &str,
    endpoint: &str,
    current: Option<&RateLimitRecord>,
    now: DateTime<Utc>,
) -> (Option<RateLimitRecord>, RateLimitDecision) {
    let Some(record) = current else {
        let fresh = RateLimitRecord::fresh(identity, endpoint, now);
        return (Some(fresh), RateLimitDecision::Allowed { request_count: 1 });
    };

    // A window that starts in the future counts as just opened.
    let elapsed_hours = ((now - record.window_start).num_milliseconds() as f64 / MILLIS_PER_HOUR).max(0.0);
    let window_hours = policy.window_hours();

    if elapsed_hours >= window_hours {
        let fresh = RateLimitRecord::fresh(identity, endpoint, now);
        return (Some(fresh), RateLimitDecision::Allowed { request_count: 1 });
    }

    if record.request_count >= policy.max_requests {
        let retry_after_hours = (window_hours - elapsed_hours).ceil() as u32;
        return (None, RateLimitDecision::Denied { retry_after_hours });
    }

    let next = RateLimitRecord {
        request_count: record.request_count + 1,
        last_request_at: now,
        ..record.clone()
    };
    let request_count = next.request_count;
    (Some(next), RateLimitDecision::Allowed { request_count })
}
