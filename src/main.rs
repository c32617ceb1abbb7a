mod benchmarks;
mod config;
mod error;
mod gateway;
mod handlers;
mod identity;
mod inflation;
mod metrics;
mod models;
mod prompts;
mod rate_limit;
mod state;
mod stats;
mod store;
mod telemetry;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use clap::Parser;
use tracing::{info, warn};

use crate::config::{Args, StoreKind};
use crate::gateway::GatewayClient;
use crate::inflation::InflationTable;
use crate::rate_limit::{RateLimitPolicy, RateLimiter, sweeper};
use crate::state::AppState;
use crate::store::{MemoryStore, RateLimitStore, SqliteStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // parse cli arguments
    let args = Args::parse();
    telemetry::init_tracing(&args.log_level, args.log_json)?;
    args.validate()?;

    let store: Arc<dyn RateLimitStore> = match args.store {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Sqlite => Arc::new(SqliteStore::open(&args.database)?),
    };
    let window = TimeDelta::try_hours(args.rate_window_hours).ok_or("--rate-window-hours out of range")?;
    let policy = RateLimitPolicy { max_requests: args.rate_limit, window, purge_on_check: args.purge_on_check };
    let limiter = RateLimiter::new(store, policy);

    let client = reqwest::Client::builder().timeout(Duration::from_secs(args.gateway_timeout_secs)).build()?;
    let gateway = GatewayClient::new(client, args.gateway_url.clone(), args.gateway_api_key.clone(), args.model.clone());
    if !gateway.has_api_key() {
        warn!("GATEWAY_API_KEY not set, AI endpoints will fail");
    }

    // background sweep of expired windows
    if args.sweep_interval_secs > 0 {
        tokio::spawn(sweeper(limiter.clone(), Duration::from_secs(args.sweep_interval_secs)));
    }

    // creating shared state
    let state = Arc::new(AppState {
        limiter,
        gateway,
        inflation: InflationTable::default(),
        hash_identities: args.hash_identities,
        trusted_proxy_hops: args.trusted_proxy_hops,
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(port = args.port, "gateway running");
    info!(url = %args.gateway_url, model = %args.model, "forwarding AI requests");
    info!(
        store = ?args.store,
        limit = args.rate_limit,
        window_hours = args.rate_window_hours,
        "rate limit configured"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
