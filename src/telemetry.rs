use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// Installs the global tracing subscriber.
//
// `RUST_LOG` takes precedence over `log_level` when set.
pub fn init_tracing(log_level: &str, json: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
            .map_err(|e| format!("Failed to set global tracing subscriber: {e}"))?;
    } else {
        registry
            .with(fmt::layer().with_target(false))
            .try_init()
            .map_err(|e| format!("Failed to set global tracing subscriber: {e}"))?;
    }

    Ok(())
}
