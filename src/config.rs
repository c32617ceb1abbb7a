use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    // In-process map, lost on restart
    Memory,
    // SQLite file shareable between processes
    Sqlite,
}

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "paybench-gateway")]
#[command(about = "Salary benchmarking API with a rate limited AI gateway")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 10)]
    pub rate_limit: u32,

    // Rate limit window in hours
    #[arg(long, env = "RATE_WINDOW_HOURS", default_value_t = 20)]
    pub rate_window_hours: i64,

    // Sweep expired rate limit records before every check
    #[arg(long, env = "PURGE_ON_CHECK", default_value_t = true, action = clap::ArgAction::Set)]
    pub purge_on_check: bool,

    // Background sweep interval in seconds (0 disables it)
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = 3600)]
    pub sweep_interval_secs: u64,

    #[arg(long, env = "RATE_LIMIT_STORE", value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    // SQLite database file (only with --store sqlite)
    #[arg(long, env = "RATE_LIMIT_DATABASE", default_value = "rate_limits.db")]
    pub database: String,

    // OpenAI-compatible gateway base url
    #[arg(long, env = "GATEWAY_URL", default_value = "https://ai.gateway.lovable.dev")]
    pub gateway_url: String,

    #[arg(long, env = "GATEWAY_API_KEY", hide_env_values = true)]
    pub gateway_api_key: Option<String>,

    #[arg(long, env = "GATEWAY_MODEL", default_value = "google/gemini-2.5-flash")]
    pub model: String,

    #[arg(long, env = "GATEWAY_TIMEOUT_SECS", default_value_t = 60)]
    pub gateway_timeout_secs: u64,

    // Store SHA-256 of client addresses instead of the addresses
    #[arg(long, env = "HASH_IDENTITIES", default_value_t = true, action = clap::ArgAction::Set)]
    pub hash_identities: bool,

    // Reverse proxies in front of the gateway that append to X-Forwarded-For.
    // 0 ignores the header and keys clients by socket address
    #[arg(long, env = "TRUSTED_PROXY_HOPS", default_value_t = 0)]
    pub trusted_proxy_hops: usize,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.rate_limit == 0 {
            return Err("--rate-limit must be at least 1".to_string());
        }
        if self.rate_window_hours <= 0 {
            return Err("--rate-window-hours must be positive".to_string());
        }
        if self.gateway_url.trim().is_empty() {
            return Err("--gateway-url must not be empty".to_string());
        }
        Ok(())
    }
}
