use crate::gateway::GatewayClient;
use crate::identity::{ClientAddr, hash_identity};
use crate::inflation::InflationTable;
use crate::rate_limit::RateLimiter;

// app's shared state
pub struct AppState {
    pub limiter: RateLimiter,
    pub gateway: GatewayClient,
    pub inflation: InflationTable,
    pub hash_identities: bool,      // store sha256(ip) instead of ip
    pub trusted_proxy_hops: usize,  // proxies that append to X-Forwarded-For
}

impl AppState {
    // Rate limit identity for a caller.
    pub fn identity(&self, addr: &ClientAddr) -> String {
        let raw = addr.resolve(self.trusted_proxy_hops);
        if self.hash_identities { hash_identity(raw) } else { raw.to_string() }
    }
}
