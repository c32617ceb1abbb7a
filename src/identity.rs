use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};

// Identity used when neither a forwarded address nor a peer address is known.
// All such callers share one rate limit bucket.
pub const UNKNOWN_CLIENT: &str = "unknown";

// Client address as seen by the gateway, before any hashing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr {
    // X-Forwarded-For hops, left to right
    pub forwarded: Vec<String>,
    pub peer: Option<String>,
}

impl ClientAddr {
    // hop appended by the outermost trusted proxy, `trusted_hops` from the right.
    // entries left of it are client supplied. falls back to the socket peer
    pub fn resolve(&self, trusted_hops: usize) -> &str {
        let forwarded = match trusted_hops {
            0 => None,
            n => self.forwarded.len().checked_sub(n).map(|i| self.forwarded[i].as_str()),
        };
        forwarded.or(self.peer.as_deref()).unwrap_or(UNKNOWN_CLIENT)
    }
}

fn forwarded_hops(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

impl<S: Send + Sync> FromRequestParts<S> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(ClientAddr { forwarded: forwarded_hops(&parts.headers), peer })
    }
}

// Hex SHA-256 of the identity, so raw addresses never reach the store
pub fn hash_identity(identity: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    format!("{:x}", hasher.finalize())
}
