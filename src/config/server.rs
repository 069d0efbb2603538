//! Server and upstream configuration types.
//!
//! This module defines:
//! - Address, port and worker thread bindings for the edge proxy
//! - The image backend that receives rewritten requests
//!
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ADDRESS, DEFAULT_PORT, DEFAULT_THREADS, DEFAULT_UPSTREAM_TIMEOUT_SECS};

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// Default worker thread count
fn default_threads() -> usize {
    DEFAULT_THREADS
}

fn default_upstream_timeout() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            threads: default_threads(),
        }
    }
}

impl ServerConfig {
    /// `address:port` string for the TCP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// Image backend that receives rewritten requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Backend base URL (e.g., "http://imgproxy:8080")
    pub endpoint: String,
    /// Connect/read/write timeout in seconds (default: 30)
    #[serde(default = "default_upstream_timeout")]
    pub timeout: u64,
}

/// Host, port and TLS flag parsed from an upstream endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamAddress {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
}

impl UpstreamConfig {
    /// Parse the endpoint into host, port and TLS flag
    ///
    /// Returns None if the endpoint has no http/https scheme or no host.
    pub fn address(&self) -> Option<UpstreamAddress> {
        let (use_tls, rest) = if let Some(rest) = self.endpoint.strip_prefix("https://") {
            (true, rest)
        } else if let Some(rest) = self.endpoint.strip_prefix("http://") {
            (false, rest)
        } else {
            return None;
        };

        let authority = rest.split('/').next().unwrap_or_default();
        let default_port = if use_tls { 443 } else { 80 };

        let (host, port) = match authority.split_once(':') {
            Some((h, p)) => (h, p.parse::<u16>().ok()?),
            None => (authority, default_port),
        };

        if host.is_empty() {
            return None;
        }

        Some(UpstreamAddress {
            host: host.to_string(),
            port,
            use_tls,
        })
    }
}
