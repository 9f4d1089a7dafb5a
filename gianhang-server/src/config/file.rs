//! TOML file configuration structures.
//!
//! These structs directly map to the `gianhang-config.toml` file format.

use gianhang_core::workflow::PollPolicy;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub supplier: SupplierConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// Upstream reseller configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierConfig {
    /// Root URL of the reseller API.
    pub base_url: Url,
    /// Account-level token authenticating this shop at the reseller.
    pub user_token: String,
    /// Fulfillment poll budget (supplier calls per purchase request).
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
    /// Fixed delay between fulfillment polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_max_attempts() -> u32 {
    PollPolicy::DEFAULT_MAX_ATTEMPTS
}

fn default_poll_interval_ms() -> u64 {
    PollPolicy::DEFAULT_INTERVAL.as_millis() as u64
}

impl SupplierConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.poll_max_attempts,
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}
