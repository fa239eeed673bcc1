//! Runtime settings, parsed from flags and environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Args;

/// Desktop Chrome on Windows; some targets refuse requests without a browser UA.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetcher settings.
#[derive(Args, Debug, Clone)]
pub struct ScannerConfig {
    /// User-Agent header sent with every scan request
    #[arg(long, env = "VANGUARD_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Upper bound for the whole fetch, in seconds
    #[arg(long, env = "VANGUARD_TIMEOUT_SECS", default_value_t = 20)]
    pub timeout_secs: u64,

    /// Maximum number of redirects followed before the scan fails
    #[arg(long, env = "VANGUARD_MAX_REDIRECTS", default_value_t = 5)]
    pub max_redirects: usize,
}

impl ScannerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { user_agent: DEFAULT_USER_AGENT.to_string(), timeout_secs: 20, max_redirects: 5 }
    }
}

/// HTTP API settings.
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the API to
    #[arg(long, env = "VANGUARD_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Origin allowed to call the API from a browser
    #[arg(long, env = "VANGUARD_CORS_ORIGIN", default_value = "http://localhost:3000")]
    pub cors_origin: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}
