//! Listener configuration

use crate::error::{Result, ServerError};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port 0 binds an ephemeral port
    pub http_port: u16,
    /// How long graceful shutdown waits for open connections
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, http_port: u16) -> Self {
        Self {
            host: host.into(),
            http_port,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn http_addr(&self) -> Result<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.http_port);
        raw.parse().map_err(|_| ServerError::InvalidAddress(raw))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", DEFAULT_HTTP_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_http_addr() {
        let config = ServerConfig::new("127.0.0.1", 8181);
        assert_eq!(config.http_addr().unwrap().port(), 8181);
        assert_eq!(config.shutdown_timeout, DEFAULT_SHUTDOWN_TIMEOUT);
    }

    #[test]
    fn test_hostname_is_rejected() {
        let config = ServerConfig::new("scores.local", 80);
        assert_matches!(config.http_addr(), Err(ServerError::InvalidAddress(addr)) if addr == "scores.local:80");
    }
}
