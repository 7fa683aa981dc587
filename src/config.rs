use crate::store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,

    /// Enable permissive CORS
    #[serde(default)]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Answer 404 when an update or delete matches no book
    #[serde(default)]
    pub strict_not_found: bool,

    /// Document store settings
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_kb: default_max_body_size_kb(),
            enable_cors: false,
            log_level: default_log_level(),
            strict_not_found: false,
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `bookstore` file and environment
    /// variables prefixed with `BOOKSTORE__` (e.g. `BOOKSTORE__STORE__URI`).
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("bookstore").required(false))
            .add_source(
                config::Environment::with_prefix("BOOKSTORE")
                    .separator("__")
                    .try_parsing(true),
            );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_kb() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreBackend;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.max_body_size(), 1024 * 1024);
        assert!(!cfg.enable_cors);
        assert!(!cfg.strict_not_found);
        assert_eq!(cfg.store.backend, StoreBackend::Mongo);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: ServerConfig = serde_json::from_value(serde_json::json!({
            "port": 9000,
            "store": { "backend": "memory", "unique_isbn": true }
        }))
        .unwrap();

        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.bind_addr, "127.0.0.1");
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert!(cfg.store.unique_isbn);
        assert_eq!(cfg.store.collection, "books");
    }
}
