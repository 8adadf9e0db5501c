//! Configuration types

use cuttlefish_core::{GATEWAY_TIMEOUT, SERVER_NAME};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Gateway configuration
    pub gateway: GatewayConfig,

    /// Proxy resources served under `/<name>/`
    #[serde(default = "default_mounts")]
    pub mounts: Vec<MountConfig>,

    /// Exchange table housekeeping
    #[serde(default)]
    pub exchange: ExchangeConfig,

    /// Downstream forwarders
    #[serde(default)]
    pub downstream: DownstreamConfig,

    /// Observability
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    /// Listen address
    pub listen: SocketAddr,

    /// Runtime worker threads (0 = number of CPUs)
    #[serde(default)]
    pub workers: usize,

    /// How long an HTTP caller waits for the correlated response
    #[serde(default = "default_gateway_timeout", with = "humantime_serde")]
    pub gateway_timeout: Duration,

    /// Graceful shutdown timeout (wait for in-flight requests)
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Max request body size (bytes)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Body of the answer for paths outside every mount
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

impl GatewayConfig {
    /// Gateway settings with defaults for everything but the address
    pub fn with_listen(listen: SocketAddr) -> Self {
        Self {
            listen,
            workers: 0,
            gateway_timeout: default_gateway_timeout(),
            shutdown_timeout: default_shutdown_timeout(),
            max_body_size: default_max_body_size(),
            server_name: default_server_name(),
        }
    }

    /// Effective worker count
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

/// A proxy resource mount
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MountConfig {
    /// Path segment; requests under `/<name>/` use template `<name>/{+tu}`
    pub name: String,

    /// Whether the resource proxies to the target
    #[serde(default = "default_true")]
    pub proxying: bool,
}

impl MountConfig {
    /// Create a proxying mount
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            proxying: true,
        }
    }
}

/// Exchange table housekeeping.
///
/// Without `sweep_interval` entries whose waiter timed out stay until a
/// late response removes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExchangeConfig {
    /// How often to sweep stale entries
    #[serde(default, with = "humantime_serde")]
    pub sweep_interval: Option<Duration>,

    /// Age at which an entry counts as stale
    #[serde(default = "default_exchange_max_age", with = "humantime_serde")]
    pub max_age: Duration,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            sweep_interval: None,
            max_age: default_exchange_max_age(),
        }
    }
}

/// Downstream forwarders
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DownstreamConfig {
    /// CoAP targets
    #[serde(default)]
    pub coap: CoapDownstreamConfig,

    /// HTTP targets
    #[serde(default)]
    pub http: HttpDownstreamConfig,
}

/// CoAP downstream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoapDownstreamConfig {
    /// In-process counter resources; empty leaves CoAP unconfigured
    #[serde(default = "default_local_resources")]
    pub local_resources: Vec<String>,
}

impl Default for CoapDownstreamConfig {
    fn default() -> Self {
        Self {
            local_resources: default_local_resources(),
        }
    }
}

/// HTTP downstream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpDownstreamConfig {
    /// Forward `http`/`https` targets
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Origin request timeout
    #[serde(default = "default_http_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for HttpDownstreamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: default_http_timeout(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObservabilityConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON lines
    Json,
}

fn default_gateway_timeout() -> Duration {
    GATEWAY_TIMEOUT
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_server_name() -> String {
    SERVER_NAME.to_string()
}

fn default_mounts() -> Vec<MountConfig> {
    vec![MountConfig::new("proxy")]
}

fn default_exchange_max_age() -> Duration {
    Duration::from_secs(600)
}

fn default_local_resources() -> Vec<String> {
    vec!["target".to_string()]
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_defaults() {
        let gateway = GatewayConfig::with_listen("127.0.0.1:8080".parse().unwrap());
        assert_eq!(gateway.gateway_timeout, Duration::from_secs(75));
        assert_eq!(gateway.server_name, SERVER_NAME);
        assert_eq!(gateway.worker_count(), num_cpus::get());
    }

    #[test]
    fn test_section_defaults() {
        let exchange = ExchangeConfig::default();
        assert!(exchange.sweep_interval.is_none());

        let downstream = DownstreamConfig::default();
        assert_eq!(downstream.coap.local_resources, vec!["target".to_string()]);
        assert!(downstream.http.enabled);
        assert_eq!(LoggingConfig::default().format, LogFormat::Text);
    }
}
