//! Configuration builder

use crate::types::{
    Config, DownstreamConfig, ExchangeConfig, GatewayConfig, MountConfig, ObservabilityConfig,
};
use std::net::SocketAddr;

/// Builder for constructing configuration programmatically
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    gateway: Option<GatewayConfig>,
    mounts: Option<Vec<MountConfig>>,
    exchange: ExchangeConfig,
    downstream: DownstreamConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set gateway configuration
    pub fn gateway(mut self, gateway: GatewayConfig) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Set listen address
    pub fn listen(mut self, addr: SocketAddr) -> Self {
        let gateway = self
            .gateway
            .get_or_insert_with(|| GatewayConfig::with_listen(addr));
        gateway.listen = addr;
        self
    }

    /// Add a mount. The first call replaces the default `proxy` mount.
    pub fn mount(mut self, mount: MountConfig) -> Self {
        self.mounts.get_or_insert_with(Vec::new).push(mount);
        self
    }

    /// Set exchange housekeeping
    pub fn exchange(mut self, exchange: ExchangeConfig) -> Self {
        self.exchange = exchange;
        self
    }

    /// Set downstream forwarders
    pub fn downstream(mut self, downstream: DownstreamConfig) -> Self {
        self.downstream = downstream;
        self
    }

    /// Build the configuration
    pub fn build(self) -> cuttlefish_core::Result<Config> {
        let gateway = self
            .gateway
            .ok_or_else(|| cuttlefish_core::Error::Config("gateway is required".to_string()))?;

        Ok(Config {
            gateway,
            mounts: self
                .mounts
                .unwrap_or_else(|| vec![MountConfig::new("proxy")]),
            exchange: self.exchange,
            downstream: self.downstream,
            observability: ObservabilityConfig::default(),
        })
    }
}
