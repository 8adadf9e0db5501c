//! Configuration validation

use crate::Config;
use cuttlefish_core::{Error, Result};
use std::collections::HashSet;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_gateway(config)?;
    validate_mounts(config)?;
    validate_exchange(config)?;
    validate_downstream(config)?;
    validate_logging(config)?;

    Ok(())
}

fn validate_gateway(config: &Config) -> Result<()> {
    if config.gateway.gateway_timeout.is_zero() {
        return Err(Error::Config("gateway_timeout must be > 0".to_string()));
    }

    if config.gateway.gateway_timeout.as_secs() > 300 {
        tracing::warn!("gateway_timeout is very high (>5 minutes)");
    }

    if config.gateway.max_body_size == 0 {
        return Err(Error::Config("max_body_size must be > 0".to_string()));
    }

    Ok(())
}

fn validate_mounts(config: &Config) -> Result<()> {
    if config.mounts.is_empty() {
        tracing::warn!("No mounts configured; every request gets the base response");
    }

    let mut seen = HashSet::new();
    for mount in &config.mounts {
        if mount.name.is_empty() {
            return Err(Error::Config("mount name cannot be empty".to_string()));
        }

        if mount.name.contains('/') {
            return Err(Error::Config(format!(
                "mount name '{}' must not contain '/'",
                mount.name
            )));
        }

        if !seen.insert(mount.name.as_str()) {
            return Err(Error::Config(format!("Duplicate mount: {}", mount.name)));
        }
    }

    Ok(())
}

fn validate_exchange(config: &Config) -> Result<()> {
    let Some(interval) = config.exchange.sweep_interval else {
        return Ok(());
    };

    if interval.is_zero() {
        return Err(Error::Config("exchange sweep_interval must be > 0".to_string()));
    }

    // Entries younger than the deadline may still have a live waiter
    if config.exchange.max_age < config.gateway.gateway_timeout {
        return Err(Error::Config(format!(
            "exchange max_age ({:?}) must be >= gateway_timeout ({:?})",
            config.exchange.max_age, config.gateway.gateway_timeout
        )));
    }

    Ok(())
}

fn validate_downstream(config: &Config) -> Result<()> {
    let http = &config.downstream.http;
    if http.enabled && http.timeout.is_zero() {
        return Err(Error::Config(
            "downstream http timeout must be > 0 when enabled".to_string(),
        ));
    }

    for name in &config.downstream.coap.local_resources {
        if name.trim_matches('/').is_empty() {
            return Err(Error::Config("local resource name cannot be empty".to_string()));
        }
    }

    if config.downstream.coap.local_resources.is_empty() && !http.enabled {
        tracing::warn!("No downstream configured; every exchange is answered 5.02");
    }

    Ok(())
}

fn validate_logging(config: &Config) -> Result<()> {
    let level = config.observability.logging.level.to_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(Error::Config(format!(
            "Invalid log level: {}",
            config.observability.logging.level
        ))),
    }
}
