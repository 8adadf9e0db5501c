//! Configuration loading

use crate::{Config, ConfigFormat};
use cuttlefish_core::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::Path;

/// Load configuration from a file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    let format = ConfigFormat::from_path(path)?;

    load_from_str(&content, format)
}

/// Expand environment variables in configuration string
/// Supports syntax: ${VAR} and ${VAR:-default}
fn expand_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(:-([^}]*))?\}")
        .map_err(|e| Error::Config(format!("Invalid regex: {e}")))?;

    let mut result = String::new();
    let mut last_match = 0;

    for cap in re.captures_iter(content) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let var_name = var_name.as_str();
        let default_value = cap.get(3).map(|m| m.as_str());

        let value = match env::var(var_name) {
            Ok(val) => val,
            Err(_) => match default_value {
                Some(default) => default.to_string(),
                None => {
                    return Err(Error::Config(format!(
                        "Environment variable '{var_name}' not set and no default provided"
                    )));
                }
            },
        };

        result.push_str(&content[last_match..full_match.start()]);
        result.push_str(&value);
        last_match = full_match.end();
    }

    result.push_str(&content[last_match..]);

    Ok(result)
}

/// Load configuration from a string
pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<Config> {
    let expanded_content = expand_env_vars(content)?;

    let config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {e}")))?,
        ConfigFormat::Toml => toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {e}")))?,
        ConfigFormat::Json => serde_json::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse JSON: {e}")))?,
    };

    Ok(config)
}

/// Load and validate configuration
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config = load_from_file(path)?;

    crate::validator::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogFormat;
    use std::io::Write;
    use std::time::Duration;

    const YAML_CONFIG: &str = r#"
gateway:
  listen: "127.0.0.1:8080"
  workers: 4
  gateway_timeout: "75s"
  max_body_size: 1048576

mounts:
  - name: proxy
  - name: local
    proxying: false

exchange:
  sweep_interval: "60s"
  max_age: "10m"

downstream:
  coap:
    local_resources: ["target", "sensors/temp"]
  http:
    enabled: true
    timeout: "5s"

observability:
  logging:
    level: "debug"
    format: "json"
"#;

    #[test]
    fn test_load_yaml() {
        let config = load_from_str(YAML_CONFIG, ConfigFormat::Yaml).unwrap();

        assert_eq!(config.gateway.workers, 4);
        assert_eq!(config.gateway.gateway_timeout, Duration::from_secs(75));
        assert_eq!(config.mounts.len(), 2);
        assert!(config.mounts[0].proxying);
        assert!(!config.mounts[1].proxying);
        assert_eq!(config.exchange.sweep_interval, Some(Duration::from_secs(60)));
        assert_eq!(config.exchange.max_age, Duration::from_secs(600));
        assert_eq!(config.downstream.coap.local_resources.len(), 2);
        assert_eq!(config.downstream.http.timeout, Duration::from_secs(5));
        assert_eq!(config.observability.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config = load_from_str("gateway:\n  listen: \"127.0.0.1:8080\"\n", ConfigFormat::Yaml)
            .unwrap();

        assert_eq!(config.gateway.gateway_timeout, Duration::from_secs(75));
        assert_eq!(config.mounts.len(), 1);
        assert_eq!(config.mounts[0].name, "proxy");
        assert!(config.exchange.sweep_interval.is_none());
        assert_eq!(config.downstream.coap.local_resources, vec!["target"]);
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[gateway]
listen = "127.0.0.1:9000"
gateway_timeout = "30s"

[[mounts]]
name = "hc"
"#;
        let config = load_from_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.gateway.gateway_timeout, Duration::from_secs(30));
        assert_eq!(config.mounts[0].name, "hc");
    }

    #[test]
    fn test_load_json() {
        let json = r#"{"gateway": {"listen": "127.0.0.1:9000"}, "mounts": []}"#;
        let config = load_from_str(json, ConfigFormat::Json).unwrap();
        assert!(config.mounts.is_empty());
    }

    #[test]
    fn test_invalid_yaml() {
        let invalid = "invalid: [yaml";
        let result = load_from_str(invalid, ConfigFormat::Yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        env::set_var("CUTTLEFISH_TEST_PORT", "9090");
        env::set_var("CUTTLEFISH_TEST_HOST", "0.0.0.0");

        let config = load_from_str(
            "gateway:\n  listen: \"${CUTTLEFISH_TEST_HOST}:${CUTTLEFISH_TEST_PORT}\"\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.gateway.listen.to_string(), "0.0.0.0:9090");

        env::remove_var("CUTTLEFISH_TEST_PORT");
        env::remove_var("CUTTLEFISH_TEST_HOST");
    }

    #[test]
    fn test_env_var_with_default() {
        env::remove_var("CUTTLEFISH_UNDEFINED_VAR");

        let config = load_from_str(
            "gateway:\n  listen: \"${CUTTLEFISH_UNDEFINED_VAR:-127.0.0.1:8080}\"\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.gateway.listen.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_missing_env_var_no_default() {
        env::remove_var("CUTTLEFISH_MISSING_VAR");

        let result = load_from_str(
            "gateway:\n  listen: \"${CUTTLEFISH_MISSING_VAR}\"\n",
            ConfigFormat::Yaml,
        );
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("CUTTLEFISH_MISSING_VAR"));
    }

    #[test]
    fn test_multiple_env_vars() {
        env::set_var("CF_HOST", "localhost");
        env::set_var("CF_PORT", "5683");

        let expanded = expand_env_vars("coap://${CF_HOST}:${CF_PORT}/target").unwrap();
        assert_eq!(expanded, "coap://localhost:5683/target");

        env::remove_var("CF_HOST");
        env::remove_var("CF_PORT");
    }

    #[test]
    fn test_load_config_from_file_validates() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "gateway:\n  listen: \"127.0.0.1:8080\"\nmounts:\n  - name: a\n  - name: a\n"
        )
        .unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate mount"));

        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "{YAML_CONFIG}").unwrap();
        assert!(load_config(file.path()).is_ok());
    }
}
