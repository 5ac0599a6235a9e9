// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the insights service.

use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub facebook: FacebookConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FacebookConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultsConfig {
    /// IANA zone applied when account metadata omits a timezone. Downstream
    /// consumers assume this exact default; don't change it casually.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub upstream_failure: UpstreamFailurePolicy,
}

/// What to do when the upstream insights fetch for the current period fails.
///
/// `ZeroFill` reproduces the historical behavior: log and render the period
/// as having no activity. `Error` surfaces the failure to the caller instead,
/// so an outage is distinguishable from a genuinely idle account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UpstreamFailurePolicy {
    #[default]
    ZeroFill,
    Error,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_api_version() -> String {
    "v19.0".to_string()
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
        }
    }
}

impl Default for FacebookConfig {
    fn default() -> Self {
        FacebookConfig {
            base_url: default_base_url(),
            api_version: default_api_version(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            timezone: default_timezone(),
            upstream_failure: UpstreamFailurePolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path.as_std_path())
            .with_context(|| format!("failed to read config file at {}", path))?;

        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file at {}", path))
    }

    /// Load the file if it exists, otherwise fall back to built-in defaults.
    pub fn load_or_default(path: &Utf8Path) -> Result<Self> {
        if path.as_std_path().exists() {
            Self::load(path)
        } else {
            tracing::info!("no config file at {path}, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();

        assert_eq!(parsed.server.bind, config.server.bind);
        assert_eq!(parsed.defaults.timezone, config.defaults.timezone);
        assert_eq!(
            parsed.defaults.upstream_failure,
            config.defaults.upstream_failure
        );
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
bind = "0.0.0.0:9100"

[facebook]
api_version = "v20.0"

[defaults]
timezone = "Europe/Berlin"
upstream_failure = "error"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9100");
        assert_eq!(config.facebook.api_version, "v20.0");
        assert_eq!(config.facebook.base_url, "https://graph.facebook.com");
        assert_eq!(config.defaults.timezone, "Europe/Berlin");
        assert_eq!(
            config.defaults.upstream_failure,
            UpstreamFailurePolicy::Error
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.defaults.timezone, "America/New_York");
        assert_eq!(
            config.defaults.upstream_failure,
            UpstreamFailurePolicy::ZeroFill
        );
    }
}
