//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading: required variables must be present and valid, or
//! the application exits with a clear error message before binding any
//! socket.

use std::env;

use adgroups_directory::{DirectoryConfig, EndpointConfig};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind the HTTP server to.
    pub host: String,

    /// Port to bind the HTTP server to.
    pub port: u16,

    /// Log filter directive, e.g. `info,adgroups_directory=debug`.
    pub rust_log: String,

    /// Directory endpoints and containers.
    pub directory: DirectoryConfig,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = optional_var("HOST", "0.0.0.0");
        let port = parse_port(&optional_var("PORT", "5000"))?;
        let rust_log = optional_var("RUST_LOG", "info");

        let directory = DirectoryConfig {
            people: EndpointConfig {
                url: require_var("AD_PEOPLE_URL")?,
                bind_dn: require_var("AD_PEOPLE_BIND_DN")?,
                bind_password: require_var("AD_PEOPLE_BIND_PASSWORD")?,
            },
            groups: EndpointConfig {
                url: require_var("AD_GROUPS_URL")?,
                bind_dn: require_var("AD_GROUPS_BIND_DN")?,
                bind_password: require_var("AD_GROUPS_BIND_PASSWORD")?,
            },
            people_base: require_var("AD_PEOPLE_BASE")?,
            groups_base: require_var("AD_GROUPS_BASE")?,
            group_ou: require_var("AD_GROUP_OU")?,
            group_category: env::var("AD_GROUP_CATEGORY").ok().filter(|v| !v.is_empty()),
            conn_timeout_secs: parse_timeout(&optional_var("AD_CONN_TIMEOUT_SECS", "10"))?,
        };

        Ok(Self {
            host,
            port,
            rust_log,
            directory,
        })
    }

    /// The socket address string to bind to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn require_var(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name.to_string())),
    }
}

fn optional_var(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        var: "PORT".to_string(),
        message: format!("'{value}' is not a valid port number"),
    })
}

fn parse_timeout(value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue {
            var: "AD_CONN_TIMEOUT_SECS".to_string(),
            message: format!("'{value}' is not a positive number of seconds"),
        }),
    }
}
