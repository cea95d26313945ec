// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local runs.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// How often each entry polls FatSecret unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL_MINUTES: u64 = 15;

/// Request timeout for every FatSecret call unless configured otherwise.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// How long a started authorization waits for its verifier.
pub const DEFAULT_AUTH_FLOW_TTL_MINUTES: u64 = 15;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// JSON file holding authorized credentials, keyed by entry ID
    pub credentials_path: PathBuf,
    /// Periodic refresh interval
    pub poll_interval: Duration,
    /// Timeout applied to each FatSecret request
    pub http_timeout: Duration,
    /// Lifetime of an authorization flow that has not been verified
    pub auth_flow_ttl: Duration,
    /// Override for the OAuth host (request/authorize/access token)
    pub auth_base_url: Option<String>,
    /// Override for the REST API host
    pub api_base_url: Option<String>,
    /// Consumer key used when `/auth/start` is called without one
    pub consumer_key: Option<String>,
    /// Consumer secret used when `/auth/start` is called without one
    pub consumer_secret: Option<String>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            credentials_path: PathBuf::from("test_credentials.json"),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_MINUTES * 60),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            auth_flow_ttl: Duration::from_secs(DEFAULT_AUTH_FLOW_TTL_MINUTES * 60),
            auth_base_url: None,
            api_base_url: None,
            consumer_key: Some("test_consumer_key".to_string()),
            consumer_secret: Some("test_consumer_secret".to_string()),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let poll_minutes = parse_var("FATSECRET_POLL_INTERVAL_MINUTES", DEFAULT_POLL_INTERVAL_MINUTES)?;
        if poll_minutes == 0 {
            return Err(ConfigError::Invalid(
                "FATSECRET_POLL_INTERVAL_MINUTES",
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            credentials_path: env::var("CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("fatsecret_credentials.json")),
            poll_interval: Duration::from_secs(poll_minutes * 60),
            http_timeout: Duration::from_secs(parse_var(
                "FATSECRET_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            auth_flow_ttl: Duration::from_secs(
                parse_var("FATSECRET_AUTH_FLOW_TTL_MINUTES", DEFAULT_AUTH_FLOW_TTL_MINUTES)? * 60,
            ),
            auth_base_url: optional_var("FATSECRET_AUTH_BASE_URL"),
            api_base_url: optional_var("FATSECRET_API_BASE_URL"),
            consumer_key: optional_var("FATSECRET_CONSUMER_KEY"),
            consumer_secret: optional_var("FATSECRET_CONSUMER_SECRET"),
        })
    }
}

/// Read a variable, trimming whitespace and treating blank values as unset.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match optional_var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid(name, e.to_string())),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    Invalid(&'static str, String),
}
