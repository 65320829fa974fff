//! Configuration management for Courier-Oxide

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// API key required on every call
    pub api_key: String,

    /// Maximum concurrent worker slots
    pub max_workers: usize,

    /// Default session keep-alive in seconds
    pub default_keep_alive: u64,

    /// Upper bound for client-requested keep-alive in seconds
    pub max_keep_alive: u64,

    /// Expired-session sweep interval in seconds
    pub sweep_interval: u64,

    /// Block heavy page resources (images, media) by default
    pub block_resources: bool,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8377,
            api_key: "dev-key".to_string(),
            max_workers: 4,
            default_keep_alive: 30,
            max_keep_alive: 300,
            sweep_interval: 5,
            block_resources: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = env::var("COURIER_HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("COURIER_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::configuration("Invalid COURIER_PORT"))?;
        }

        if let Ok(api_key) = env::var("COURIER_API_KEY") {
            config.api_key = api_key;
        }

        if let Ok(max_workers) = env::var("COURIER_MAX_WORKERS") {
            config.max_workers = max_workers
                .parse()
                .map_err(|_| Error::configuration("Invalid COURIER_MAX_WORKERS"))?;
        }

        if let Ok(keep_alive) = env::var("COURIER_DEFAULT_KEEP_ALIVE") {
            config.default_keep_alive = keep_alive
                .parse()
                .map_err(|_| Error::configuration("Invalid COURIER_DEFAULT_KEEP_ALIVE"))?;
        }

        if let Ok(max_keep_alive) = env::var("COURIER_MAX_KEEP_ALIVE") {
            config.max_keep_alive = max_keep_alive
                .parse()
                .map_err(|_| Error::configuration("Invalid COURIER_MAX_KEEP_ALIVE"))?;
        }

        if let Ok(sweep) = env::var("COURIER_SWEEP_INTERVAL") {
            config.sweep_interval = sweep
                .parse()
                .map_err(|_| Error::configuration("Invalid COURIER_SWEEP_INTERVAL"))?;
        }

        if let Ok(block) = env::var("COURIER_BLOCK_RESOURCES") {
            config.block_resources = block
                .parse()
                .map_err(|_| Error::configuration("Invalid COURIER_BLOCK_RESOURCES"))?;
        }

        if let Ok(log_level) = env::var("COURIER_LOG_LEVEL") {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }
}

/// Client-side configuration: base URL and API key
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service
    pub api_url: String,

    /// API key attached to every call
    pub api_key: String,

    /// Raise transport errors on non-2xx responses
    pub raise_for_status: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8377/".to_string(),
            api_key: "dev-key".to_string(),
            raise_for_status: true,
        }
    }
}

impl ClientConfig {
    /// Load client configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = ClientConfig::default();

        if let Ok(url) = env::var("COURIER_API_URL") {
            config.api_url = url;
        }

        if let Ok(key) = env::var("COURIER_API_KEY") {
            config.api_key = key;
        }

        if let Ok(raise) = env::var("COURIER_RAISE_FOR_STATUS") {
            config.raise_for_status = raise
                .parse()
                .map_err(|_| Error::configuration("Invalid COURIER_RAISE_FOR_STATUS"))?;
        }

        Ok(config)
    }

    /// Override the base URL
    pub fn with_api_url<S: Into<String>>(mut self, url: S) -> Self {
        self.api_url = url.into();
        self
    }

    /// Override the API key
    pub fn with_api_key<S: Into<String>>(mut self, key: S) -> Self {
        self.api_key = key.into();
        self
    }

    /// Keep non-2xx payloads instead of raising transport errors
    pub fn with_raise_for_status(mut self, raise: bool) -> Self {
        self.raise_for_status = raise;
        self
    }
}
