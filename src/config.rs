//! Centralized configuration management for rpel

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket endpoint of the rpel server
    pub server_url: String,
    /// Session token sent with every request
    pub token: String,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Log file written by the TUI and CLI
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080".to_string(),
            token: String::new(),
            request_timeout_seconds: 30,
            log_file: PathBuf::from("rpel.log"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let server_url = std::env::var("RPEL_SERVER_URL").unwrap_or(defaults.server_url);
        let token = std::env::var("RPEL_TOKEN").unwrap_or(defaults.token);
        let request_timeout_seconds = parse_env_var("RPEL_REQUEST_TIMEOUT_SECONDS")?
            .unwrap_or(defaults.request_timeout_seconds);
        let log_file = std::env::var("RPEL_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);

        Ok(Config {
            server_url,
            token,
            request_timeout_seconds,
            log_file,
        })
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Directory the log file lives in
    pub fn log_dir(&self) -> PathBuf {
        match self.log_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// File name part of the log path
    pub fn log_file_name(&self) -> String {
        self.log_file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("rpel.log")
            .to_string()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://")) {
            return Err(anyhow::anyhow!(
                "Server URL must use ws:// or wss://, got '{}'",
                self.server_url
            ));
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("Request timeout must be at least one second"));
        }

        let log_dir = self.log_dir();
        if !log_dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Log directory does not exist: {}",
                log_dir.display()
            ));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
