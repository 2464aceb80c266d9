//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ```bash
//! export LISTEN="0.0.0.0:18082"
//! export RULES_FILE="/var/lib/jumpgate/rules.json"
//! export ACCESS_LOG_FILE="/var/log/jumpgate/access.log"
//! export ADMIN_TOKEN="change-me"
//! ```
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:18082`)
//! - `RULES_FILE` - Rules snapshot path (default: `rules.json`)
//! - `ACCESS_LOG_FILE` - Access log path (default: `access.log`)
//! - `LOG_BUFFER_SIZE` - Entries buffered before a write (default: 1000)
//! - `LOG_FLUSH_INTERVAL` - Seconds between timed flushes (default: 180)
//! - `LOG_QUEUE_CAPACITY` - Access log hand-off queue size (default: 10000, min: 100)
//! - `ADMIN_TOKEN` - Bearer token required on `/api/*` when set
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::infrastructure::access_log::AccessLogSettings;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub rules_file: PathBuf,
    pub access_log_file: PathBuf,
    pub log_buffer_size: usize,
    /// Seconds between timed access log flushes.
    pub log_flush_interval: u64,
    pub log_queue_capacity: usize,
    /// When set, every `/api/*` request must carry this bearer token.
    pub admin_token: Option<String>,
    pub log_level: String,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:18082".to_string(),
            rules_file: PathBuf::from("rules.json"),
            access_log_file: PathBuf::from("access.log"),
            log_buffer_size: 1000,
            log_flush_interval: 180,
            log_queue_capacity: 10_000,
            admin_token: None,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let listen_addr = env::var("LISTEN").unwrap_or(defaults.listen_addr);
        let rules_file = env::var("RULES_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.rules_file);
        let access_log_file = env::var("ACCESS_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.access_log_file);

        let log_buffer_size = parse_var("LOG_BUFFER_SIZE", defaults.log_buffer_size)?;
        let log_flush_interval = parse_var("LOG_FLUSH_INTERVAL", defaults.log_flush_interval)?;
        let log_queue_capacity = parse_var("LOG_QUEUE_CAPACITY", defaults.log_queue_capacity)?;

        let admin_token = env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());

        let log_level = env::var("RUST_LOG").unwrap_or(defaults.log_level);
        let log_format = env::var("LOG_FORMAT").unwrap_or(defaults.log_format);

        Ok(Self {
            listen_addr,
            rules_file,
            access_log_file,
            log_buffer_size,
            log_flush_interval,
            log_queue_capacity,
            admin_token,
            log_level,
            log_format,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_buffer_size` is outside `1..=1_000_000`
    /// - `log_flush_interval` is zero
    /// - `log_queue_capacity` is less than 100
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    pub fn validate(&self) -> Result<()> {
        if self.log_buffer_size == 0 || self.log_buffer_size > 1_000_000 {
            anyhow::bail!(
                "LOG_BUFFER_SIZE must be between 1 and 1000000, got {}",
                self.log_buffer_size
            );
        }

        if self.log_flush_interval == 0 {
            anyhow::bail!("LOG_FLUSH_INTERVAL must be greater than 0");
        }

        if self.log_queue_capacity < 100 {
            anyhow::bail!(
                "LOG_QUEUE_CAPACITY must be at least 100, got {}",
                self.log_queue_capacity
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.rules_file.as_os_str().is_empty() {
            anyhow::bail!("RULES_FILE must not be empty");
        }

        if self.access_log_file.as_os_str().is_empty() {
            anyhow::bail!("ACCESS_LOG_FILE must not be empty");
        }

        Ok(())
    }

    /// Access logger settings derived from this configuration.
    pub fn access_log_settings(&self) -> AccessLogSettings {
        AccessLogSettings {
            buffer_size: self.log_buffer_size,
            flush_interval: Duration::from_secs(self.log_flush_interval),
            queue_capacity: self.log_queue_capacity,
        }
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Rules file: {}", self.rules_file.display());
        tracing::info!("  Access log: {}", self.access_log_file.display());
        tracing::info!(
            "  Access log buffer: {} entries, flush every {}s, queue {}",
            self.log_buffer_size,
            self.log_flush_interval,
            self.log_queue_capacity
        );
        tracing::info!(
            "  Admin token: {}",
            self.admin_token.as_deref().map_or("disabled".to_string(), mask_token)
        );
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Parses an optional numeric variable, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got '{value}'")),
        Err(_) => Ok(default),
    }
}

/// Masks a secret for logging, keeping at most its first two characters.
///
/// - `s3cret-token` → `s3***`
/// - `ab` → `***`
fn mask_token(token: &str) -> String {
    if token.chars().count() <= 4 {
        return "***".to_string();
    }

    let prefix: String = token.chars().take(2).collect();
    format!("{prefix}***")
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
