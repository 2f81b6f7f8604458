//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `tapohubd.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;
use tapohub_adapter_virtual::SimulatorConfig;
use tapohub_app::coordinator::{CoordinatorConfig, DEFAULT_REQUEST_TIMEOUT, DEFAULT_UPDATE_INTERVAL};
use tapohub_domain::id::EntryId;

/// Upper bound on every configured interval: one week.
const MAX_INTERVAL_SECS: u64 = 7 * 24 * 3600;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Hub entry and polling settings.
    pub hub: HubConfig,
    /// Devices served by the simulated hub.
    pub simulator: SimulatorConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Hub entry configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Identity of the entry; a random one is generated when absent.
    pub entry_id: Option<EntryId>,
    /// Seconds between two polls of the same device.
    pub update_interval_secs: u64,
    /// Upper bound, in seconds, on a single sensor fetch.
    pub request_timeout_secs: u64,
    /// Seconds between two status reports in the log.
    pub status_interval_secs: u64,
}

impl Config {
    /// Load configuration from `tapohubd.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("tapohubd.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TAPOHUB_ENTRY_ID")
            && let Ok(id) = val.parse()
        {
            self.hub.entry_id = Some(id);
        }
        if let Ok(val) = std::env::var("TAPOHUB_UPDATE_INTERVAL")
            && let Ok(secs) = val.parse()
        {
            self.hub.update_interval_secs = secs;
        }
        if let Ok(val) = std::env::var("TAPOHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_interval("update_interval_secs", self.hub.update_interval_secs)?;
        check_interval("request_timeout_secs", self.hub.request_timeout_secs)?;
        check_interval("status_interval_secs", self.hub.status_interval_secs)?;
        Ok(())
    }

    /// Timing knobs handed to every sensor coordinator.
    #[must_use]
    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            update_interval: Duration::from_secs(self.hub.update_interval_secs),
            request_timeout: Duration::from_secs(self.hub.request_timeout_secs),
        }
    }

    #[must_use]
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.hub.status_interval_secs)
    }
}

fn check_interval(name: &str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation(format!("{name} must be non-zero")));
    }
    if secs > MAX_INTERVAL_SECS {
        return Err(ConfigError::Validation(format!(
            "{name} must not exceed {MAX_INTERVAL_SECS}"
        )));
    }
    Ok(())
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "tapohubd=info,tapohub_app=info,tapohub_adapter_virtual=info".to_string(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            entry_id: None,
            update_interval_secs: DEFAULT_UPDATE_INTERVAL.as_secs(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            status_interval_secs: 300,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
