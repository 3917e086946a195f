use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_PERSISTENCE_ENDPOINT: &str = "tcp://localhost:5555";
pub const DEFAULT_WATCHED_STATUS_ENDPOINT: &str = "tcp://localhost:5557";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 1500;
pub const DEFAULT_PROTOCOL_VERSION: u32 = 1;

const ENV_PERSISTENCE_ENDPOINT: &str = "WATCHLIST_PERSISTENCE_ENDPOINT";
const ENV_WATCHED_STATUS_ENDPOINT: &str = "WATCHLIST_WATCHED_STATUS_ENDPOINT";
const ENV_TIMEOUT_MS: &str = "WATCHLIST_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default = "default_persistence_service")]
    pub persistence: ServiceConfig,
    #[serde(default = "default_watched_status_service")]
    pub watched_status: ServiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings shared by every request/reply channel the process opens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Upper bound for connecting and for each request/reply round trip
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Value sent in the `version` field of every request
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_protocol_version() -> u32 {
    DEFAULT_PROTOCOL_VERSION
}

fn default_persistence_service() -> ServiceConfig {
    ServiceConfig {
        endpoint: DEFAULT_PERSISTENCE_ENDPOINT.to_string(),
    }
}

fn default_watched_status_service() -> ServiceConfig {
    ServiceConfig {
        endpoint: DEFAULT_WATCHED_STATUS_ENDPOINT.to_string(),
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            protocol_version: default_protocol_version(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            persistence: default_persistence_service(),
            watched_status: default_watched_status_service(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ChannelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    /// Environment overrides are applied and the result is validated either way.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            debug!(path = %path.display(), "Loading configuration file");
            Self::load_from_file(path)?
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `WATCHLIST_*` overrides. `lookup` resolves a variable name to its value.
    /// A timeout override that is not a whole number of milliseconds is an error.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_PERSISTENCE_ENDPOINT) {
            self.persistence.endpoint = endpoint;
        }
        if let Some(endpoint) = lookup(ENV_WATCHED_STATUS_ENDPOINT) {
            self.watched_status.endpoint = endpoint;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.channel.request_timeout_ms = raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("{} must be a number of milliseconds, got {:?}", ENV_TIMEOUT_MS, raw)
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.channel.request_timeout_ms == 0 {
            return Err(anyhow::anyhow!("channel.request_timeout_ms must be greater than zero"));
        }
        if self.channel.protocol_version == 0 {
            return Err(anyhow::anyhow!("channel.protocol_version must be at least 1"));
        }

        validate_endpoint("persistence", &self.persistence.endpoint)?;
        validate_endpoint("watched_status", &self.watched_status.endpoint)?;

        if self.persistence.endpoint == self.watched_status.endpoint {
            return Err(anyhow::anyhow!(
                "persistence and watched_status must use different endpoints (both are {})",
                self.persistence.endpoint
            ));
        }

        Ok(())
    }
}

fn validate_endpoint(service: &str, endpoint: &str) -> anyhow::Result<()> {
    if endpoint.trim().is_empty() {
        return Err(anyhow::anyhow!("{}.endpoint cannot be empty", service));
    }
    if !(endpoint.starts_with("tcp://") || endpoint.starts_with("ipc://")) {
        return Err(anyhow::anyhow!(
            "{}.endpoint must start with tcp:// or ipc://, got {}",
            service,
            endpoint
        ));
    }
    Ok(())
}
