use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub trakt: TraktConfig,
    #[serde(default)]
    pub tmdb: Option<TmdbConfig>,
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Account shown as the player name; looked up from `/users/me` when unset.
    #[serde(default)]
    pub username: Option<String>,
}

/// Image catalog settings. Artwork lookups are skipped without this section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between polls while something is playing.
    #[serde(default = "default_fast_interval_secs")]
    pub fast_interval_secs: u64,
    /// Delay between polls while nothing is playing.
    #[serde(default = "default_slow_interval_secs")]
    pub slow_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Trakt client_id is not set")]
    MissingClientId,
    #[error("Trakt client_secret is not set")]
    MissingClientSecret,
    #[error("tmdb.api_key is empty; remove the [tmdb] section to disable artwork")]
    EmptyTmdbKey,
    #[error("polling intervals must be greater than zero")]
    ZeroInterval,
    #[error("fast interval ({fast}s) must not exceed slow interval ({slow}s)")]
    IntervalOrder { fast: u64, slow: u64 },
}

fn default_fast_interval_secs() -> u64 {
    60
}

fn default_slow_interval_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            fast_interval_secs: default_fast_interval_secs(),
            slow_interval_secs: default_slow_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl PollingConfig {
    pub fn fast_interval(&self) -> Duration {
        Duration::from_secs(self.fast_interval_secs)
    }

    pub fn slow_interval(&self) -> Duration {
        Duration::from_secs(self.slow_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            trakt: TraktConfig {
                client_id,
                client_secret,
                username: None,
            },
            tmdb: None,
            polling: PollingConfig::default(),
        }
    }

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

    /// The image catalog key, when artwork is enabled.
    pub fn tmdb_api_key(&self) -> Option<&str> {
        self.tmdb.as_ref().map(|t| t.api_key.as_str())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trakt.client_id.trim().is_empty() {
            return Err(ConfigError::MissingClientId);
        }
        if self.trakt.client_secret.trim().is_empty() {
            return Err(ConfigError::MissingClientSecret);
        }
        if let Some(tmdb) = &self.tmdb {
            if tmdb.api_key.trim().is_empty() {
                return Err(ConfigError::EmptyTmdbKey);
            }
        }
        let polling = &self.polling;
        if polling.fast_interval_secs == 0 || polling.slow_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if polling.fast_interval_secs > polling.slow_interval_secs {
            return Err(ConfigError::IntervalOrder {
                fast: polling.fast_interval_secs,
                slow: polling.slow_interval_secs,
            });
        }
        Ok(())
    }
}
